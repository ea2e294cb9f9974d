//! Rule persistence on `storage.local` of the extension API.

use crate::extension::{extension_api, js_error_message, property};
use async_trait::async_trait;
use contracts::storage::StoredSelectors;
use engine::error::StoreError;
use engine::rules::RuleStore;
use js_sys::{Function, Object, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

pub struct ExtensionStorage {
    area: Option<Object>,
}

impl ExtensionStorage {
    pub fn new() -> Self {
        let area = extension_api()
            .and_then(|api| property(&api, "storage"))
            .and_then(|storage| property(&storage, "local"));
        if area.is_none() {
            log::error!("storage.local is not accessible, hiding rules will not persist");
        }
        Self { area }
    }

    fn area(&self) -> Result<&Object, StoreError> {
        self.area
            .as_ref()
            .ok_or_else(|| StoreError::Unavailable("storage.local is not accessible".to_string()))
    }
}

impl Default for ExtensionStorage {
    fn default() -> Self {
        Self::new()
    }
}

/// Calls a promise-returning method of the storage area and awaits it
async fn invoke(area: &Object, method: &str, arg: &JsValue) -> Result<JsValue, String> {
    let function = Reflect::get(area, &JsValue::from_str(method))
        .map_err(|err| js_error_message(&err))?
        .dyn_into::<Function>()
        .map_err(|_| format!("storage.local.{} is not a function", method))?;
    let promise = function
        .call1(area, arg)
        .map_err(|err| js_error_message(&err))?
        .dyn_into::<Promise>()
        .map_err(|_| format!("storage.local.{} did not return a promise", method))?;
    JsFuture::from(promise)
        .await
        .map_err(|err| js_error_message(&err))
}

impl ExtensionStorage {
    /// String stored under `key`; `None` when absent or not a string
    pub async fn read_text(&self, key: &str) -> Result<Option<String>, StoreError> {
        let area = self.area()?;
        let items = invoke(area, "get", &JsValue::from_str(key))
            .await
            .map_err(|message| StoreError::Read {
                key: key.to_string(),
                message,
            })?;
        Ok(Reflect::get(&items, &JsValue::from_str(key))
            .ok()
            .and_then(|value| value.as_string()))
    }
}

#[async_trait(?Send)]
impl RuleStore for ExtensionStorage {
    async fn read(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let area = self.area()?;
        let items = invoke(area, "get", &JsValue::from_str(key))
            .await
            .map_err(|message| StoreError::Read {
                key: key.to_string(),
                message,
            })?;

        let value = Reflect::get(&items, &JsValue::from_str(key)).unwrap_or(JsValue::UNDEFINED);
        if value.is_undefined() || value.is_null() {
            return Ok(Vec::new());
        }
        let json: serde_json::Value = serde_wasm_bindgen::from_value(value).unwrap_or_default();
        Ok(StoredSelectors::from_json_value(json).into_inner())
    }

    async fn write(&self, key: &str, selectors: &[String]) -> Result<(), StoreError> {
        let area = self.area()?;
        let write_error = |message: String| StoreError::Write {
            key: key.to_string(),
            message,
        };

        let value = serde_wasm_bindgen::to_value(&StoredSelectors(selectors.to_vec()))
            .map_err(|err| write_error(err.to_string()))?;
        let items = Object::new();
        Reflect::set(&items, &JsValue::from_str(key), &value)
            .map_err(|err| write_error(js_error_message(&err)))?;

        invoke(area, "set", &items).await.map(|_| ()).map_err(write_error)
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let area = self.area()?;
        invoke(area, "remove", &JsValue::from_str(key))
            .await
            .map(|_| ())
            .map_err(|message| StoreError::Remove {
                key: key.to_string(),
                message,
            })
    }
}
