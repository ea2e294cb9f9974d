//! Access to the WebExtension API object (`browser` on Firefox, `chrome` elsewhere).

use js_sys::{Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};

pub fn extension_api() -> Option<Object> {
    let global = js_sys::global();
    ["browser", "chrome"]
        .iter()
        .find_map(|name| property(&global, name))
}

/// Object-valued property of `target`, if present
pub fn property(target: &JsValue, name: &str) -> Option<Object> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .filter(|value| value.is_object())
        .map(|value| value.unchecked_into::<Object>())
}

/// Like [`property`], failing with a readable error
pub fn require(target: &JsValue, name: &str) -> Result<Object, JsValue> {
    property(target, name).ok_or_else(|| JsValue::from_str(&format!("`{}` is not available", name)))
}

/// Best readable text for a thrown JS value
pub fn js_error_message(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| {
            Reflect::get(err, &JsValue::from_str("message"))
                .ok()
                .and_then(|message| message.as_string())
        })
        .unwrap_or_else(|| format!("{:?}", err))
}
