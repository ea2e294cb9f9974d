//! Background script: relays extension-icon clicks to the active tab.

use contracts::messages::{Ack, RuntimeMessage};
use js_sys::{Array, Function, Object, Promise, Reflect};
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};

const RESET_MENU_ID: &str = "element-hider-reset";
const RESET_MENU_TITLE: &str = "Reset hidden elements on this site";

#[wasm_bindgen(start)]
pub fn start() {
    // initializes logging using the `log` crate
    _ = console_log::init_with_level(log::Level::Debug);
    console_error_panic_hook::set_once();
    log::info!("Element hider background script ready");
}

/// Extension icon clicked in `tab`
#[wasm_bindgen(js_name = onActionClicked)]
pub fn on_action_clicked(tab: JsValue) {
    send_to_tab(&tab, RuntimeMessage::toggle());
}

/// Context menu item clicked in `tab`
#[wasm_bindgen(js_name = onMenuClicked)]
pub fn on_menu_clicked(info: JsValue, tab: JsValue) {
    let menu_id = Reflect::get(&info, &"menuItemId".into())
        .ok()
        .and_then(|id| id.as_string());
    match menu_message(menu_id.as_deref()) {
        Some(message) => send_to_tab(&tab, message),
        None => log::debug!("Ignoring menu item {:?}", menu_id),
    }
}

/// Extension installed or updated; menu items persist across worker restarts
#[wasm_bindgen(js_name = onInstalled)]
pub fn on_installed() {
    let result = extension_api().and_then(|api| {
        let menus = property(&api, "contextMenus").or_else(|_| property(&api, "menus"))?;
        create_reset_menu(&menus)
    });
    if let Err(err) = result {
        log::warn!("Reset menu unavailable: {}", error_message(&err));
    }
}

/// Message sent for a clicked context menu item
fn menu_message(menu_id: Option<&str>) -> Option<RuntimeMessage> {
    match menu_id {
        Some(RESET_MENU_ID) => Some(RuntimeMessage::reset()),
        _ => None,
    }
}

fn extension_api() -> Result<Object, JsValue> {
    let global = js_sys::global();
    ["browser", "chrome"]
        .iter()
        .find_map(|name| property(&global, name).ok())
        .ok_or_else(|| JsValue::from_str("extension API is not available"))
}

fn property(target: &JsValue, name: &str) -> Result<Object, JsValue> {
    let value = Reflect::get(target, &JsValue::from_str(name))?;
    if value.is_object() {
        Ok(value.unchecked_into())
    } else {
        Err(JsValue::from_str(&format!("`{}` is not available", name)))
    }
}

fn method(target: &Object, name: &str) -> Result<Function, JsValue> {
    Reflect::get(target, &JsValue::from_str(name))?.dyn_into::<Function>()
}

fn error_message(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| {
            Reflect::get(err, &JsValue::from_str("message"))
                .ok()
                .and_then(|message| message.as_string())
        })
        .unwrap_or_else(|| format!("{:?}", err))
}

fn create_reset_menu(menus: &Object) -> Result<(), JsValue> {
    let item = Object::new();
    Reflect::set(&item, &"id".into(), &RESET_MENU_ID.into())?;
    Reflect::set(&item, &"title".into(), &RESET_MENU_TITLE.into())?;
    let contexts = Array::of1(&"action".into());
    Reflect::set(&item, &"contexts".into(), &contexts)?;
    method(menus, "create")?.call1(menus, &item)?;
    Ok(())
}

fn send_to_tab(tab: &JsValue, message: RuntimeMessage) {
    let Some(tab_id) = Reflect::get(tab, &"id".into()).ok().and_then(|id| id.as_f64()) else {
        log::warn!("Clicked tab has no id");
        return;
    };

    spawn_local(async move {
        match send_message(tab_id, &message).await {
            Ok(ack) if ack.success => log::debug!("Tab {} handled `{}`", tab_id, message.action.code()),
            Ok(_) => log::warn!("Tab {} rejected `{}`", tab_id, message.action.code()),
            Err(err) => log::warn!(
                "Content script not reachable in tab {}: {}",
                tab_id,
                error_message(&err)
            ),
        }
    });
}

async fn send_message(tab_id: f64, message: &RuntimeMessage) -> Result<Ack, JsValue> {
    let tabs = property(&extension_api()?.into(), "tabs")?;
    let payload = serde_wasm_bindgen::to_value(message)?;
    let promise = method(&tabs, "sendMessage")?
        .call2(&tabs, &JsValue::from_f64(tab_id), &payload)?
        .dyn_into::<Promise>()?;
    let response = JsFuture::from(promise).await?;
    Ok(serde_wasm_bindgen::from_value(response)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_menu_sends_reset() {
        assert_eq!(menu_message(Some(RESET_MENU_ID)), Some(RuntimeMessage::reset()));
    }

    #[test]
    fn test_unknown_menu_items_are_ignored() {
        assert_eq!(menu_message(Some("something-else")), None);
        assert_eq!(menu_message(None), None);
    }
}
