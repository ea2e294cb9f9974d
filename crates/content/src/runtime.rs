//! Wires the session to the page and to the extension runtime.
//!
//! The session is owned by a single command loop. Listeners and the runtime
//! message handler only hold a sender, so every mutation runs in order and
//! the first command is handled only after the configuration was read and the
//! stored rules were applied.

use crate::dom::{ElementRef, ElementRegistry, WebDom};
use crate::extension::{extension_api, require};
use crate::overlay::{CommandSender, WebOverlay};
use crate::storage::ExtensionStorage;
use contracts::messages::{Ack, MessageAction, RuntimeMessage};
use contracts::storage::CONFIG_OVERRIDE_KEY;
use engine::config::{load_config, HiderConfig};
use engine::session::{Command, HidingSession};
use futures::channel::mpsc;
use futures::StreamExt;
use js_sys::{Function, Reflect};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;

pub fn run() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let domain = window.location().hostname()?;

    let (commands, mut inbox) = mpsc::unbounded::<Command<ElementRef>>();
    // Commands queue up until the session is built.
    listen_for_messages(commands.clone())?;

    spawn_local(async move {
        let storage = ExtensionStorage::new();
        let config = match read_config(&storage).await {
            Ok(config) => config,
            Err(err) => {
                log::error!("Embedded configuration is invalid: {}", err);
                return;
            }
        };

        let registry = Rc::new(ElementRegistry::new());
        let dom = WebDom::new(
            window,
            document.clone(),
            registry.clone(),
            config.highlight.cursor.clone(),
        );
        let overlay = WebOverlay::new(document, registry, config.clone(), commands);
        let mut session = HidingSession::new(dom, storage, overlay, domain, config);

        session.load_rules().await;
        while let Some(command) = inbox.next().await {
            session.dispatch(command).await;
        }
        log::debug!("Command channel closed");
    });

    Ok(())
}

/// Configuration with the user's override from `storage.local`, if any
async fn read_config(storage: &ExtensionStorage) -> Result<HiderConfig, toml::de::Error> {
    let override_toml = match storage.read_text(CONFIG_OVERRIDE_KEY).await {
        Ok(text) => text,
        Err(err) => {
            log::warn!("Could not read configuration override: {}", err);
            None
        }
    };
    load_config(override_toml.as_deref())
}

fn command_for(action: MessageAction) -> Command<ElementRef> {
    match action {
        MessageAction::Toggle => Command::Toggle,
        MessageAction::Reset => Command::Reset,
    }
}

/// Registers the `runtime.onMessage` handler for the whole page lifetime
fn listen_for_messages(commands: CommandSender) -> Result<(), JsValue> {
    let api = extension_api().ok_or_else(|| JsValue::from_str("extension API is not available"))?;
    let on_message = require(&require(&api, "runtime")?.into(), "onMessage")?;
    let add_listener = Reflect::get(&on_message, &JsValue::from_str("addListener"))?
        .dyn_into::<Function>()?;

    let listener = Closure::wrap(Box::new(
        move |message: JsValue, _sender: JsValue, send_response: JsValue| -> JsValue {
            let Ok(message) = serde_wasm_bindgen::from_value::<RuntimeMessage>(message) else {
                return JsValue::FALSE;
            };
            log::debug!("Received `{}`", message.action.code());
            if commands.unbounded_send(command_for(message.action)).is_err() {
                log::error!("Hiding session is gone, dropping `{}`", message.action.code());
            }
            if let Some(respond) = send_response.dyn_ref::<Function>() {
                if let Ok(ack) = serde_wasm_bindgen::to_value(&Ack::ok()) {
                    let _ = respond.call1(&JsValue::NULL, &ack);
                }
            }
            JsValue::FALSE
        },
    ) as Box<dyn FnMut(JsValue, JsValue, JsValue) -> JsValue>);

    add_listener.call1(&on_message, listener.as_ref().unchecked_ref())?;
    // Lives as long as the page.
    listener.forget();
    Ok(())
}
