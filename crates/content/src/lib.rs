//! Content script: runs the hiding session inside the page.

pub mod dom;
pub mod extension;
pub mod overlay;
pub mod runtime;
pub mod storage;

use wasm_bindgen::prelude::wasm_bindgen;

#[wasm_bindgen(start)]
pub fn start() {
    // initializes logging using the `log` crate
    _ = console_log::init_with_level(log::Level::Debug);
    console_error_panic_hook::set_once();

    if let Err(err) = runtime::run() {
        log::error!(
            "Element hider failed to start: {}",
            extension::js_error_message(&err)
        );
    }
}
