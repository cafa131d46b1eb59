/// UI module exports
pub mod components;
pub mod popup;
pub mod saved_urls;

use wasm_bindgen::prelude::*;

// Browser dialogs shared by the extension pages
pub(crate) fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

pub(crate) fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        if let Err(e) = window.alert_with_message(message) {
            log::warn!("alert failed: {:?}", e);
        }
    }
}

// Import JS bridge functions
#[wasm_bindgen(module = "/extension.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    pub(crate) async fn openTab(url: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    pub(crate) async fn openExtensionPage(path: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    pub(crate) async fn copyToClipboard(text: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    pub(crate) fn exportToFile(data: &str, filename: &str) -> Result<(), JsValue>;
}
