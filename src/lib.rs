/// Airdrop Tracker - Chrome Extension for capturing page URLs
/// Built with Rust + WASM + Yew

mod background;
mod capture;
mod config;
mod error;
mod messages;
mod migrate;
mod overlay;
mod query;
mod record;
mod storage;
pub mod ui;

use chrono::Utc;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::capture::{CaptureService, LogForwarder};
use crate::config::TrackerConfig;
use crate::messages::{MessageRequest, MessageResponse};
use crate::storage::{ChromeStore, TrackerStore};

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}

// Start the Yew app for the saved URLs page
#[wasm_bindgen]
pub fn start_saved_urls() {
    yew::Renderer::<ui::saved_urls::SavedUrls>::new().render();
}

// Content script entry: inject the floating capture button
#[wasm_bindgen]
pub fn start_overlay() {
    wasm_bindgen_futures::spawn_local(async {
        if let Err(e) = overlay::start(TrackerConfig::default()).await {
            log::error!("Could not start floating button: {}", e);
        }
    });
}

/// `chrome.runtime.onMessage` handler; always resolves to a response object
#[wasm_bindgen]
pub async fn handle_runtime_message(request: JsValue) -> JsValue {
    let request = serde_wasm_bindgen::from_value::<MessageRequest>(request).map_err(|e| e.to_string());

    let service = CaptureService::new(
        TrackerStore::new(ChromeStore),
        LogForwarder,
        TrackerConfig::default(),
    );
    let response = background::handle_message(&service, request, Utc::now()).await;

    to_js(&response).unwrap_or_else(|e| {
        log::error!("Could not encode response: {}", e);
        JsValue::NULL
    })
}

/// `chrome.runtime.onInstalled` handler
#[wasm_bindgen]
pub async fn on_installed(reason: String) {
    let store = TrackerStore::new(ChromeStore);
    if let Err(e) = background::on_installed(&store, &reason, Utc::now()).await {
        log::error!("Error preparing storage: {}", e);
    }
}

/// Whether `chrome.tabs.onUpdated` should inject the content script
#[wasm_bindgen]
pub fn should_inject(status: &str, url: Option<String>) -> bool {
    background::should_inject(status, url.as_deref())
}

fn to_js(response: &MessageResponse) -> error::Result<JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    Ok(response.serialize(&serializer)?)
}
