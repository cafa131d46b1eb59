/// Messages between the content script and the background worker

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::error::{Result, TrackerError};
use crate::record::CapturePayload;

// Import JS bridge functions
#[wasm_bindgen(module = "/extension.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn sendMessage(request: JsValue) -> std::result::Result<JsValue, JsValue>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum MessageRequest {
    SaveUrl { data: CapturePayload },
}

/// `{success: true, message}` or `{success: false, error}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        MessageResponse {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        MessageResponse {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }

    pub fn into_result(self) -> Result<String> {
        if self.success {
            Ok(self.message.unwrap_or_default())
        } else {
            Err(TrackerError::message(self.error.unwrap_or_else(|| "Failed to save".to_string())))
        }
    }
}

/// Send a request to the background worker and wait for its single response
pub async fn send(request: &MessageRequest) -> Result<MessageResponse> {
    let request_js = serde_wasm_bindgen::to_value(request)?;

    let response_js = sendMessage(request_js)
        .await
        .map_err(|e| TrackerError::message(format!("{:?}", e)))?;

    if response_js.is_null() || response_js.is_undefined() {
        return Err(TrackerError::message("No response from background"));
    }

    Ok(serde_wasm_bindgen::from_value(response_js)?)
}
