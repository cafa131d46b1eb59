/// Error types for Airdrop Tracker
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrackerError {
    #[error("Storage error: {reason}")]
    Storage { reason: String },

    #[error("Unable to get current URL")]
    MissingUrl,

    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },

    #[error("Message failed: {reason}")]
    Message { reason: String },

    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    #[error("API request failed: {reason}")]
    Forward { reason: String },

    #[error("DOM error: {reason}")]
    Dom { reason: String },

    #[error("Unsupported storage schema version {found} (supported up to {supported})")]
    UnsupportedSchema { found: u32, supported: u32 },
}

impl TrackerError {
    pub fn storage(reason: impl Into<String>) -> Self {
        TrackerError::Storage { reason: reason.into() }
    }

    pub fn message(reason: impl Into<String>) -> Self {
        TrackerError::Message { reason: reason.into() }
    }

    /// Wrap an exception thrown by a browser API
    pub fn dom(e: wasm_bindgen::JsValue) -> Self {
        TrackerError::Dom { reason: format!("{:?}", e) }
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(e: serde_json::Error) -> Self {
        TrackerError::Serialization { reason: e.to_string() }
    }
}

impl From<serde_wasm_bindgen::Error> for TrackerError {
    fn from(e: serde_wasm_bindgen::Error) -> Self {
        TrackerError::Serialization { reason: e.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
