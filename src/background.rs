/// Background service worker: install hook, message handling, injection policy

use chrono::{DateTime, Utc};

use crate::capture::{CaptureService, Forwarder};
use crate::error::Result;
use crate::messages::{MessageRequest, MessageResponse};
use crate::storage::{KeyValueStore, TrackerStore};

pub const SAVED_MESSAGE: &str = "URL saved successfully";

/// Schemes where content scripts cannot be injected
const RESTRICTED_PREFIXES: &[&str] = &[
    "chrome://",
    "chrome-extension://",
    "edge://",
    "about:",
    "view-source:",
    "devtools://",
    "https://chrome.google.com/webstore",
    "https://chromewebstore.google.com",
];

/// Answer one runtime message. Never fails: every error becomes `{success: false}`.
pub async fn handle_message<S: KeyValueStore, F: Forwarder>(
    service: &CaptureService<S, F>,
    request: std::result::Result<MessageRequest, String>,
    now: DateTime<Utc>,
) -> MessageResponse {
    let request = match request {
        Ok(request) => request,
        Err(e) => {
            log::warn!("Ignoring malformed message: {}", e);
            return MessageResponse::failure(format!("Unsupported message: {}", e));
        }
    };

    match request {
        MessageRequest::SaveUrl { data } => {
            log::debug!("Saving URL data: {:?}", data);
            match service.save(data, now).await {
                Ok(outcome) => {
                    log::debug!("Stored record {}", outcome.id());
                    MessageResponse::ok(SAVED_MESSAGE)
                }
                Err(e) => {
                    log::error!("Error saving URL: {}", e);
                    MessageResponse::failure(e.to_string())
                }
            }
        }
    }
}

/// `chrome.runtime.onInstalled`: seed storage on install, migrate on update
pub async fn on_installed<S: KeyValueStore>(
    store: &TrackerStore<S>,
    reason: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    match reason {
        "install" => {
            log::info!("Airdrop Tracker extension installed");
            store.initialize_on_install().await
        }
        "update" => {
            let version = store.migrate(now).await?;
            log::info!("Storage at schema version {}", version);
            Ok(())
        }
        other => {
            log::debug!("Ignoring install reason {}", other);
            Ok(())
        }
    }
}

/// Whether a tab that just finished loading should get the content script
pub fn should_inject(status: &str, url: Option<&str>) -> bool {
    if status != "complete" {
        return false;
    }
    match url {
        Some(url) if !url.is_empty() => !RESTRICTED_PREFIXES.iter().any(|p| url.starts_with(p)),
        _ => false,
    }
}
