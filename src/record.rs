/// Data structures for Airdrop Tracker
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved page capture
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub site_name: String,
    #[serde(default)]
    pub domain: String,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_saved: Option<DateTime<Utc>>,
}

impl Record {
    pub fn new(id: String, payload: CapturePayload, now: DateTime<Utc>) -> Record {
        Record {
            id,
            url: payload.url,
            title: payload.title,
            site_name: payload.site_name,
            domain: payload.domain,
            timestamp: payload.timestamp,
            created_at: now,
            last_saved: Some(now),
        }
    }

    /// Most recent save time, falling back to the first save
    pub fn saved_at(&self) -> DateTime<Utc> {
        self.last_saved.unwrap_or(self.created_at)
    }

    /// Replace the capture fields with a newer capture of the same URL.
    /// `id` and `created_at` are kept and `last_saved` never moves backwards.
    pub fn merge_capture(&mut self, payload: CapturePayload, now: DateTime<Utc>) {
        self.title = payload.title;
        self.site_name = payload.site_name;
        self.domain = payload.domain;
        self.timestamp = payload.timestamp;
        self.last_saved = Some(now.max(self.saved_at()));
    }
}

/// Record-shaped payload sent from the content script with a `saveUrl` request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CapturePayload {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub site_name: String,
    #[serde(default)]
    pub domain: String,
    pub timestamp: DateTime<Utc>,
}

/// The reduced projection forwarded to the external API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiProjection {
    pub url: String,
    pub title: String,
    pub site_name: String,
    pub domain: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&CapturePayload> for ApiProjection {
    fn from(payload: &CapturePayload) -> Self {
        ApiProjection {
            url: payload.url.clone(),
            title: payload.title.clone(),
            site_name: payload.site_name.clone(),
            domain: payload.domain.clone(),
            timestamp: payload.timestamp,
        }
    }
}

/// User settings stored under the `settings` key
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub show_notifications: bool,
    #[serde(default)]
    pub auto_save: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            enabled: true,
            show_notifications: true,
            auto_save: false,
        }
    }
}

/// A user-facing toggle in the popup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingToggle {
    ShowNotifications,
    AutoSave,
}

impl Settings {
    pub fn get(&self, toggle: SettingToggle) -> bool {
        match toggle {
            SettingToggle::ShowNotifications => self.show_notifications,
            SettingToggle::AutoSave => self.auto_save,
        }
    }

    pub fn toggle(&mut self, toggle: SettingToggle) -> bool {
        let flag = match toggle {
            SettingToggle::ShowNotifications => &mut self.show_notifications,
            SettingToggle::AutoSave => &mut self.auto_save,
        };
        *flag = !*flag;
        *flag
    }
}

/// Last placement of the floating button, as CSS lengths
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ButtonPosition {
    #[serde(default = "auto")]
    pub top: String,
    #[serde(default = "auto")]
    pub right: String,
    #[serde(default = "auto")]
    pub left: String,
    #[serde(default = "auto")]
    pub bottom: String,
}

fn auto() -> String {
    "auto".to_string()
}

impl Default for ButtonPosition {
    /// Vertically centered on the right edge
    fn default() -> Self {
        ButtonPosition {
            top: "50%".to_string(),
            right: "0px".to_string(),
            left: auto(),
            bottom: auto(),
        }
    }
}

impl ButtonPosition {
    /// The default placement relies on a `translateY(-50%)` transform
    pub fn is_centered(&self) -> bool {
        self.top.ends_with('%')
    }
}
