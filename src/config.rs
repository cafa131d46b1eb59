/// Extension configuration
use serde::{Deserialize, Serialize};

/// What happens when forwarding a capture to the external API fails
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ForwardPolicy {
    /// The forward is awaited and its failure fails the whole save
    #[default]
    Required,
    /// A forward failure is logged and the local save still succeeds
    BestEffort,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackerConfig {
    #[serde(default = "default_product_slug")]
    pub product_slug: String,
    #[serde(default = "default_display_name")]
    pub display_name: String,
    #[serde(default = "default_button_id")]
    pub button_id: String,
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,
    #[serde(default)]
    pub forwarding_enabled: bool,
    #[serde(default)]
    pub forward_policy: ForwardPolicy,
    #[serde(default = "default_drag_threshold_px")]
    pub drag_threshold_px: f64,
    #[serde(default = "default_snap_feedback_ms")]
    pub snap_feedback_ms: i32,
    #[serde(default = "default_success_ms")]
    pub success_ms: i32,
    #[serde(default = "default_error_ms")]
    pub error_ms: i32,
}

fn default_product_slug() -> String {
    "airdrop-tracker".to_string()
}

fn default_display_name() -> String {
    "Airdrop Tracker".to_string()
}

fn default_button_id() -> String {
    "airdrop-tracker-button".to_string()
}

fn default_api_endpoint() -> String {
    "https://your-website.com/api/save-url".to_string()
}

fn default_drag_threshold_px() -> f64 {
    5.0
}

fn default_snap_feedback_ms() -> i32 {
    300
}

fn default_success_ms() -> i32 {
    2000
}

fn default_error_ms() -> i32 {
    3000
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            product_slug: default_product_slug(),
            display_name: default_display_name(),
            button_id: default_button_id(),
            api_endpoint: default_api_endpoint(),
            forwarding_enabled: false,
            forward_policy: ForwardPolicy::default(),
            drag_threshold_px: default_drag_threshold_px(),
            snap_feedback_ms: default_snap_feedback_ms(),
            success_ms: default_success_ms(),
            error_ms: default_error_ms(),
        }
    }
}

impl TrackerConfig {
    pub fn tooltip_text(&self) -> String {
        format!("Save to {}", self.display_name)
    }

    pub fn tooltip_class(&self) -> String {
        format!("{}-tooltip", self.product_slug)
    }

    pub fn button_class(&self) -> String {
        format!("{}-button", self.product_slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrackerConfig::default();
        assert_eq!(config.button_id, "airdrop-tracker-button");
        assert_eq!(config.drag_threshold_px, 5.0);
        assert_eq!(config.snap_feedback_ms, 300);
        assert!(!config.forwarding_enabled);
        assert_eq!(config.forward_policy, ForwardPolicy::Required);
        assert_eq!(config.tooltip_text(), "Save to Airdrop Tracker");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: TrackerConfig =
            serde_json::from_str(r#"{"forwardingEnabled": true, "forwardPolicy": "bestEffort"}"#).unwrap();
        assert!(config.forwarding_enabled);
        assert_eq!(config.forward_policy, ForwardPolicy::BestEffort);
        assert_eq!(config.error_ms, 3000);
        assert_eq!(config.product_slug, "airdrop-tracker");
    }
}
