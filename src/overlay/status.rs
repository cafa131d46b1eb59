/// Visual states of the floating button

use crate::config::TrackerConfig;

/// Class applied for the short snap animation after a drag
pub const SNAPPING_CLASS: &str = "snapping";
/// Class applied while the button follows the pointer
pub const DRAGGING_CLASS: &str = "dragging";
/// Class that reveals the tooltip on hover
pub const TOOLTIP_SHOW_CLASS: &str = "show";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonStatus {
    Idle,
    Loading,
    Success,
    Error,
}

impl ButtonStatus {
    pub const ALL_CLASSES: [&'static str; 3] = ["loading", "success", "error"];

    pub fn class(self) -> Option<&'static str> {
        match self {
            ButtonStatus::Idle => None,
            ButtonStatus::Loading => Some("loading"),
            ButtonStatus::Success => Some("success"),
            ButtonStatus::Error => Some("error"),
        }
    }

    pub fn tooltip(self, config: &TrackerConfig) -> String {
        match self {
            ButtonStatus::Idle => config.tooltip_text(),
            ButtonStatus::Loading => "Saving...".to_string(),
            ButtonStatus::Success => "Saved successfully!".to_string(),
            ButtonStatus::Error => "Failed to save".to_string(),
        }
    }

    /// How long a terminal state stays before reverting to idle
    pub fn revert_after_ms(self, config: &TrackerConfig) -> Option<i32> {
        match self {
            ButtonStatus::Success => Some(config.success_ms),
            ButtonStatus::Error => Some(config.error_ms),
            ButtonStatus::Idle | ButtonStatus::Loading => None,
        }
    }

    /// A new capture may only start when nothing is pending
    pub fn accepts_click(self) -> bool {
        !matches!(self, ButtonStatus::Loading)
    }
}

/// Tracks the status shown on the button. Each change bumps a generation so
/// a revert timer armed for an older status cannot clobber a newer one.
#[derive(Debug, Clone)]
pub struct StatusTracker {
    status: ButtonStatus,
    generation: u32,
}

impl Default for StatusTracker {
    fn default() -> Self {
        StatusTracker {
            status: ButtonStatus::Idle,
            generation: 0,
        }
    }
}

impl StatusTracker {
    pub fn status(&self) -> ButtonStatus {
        self.status
    }

    /// Switch status and return the generation to hand to a revert timer
    pub fn set(&mut self, status: ButtonStatus) -> u32 {
        self.status = status;
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    /// Revert to idle if nothing changed since `generation` was issued
    pub fn revert(&mut self, generation: u32) -> bool {
        if self.generation != generation {
            return false;
        }
        self.set(ButtonStatus::Idle);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_texts_and_durations() {
        let config = TrackerConfig::default();

        assert_eq!(ButtonStatus::Idle.tooltip(&config), "Save to Airdrop Tracker");
        assert_eq!(ButtonStatus::Loading.tooltip(&config), "Saving...");
        assert_eq!(ButtonStatus::Success.revert_after_ms(&config), Some(2000));
        assert_eq!(ButtonStatus::Error.revert_after_ms(&config), Some(3000));
        assert_eq!(ButtonStatus::Loading.revert_after_ms(&config), None);
    }

    #[test]
    fn test_loading_blocks_clicks() {
        assert!(!ButtonStatus::Loading.accepts_click());
        assert!(ButtonStatus::Success.accepts_click());
        assert!(ButtonStatus::Idle.accepts_click());
    }

    #[test]
    fn test_stale_revert_is_ignored() {
        let mut tracker = StatusTracker::default();
        let first = tracker.set(ButtonStatus::Error);
        let second = tracker.set(ButtonStatus::Success);

        assert!(!tracker.revert(first));
        assert_eq!(tracker.status(), ButtonStatus::Success);

        assert!(tracker.revert(second));
        assert_eq!(tracker.status(), ButtonStatus::Idle);
    }
}
