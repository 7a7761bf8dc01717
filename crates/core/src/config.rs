// Screen configuration

use std::time::Duration;

/// Default frame interval (~60 fps)
const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

/// Player screen settings
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenConfig {
    /// Interval between interpolation frames
    pub frame_interval: Duration,
    /// Text shown while no song is selected
    pub placeholder: String,
    /// Label of the pick-file action
    pub pick_label: String,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(DEFAULT_FRAME_INTERVAL_MS),
            placeholder: "Song not selected.".to_string(),
            pick_label: "Pick a song from storage".to_string(),
        }
    }
}

impl ScreenConfig {
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        // A zero interval would make the event loop spin
        self.frame_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_pick_label(mut self, label: impl Into<String>) -> Self {
        self.pick_label = label.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_interval_floor() {
        let config = ScreenConfig::default().with_frame_interval(Duration::ZERO);
        assert_eq!(config.frame_interval, Duration::from_millis(1));
    }

    #[test]
    fn test_defaults() {
        let config = ScreenConfig::default();
        assert_eq!(config.frame_interval, Duration::from_millis(16));
        assert_eq!(config.placeholder, "Song not selected.");
    }
}
