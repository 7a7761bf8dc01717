// Screen-owned playback state

/// What the screen knows about the loaded track.
///
/// `position` stays within `[0, duration]`. `duration` is set once it is
/// known and not changed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    /// Visual seek position in seconds
    pub position: f32,
    /// Total duration in seconds (`0.0` while unknown)
    pub duration: f32,
    /// Whether the seek interpolation is running
    pub is_playing: bool,
    /// Track title, if the metadata had one
    pub title: Option<String>,
}

impl PlaybackState {
    pub fn new(duration: f32, title: Option<String>) -> Self {
        Self {
            position: 0.0,
            duration: sanitize_duration(duration),
            is_playing: false,
            title,
        }
    }

    pub fn duration_known(&self) -> bool {
        self.duration > 0.0
    }

    /// Clamp a requested position into the slider range
    pub fn clamp_position(&self, position: f32) -> f32 {
        if position.is_nan() {
            return 0.0;
        }
        position.clamp(0.0, self.duration)
    }

    /// Progress fraction (0.0 to 1.0)
    pub fn progress(&self) -> f32 {
        if self.duration_known() {
            (self.position / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn at_end(&self) -> bool {
        self.duration_known() && self.position >= self.duration
    }
}

/// Adapters may report NaN or negative values before metadata is ready
pub(crate) fn sanitize_duration(duration: f32) -> f32 {
    if duration.is_finite() && duration > 0.0 {
        duration
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_position() {
        let state = PlaybackState::new(120.0, None);
        assert_eq!(state.clamp_position(-3.0), 0.0);
        assert_eq!(state.clamp_position(60.5), 60.5);
        assert_eq!(state.clamp_position(500.0), 120.0);
        assert_eq!(state.clamp_position(f32::NAN), 0.0);
    }

    #[test]
    fn test_unknown_duration() {
        let state = PlaybackState::new(f32::NAN, Some("Intro".to_string()));
        assert!(!state.duration_known());
        assert_eq!(state.progress(), 0.0);
        assert_eq!(state.clamp_position(10.0), 0.0);
    }

    #[test]
    fn test_progress_and_end() {
        let mut state = PlaybackState::new(200.0, None);
        state.position = 50.0;
        assert_eq!(state.progress(), 0.25);
        assert!(!state.at_end());
        state.position = 200.0;
        assert!(state.at_end());
    }
}
