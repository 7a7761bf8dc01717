// Error handling for the player core and platform adapters

use std::fmt;

/// Audio player error types
#[derive(Debug, Clone, PartialEq)]
pub enum AudioError {
    /// The selected source could not be opened or has no audio track
    LoadError(String),

    /// Audio format not supported
    UnsupportedFormat(String),

    /// Decoding error
    DecodingError(String),

    /// Device error (no output device, stream could not be built)
    DeviceError(String),

    /// The native player rejected a playback command
    PlaybackError(String),

    /// IO error
    IoError(String),

    /// Error raised by a platform media framework (JNI, Objective-C, JS)
    PlatformError(String),

    /// An operation needed a loaded source but none is selected
    NoSource,
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AudioError::LoadError(msg) => write!(f, "Load error: {}", msg),
            AudioError::UnsupportedFormat(msg) => write!(f, "Unsupported format: {}", msg),
            AudioError::DecodingError(msg) => write!(f, "Decoding error: {}", msg),
            AudioError::DeviceError(msg) => write!(f, "Device error: {}", msg),
            AudioError::PlaybackError(msg) => write!(f, "Playback error: {}", msg),
            AudioError::IoError(msg) => write!(f, "IO error: {}", msg),
            AudioError::PlatformError(msg) => write!(f, "Platform error: {}", msg),
            AudioError::NoSource => write!(f, "No song selected"),
        }
    }
}

impl std::error::Error for AudioError {}

/// Result type alias for audio operations
pub type Result<T> = std::result::Result<T, AudioError>;

impl From<std::io::Error> for AudioError {
    fn from(err: std::io::Error) -> Self {
        AudioError::IoError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_message() {
        let err = AudioError::LoadError("no default track".to_string());
        assert_eq!(err.to_string(), "Load error: no default track");
        assert_eq!(AudioError::NoSource.to_string(), "No song selected");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.mp3");
        let err: AudioError = io.into();
        assert!(matches!(err, AudioError::IoError(ref msg) if msg.contains("missing.mp3")));
    }
}
