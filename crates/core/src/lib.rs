// Core types for the music player: adapter contract, seek animation and screen state

pub mod animation;
pub mod callback;
pub mod config;
pub mod error;
pub mod player;
pub mod scheduler;
pub mod screen;
pub mod source;
pub mod state;
pub mod time;

// Re-export commonly used types
pub use animation::{AnimationToken, SeekAnimation, Tick};
pub use callback::{ObserverList, ScreenEvent, ScreenObserver};
pub use config::ScreenConfig;
pub use error::{AudioError, Result};
pub use player::{AudioPlayer, PlayerFactory};
pub use scheduler::{FrameRequest, FrameScheduler};
pub use screen::{PlayPauseIcon, PlayerScreen, ScreenContent, ScreenView};
pub use source::{AudioSource, SourceLocation};
pub use state::PlaybackState;
pub use time::time_string;
