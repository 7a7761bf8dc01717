// Platform audio adapters
// One AudioPlayer implementation per target, chosen at compile time:
// Android (MediaPlayer), iOS (AVAudioPlayer), browser (HTMLAudioElement),
// and desktop Windows/macOS/Linux (symphonia + cpal)

#[cfg(target_os = "android")]
pub mod android;

#[cfg(target_os = "ios")]
pub mod ios;

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(not(any(target_os = "android", target_os = "ios", target_arch = "wasm32")))]
pub mod decoder;
#[cfg(not(any(target_os = "android", target_os = "ios", target_arch = "wasm32")))]
pub mod desktop;
#[cfg(not(any(target_os = "android", target_os = "ios", target_arch = "wasm32")))]
pub mod metadata;

use musicplayer_core::{AudioPlayer, AudioSource, PlayerFactory, Result};
use once_cell::sync::OnceCell;

static LOGGING: OnceCell<()> = OnceCell::new();

/// Initialize logging based on platform. Safe to call more than once.
pub fn init_logging() {
    LOGGING.get_or_init(|| {
        #[cfg(target_os = "android")]
        {
            android_logger::init_once(
                android_logger::Config::default()
                    .with_max_level(log::LevelFilter::Debug)
                    .with_tag("MusicPlayer"),
            );
        }

        #[cfg(not(any(target_os = "android", target_arch = "wasm32")))]
        {
            // Another logger may already be installed by the host application
            let _ = env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or("info"),
            )
            .try_init();
        }
    });
}

/// Name of the adapter compiled into this build
#[cfg(target_os = "android")]
pub const PLATFORM: &str = "android";
#[cfg(target_os = "ios")]
pub const PLATFORM: &str = "ios";
#[cfg(target_arch = "wasm32")]
pub const PLATFORM: &str = "web";
#[cfg(not(any(target_os = "android", target_os = "ios", target_arch = "wasm32")))]
pub const PLATFORM: &str = "desktop";

/// Create the audio player for the current platform from a selected file
pub fn create_player(source: AudioSource) -> Result<Box<dyn AudioPlayer>> {
    log::info!("Creating {} audio player for {}", PLATFORM, source);
    platform_player(source)
}

#[cfg(target_os = "android")]
fn platform_player(source: AudioSource) -> Result<Box<dyn AudioPlayer>> {
    Ok(Box::new(android::AndroidAudioPlayer::new(source)?))
}

#[cfg(target_os = "ios")]
fn platform_player(source: AudioSource) -> Result<Box<dyn AudioPlayer>> {
    Ok(Box::new(ios::IosAudioPlayer::new(source)?))
}

#[cfg(target_arch = "wasm32")]
fn platform_player(source: AudioSource) -> Result<Box<dyn AudioPlayer>> {
    Ok(Box::new(web::WebAudioPlayer::new(source)?))
}

#[cfg(not(any(target_os = "android", target_os = "ios", target_arch = "wasm32")))]
fn platform_player(source: AudioSource) -> Result<Box<dyn AudioPlayer>> {
    Ok(Box::new(desktop::DesktopAudioPlayer::new(source)?))
}

/// [`PlayerFactory`] backed by [`create_player`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformPlayerFactory;

impl PlayerFactory for PlatformPlayerFactory {
    fn open(&self, source: AudioSource) -> Result<Box<dyn AudioPlayer>> {
        create_player(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging();
        init_logging();
        assert!(LOGGING.get().is_some());
    }

    #[cfg(not(any(target_os = "android", target_os = "ios", target_arch = "wasm32")))]
    #[test]
    fn test_factory_propagates_open_failure() {
        let err = PlatformPlayerFactory
            .open(AudioSource::from_path("/definitely/not/here.mp3"))
            .err()
            .expect("opening a missing file must fail");
        assert!(matches!(err, musicplayer_core::AudioError::LoadError(_)));
    }
}
