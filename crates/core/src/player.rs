// Shared contract for the platform audio adapters

use crate::error::Result;
use crate::source::AudioSource;

/// Core audio player trait.
/// Each platform supplies exactly one implementation, chosen at build time.
///
/// An adapter owns a single native player. It is created from one
/// [`AudioSource`] and releases the native player when dropped; there is no
/// explicit stop or dispose.
pub trait AudioPlayer {
    /// Total track length in seconds, fixed for the life of the adapter.
    /// Adapters that learn it asynchronously report `0.0` until it is known.
    fn duration(&self) -> f32;

    /// Whether the duration is still being loaded in the background.
    /// Only such adapters are polled until [`duration`](Self::duration) turns positive;
    /// a duration that is 0 after construction stays 0.
    fn duration_pending(&self) -> bool {
        false
    }

    /// Track title from the file metadata, if the platform exposes one
    fn title(&self) -> Option<&str>;

    /// Jump the native player to `position` seconds.
    /// Range is not validated here; the native player's clamping applies.
    fn seek_to(&mut self, position: f32) -> Result<()>;

    /// Pause if the native player reports playing, start otherwise
    fn play_pause(&mut self) -> Result<()>;

    /// Playing state as reported by the native player
    fn is_playing(&self) -> bool;
}

/// Builds adapters for selected sources.
///
/// Construction errors from the native framework are returned untouched.
pub trait PlayerFactory {
    fn open(&self, source: AudioSource) -> Result<Box<dyn AudioPlayer>>;
}

impl<F> PlayerFactory for F
where
    F: Fn(AudioSource) -> Result<Box<dyn AudioPlayer>>,
{
    fn open(&self, source: AudioSource) -> Result<Box<dyn AudioPlayer>> {
        self(source)
    }
}
