// iOS audio player implementation
// Wraps AVFoundation's AVAudioPlayer through the Objective-C runtime

use musicplayer_core::{AudioError, AudioPlayer, AudioSource, Result, SourceLocation};
use objc::runtime::{Class, Object, NO};
use objc::{msg_send, sel, sel_impl};
use std::ffi::CStr;
use std::os::raw::c_char;

#[link(name = "AVFoundation", kind = "framework")]
extern "C" {}

#[link(name = "Foundation", kind = "framework")]
extern "C" {}

/// `NSUTF8StringEncoding`
const NS_UTF8_STRING_ENCODING: usize = 4;

type Id = *mut Object;

fn class(name: &str) -> Result<&'static Class> {
    Class::get(name).ok_or_else(|| AudioError::PlatformError(format!("{} is not available", name)))
}

/// Autoreleased NSString from a Rust string
unsafe fn ns_string(value: &str) -> Result<Id> {
    let string: Id = msg_send![class("NSString")?, alloc];
    let string: Id = msg_send![string,
        initWithBytes: value.as_ptr()
        length: value.len()
        encoding: NS_UTF8_STRING_ENCODING];
    if string.is_null() {
        return Err(AudioError::PlatformError("NSString allocation failed".to_string()));
    }
    Ok(msg_send![string, autorelease])
}

unsafe fn ns_url(source: &AudioSource) -> Result<Id> {
    let url: Id = match source.location() {
        SourceLocation::Path(path) => {
            let path = ns_string(&path.to_string_lossy())?;
            msg_send![class("NSURL")?, fileURLWithPath: path]
        }
        SourceLocation::Uri(uri) => {
            let uri = ns_string(uri)?;
            msg_send![class("NSURL")?, URLWithString: uri]
        }
    };
    if url.is_null() {
        return Err(AudioError::LoadError(format!("{} is not a valid URL", source)));
    }
    Ok(url)
}

unsafe fn error_description(error: Id) -> String {
    if error.is_null() {
        return "unknown error".to_string();
    }
    let description: Id = msg_send![error, localizedDescription];
    if description.is_null() {
        return "unknown error".to_string();
    }
    let utf8: *const c_char = msg_send![description, UTF8String];
    if utf8.is_null() {
        return "unknown error".to_string();
    }
    CStr::from_ptr(utf8).to_string_lossy().into_owned()
}

/// iOS audio player backed by `AVAudioPlayer`.
///
/// Duration is truncated to whole seconds. The file's title is not read.
pub struct IosAudioPlayer {
    player: Id,
    duration: f32,
}

impl IosAudioPlayer {
    pub fn new(source: AudioSource) -> Result<Self> {
        log::info!("Initializing AVAudioPlayer for {}", source);

        // SAFETY: every object below is either autoreleased or owned by `player`,
        // which is released in Drop
        unsafe {
            let url = ns_url(&source)?;

            let mut error: Id = std::ptr::null_mut();
            let player: Id = msg_send![class("AVAudioPlayer")?, alloc];
            let player: Id = msg_send![player, initWithContentsOfURL: url error: &mut error as *mut Id];
            if player.is_null() {
                let message = error_description(error);
                log::error!("AVAudioPlayer failed to open {}: {}", source, message);
                return Err(AudioError::LoadError(message));
            }

            let prepared: objc::runtime::BOOL = msg_send![player, prepareToPlay];
            if prepared == NO {
                log::warn!("AVAudioPlayer.prepareToPlay returned NO");
            }

            let seconds: f64 = msg_send![player, duration];
            let duration = seconds.max(0.0).trunc() as f32;
            log::info!("AVAudioPlayer ready: duration={}s", duration);

            Ok(Self { player, duration })
        }
    }
}

impl AudioPlayer for IosAudioPlayer {
    fn duration(&self) -> f32 {
        self.duration
    }

    fn title(&self) -> Option<&str> {
        None
    }

    fn seek_to(&mut self, position: f32) -> Result<()> {
        log::debug!("AVAudioPlayer.setCurrentTime({})", position);
        // SAFETY: `player` is a live AVAudioPlayer for the lifetime of self
        unsafe {
            let _: () = msg_send![self.player, setCurrentTime: position as f64];
        }
        Ok(())
    }

    fn play_pause(&mut self) -> Result<()> {
        // SAFETY: `player` is a live AVAudioPlayer for the lifetime of self
        unsafe {
            if self.is_playing() {
                log::info!("AVAudioPlayer.pause()");
                let _: () = msg_send![self.player, pause];
            } else {
                log::info!("AVAudioPlayer.play()");
                let started: objc::runtime::BOOL = msg_send![self.player, play];
                if started == NO {
                    return Err(AudioError::PlaybackError(
                        "AVAudioPlayer refused to play".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    fn is_playing(&self) -> bool {
        // SAFETY: `player` is a live AVAudioPlayer for the lifetime of self
        let playing: objc::runtime::BOOL = unsafe { msg_send![self.player, isPlaying] };
        playing != NO
    }
}

impl Drop for IosAudioPlayer {
    fn drop(&mut self) {
        log::info!("Releasing AVAudioPlayer");
        // SAFETY: `player` came from alloc/init, so this is the owning reference
        unsafe {
            let _: () = msg_send![self.player, stop];
            let _: () = msg_send![self.player, release];
        }
    }
}
