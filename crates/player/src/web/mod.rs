// Browser audio player implementation
// Wraps an HTMLAudioElement through web-sys

use musicplayer_core::{AudioError, AudioPlayer, AudioSource, Result};
use std::cell::Cell;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlAudioElement, HtmlMediaElement, Url};

fn js_error(context: &str, value: JsValue) -> AudioError {
    AudioError::PlatformError(format!("{}: {:?}", context, value))
}

/// Wait for the promise returned by `play()`. A rejection (autoplay policy,
/// undecodable source) comes back as its reason.
async fn settle_play(promise: js_sys::Promise) -> std::result::Result<(), String> {
    JsFuture::from(promise)
        .await
        .map(|_| ())
        .map_err(|reason| format!("{:?}", reason))
}

/// Wrap a file picked through `<input type="file">` as an [`AudioSource`].
///
/// The file is exposed to the audio element through an object URL, which
/// [`WebAudioPlayer`] revokes when it is dropped.
pub fn source_from_file(file: &web_sys::File) -> Result<AudioSource> {
    let url = Url::create_object_url_with_blob(file)
        .map_err(|e| js_error("URL.createObjectURL", e))?;
    Ok(AudioSource::from_uri(url).with_name(file.name()))
}

/// Browser audio player backed by `HTMLAudioElement`.
///
/// The element loads metadata asynchronously, so [`AudioPlayer::duration`]
/// reports 0 until `loadedmetadata` has fired. Once a finite value is seen it
/// is kept for the lifetime of the player.
pub struct WebAudioPlayer {
    element: HtmlAudioElement,
    object_url: Option<String>,
    duration: Cell<Option<f32>>,
}

impl WebAudioPlayer {
    pub fn new(source: AudioSource) -> Result<Self> {
        log::info!("Creating audio element for {}", source);

        let url = source.uri();
        let element = HtmlAudioElement::new_with_src(&url)
            .map_err(|e| AudioError::LoadError(format!("{:?}", e)))?;
        element.set_preload("metadata");

        let object_url = url.starts_with("blob:").then_some(url);

        Ok(Self {
            element,
            object_url,
            duration: Cell::new(None),
        })
    }
}

impl AudioPlayer for WebAudioPlayer {
    fn duration(&self) -> f32 {
        if let Some(duration) = self.duration.get() {
            return duration;
        }

        // NaN until metadata arrives, +Infinity for live streams
        let reported = self.element.duration();
        if reported.is_finite() && reported > 0.0 {
            let duration = reported as f32;
            log::info!("Audio element duration known: {:.3}s", duration);
            self.duration.set(Some(duration));
            duration
        } else {
            0.0
        }
    }

    fn duration_pending(&self) -> bool {
        self.duration.get().is_none()
            && self.element.ready_state() < HtmlMediaElement::HAVE_METADATA
            && self.element.network_state() != HtmlMediaElement::NETWORK_NO_SOURCE
    }

    fn title(&self) -> Option<&str> {
        None
    }

    fn seek_to(&mut self, position: f32) -> Result<()> {
        log::debug!("audio.currentTime = {}", position);
        self.element.set_current_time(position as f64);
        Ok(())
    }

    fn play_pause(&mut self) -> Result<()> {
        if self.element.paused() {
            log::info!("audio.play()");
            let promise = self.element.play().map_err(|e| js_error("audio.play", e))?;
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(reason) = settle_play(promise).await {
                    log::warn!("audio.play() was rejected: {}", reason);
                }
            });
        } else {
            log::info!("audio.pause()");
            self.element.pause().map_err(|e| js_error("audio.pause", e))?;
        }
        Ok(())
    }

    fn is_playing(&self) -> bool {
        !self.element.paused()
    }
}

impl Drop for WebAudioPlayer {
    fn drop(&mut self) {
        log::info!("Releasing audio element");
        if let Err(e) = self.element.pause() {
            log::warn!("audio.pause failed on release: {:?}", e);
        }
        if let Some(url) = self.object_url.take() {
            if let Err(e) = Url::revoke_object_url(&url) {
                log::warn!("URL.revokeObjectURL failed: {:?}", e);
            }
        }
    }
}
