// Android audio player implementation
// Wraps android.media.MediaPlayer through JNI

use jni::objects::{GlobalRef, JObject, JString, JValue};
use jni::{JNIEnv, JavaVM};
use musicplayer_core::{AudioError, AudioPlayer, AudioSource, Result};
use once_cell::sync::OnceCell;

/// `MediaMetadataRetriever.METADATA_KEY_TITLE`
const METADATA_KEY_TITLE: i32 = 7;

static JAVA_VM: OnceCell<JavaVM> = OnceCell::new();

fn java_vm() -> Result<&'static JavaVM> {
    JAVA_VM.get_or_try_init(|| {
        let ctx = ndk_context::android_context();
        // SAFETY: ndk-context hands out the process-wide JavaVM pointer
        unsafe { JavaVM::from_raw(ctx.vm().cast()) }.map_err(jni_error)
    })
}

fn android_context<'local>() -> JObject<'local> {
    let ctx = ndk_context::android_context();
    // SAFETY: the context is a global reference owned by the activity glue
    unsafe { JObject::from_raw(ctx.context().cast()) }
}

fn jni_error(e: jni::errors::Error) -> AudioError {
    AudioError::PlatformError(format!("JNI error: {}", e))
}

/// Turn a pending Java exception into an error, clearing it so the
/// thread can keep calling into the VM
fn check_exception(env: &mut JNIEnv, action: &str) -> Result<()> {
    if env.exception_check().map_err(jni_error)? {
        let _ = env.exception_describe();
        env.exception_clear().map_err(jni_error)?;
        return Err(AudioError::PlatformError(format!("{} threw a Java exception", action)));
    }
    Ok(())
}

/// Android audio player backed by `android.media.MediaPlayer`.
///
/// The player is created, given its data source and prepared synchronously
/// in [`AndroidAudioPlayer::new`]. Duration is the MediaPlayer's millisecond
/// value converted to seconds.
pub struct AndroidAudioPlayer {
    player: GlobalRef,
    duration: f32,
    title: Option<String>,
}

impl AndroidAudioPlayer {
    pub fn new(source: AudioSource) -> Result<Self> {
        log::info!("Initializing Android MediaPlayer for {}", source);

        let vm = java_vm()?;
        let mut env = vm.attach_current_thread().map_err(jni_error)?;
        let context = android_context();
        let location = source.to_string();

        let uri = Self::parse_uri(&mut env, &location)?;

        let player = env
            .new_object("android/media/MediaPlayer", "()V", &[])
            .map_err(jni_error)?;
        let player = env.new_global_ref(&player).map_err(jni_error)?;

        let prepared = env
            .call_method(
                &player,
                "setDataSource",
                "(Landroid/content/Context;Landroid/net/Uri;)V",
                &[JValue::Object(&context), JValue::Object(&uri)],
            )
            .and_then(|_| env.call_method(&player, "prepare", "()V", &[]));

        if prepared.is_err() || env.exception_check().unwrap_or(false) {
            let _ = env.exception_describe();
            let _ = env.exception_clear();
            Self::release(&mut env, &player);
            return Err(AudioError::LoadError(format!("MediaPlayer could not open {}", source)));
        }

        let millis = env
            .call_method(&player, "getDuration", "()I", &[])
            .and_then(|v| v.i())
            .map_err(jni_error)?;
        let duration = millis.max(0) as f32 / 1000.0;

        let title = match Self::extract_title(&mut env, &context, &uri) {
            Ok(title) => title,
            Err(e) => {
                log::warn!("Could not read title: {}", e);
                None
            }
        };

        log::info!("MediaPlayer prepared: duration={:.3}s title={:?}", duration, title);

        Ok(Self {
            player,
            duration,
            title,
        })
    }

    fn parse_uri<'local>(env: &mut JNIEnv<'local>, location: &str) -> Result<JObject<'local>> {
        let text = env.new_string(location).map_err(jni_error)?;
        let uri = env
            .call_static_method(
                "android/net/Uri",
                "parse",
                "(Ljava/lang/String;)Landroid/net/Uri;",
                &[JValue::Object(&text)],
            )
            .and_then(|v| v.l());
        check_exception(env, "Uri.parse")?;
        uri.map_err(jni_error)
    }

    fn extract_title(
        env: &mut JNIEnv,
        context: &JObject,
        uri: &JObject,
    ) -> Result<Option<String>> {
        let retriever = env
            .new_object("android/media/MediaMetadataRetriever", "()V", &[])
            .map_err(jni_error)?;

        let extracted = env
            .call_method(
                &retriever,
                "setDataSource",
                "(Landroid/content/Context;Landroid/net/Uri;)V",
                &[JValue::Object(context), JValue::Object(uri)],
            )
            .and_then(|_| {
                env.call_method(
                    &retriever,
                    "extractMetadata",
                    "(I)Ljava/lang/String;",
                    &[JValue::Int(METADATA_KEY_TITLE)],
                )
            })
            .and_then(|v| v.l());
        let pending = check_exception(env, "MediaMetadataRetriever");

        if env.call_method(&retriever, "release", "()V", &[]).is_err() {
            let _ = env.exception_clear();
        }
        pending?;

        let value = extracted.map_err(jni_error)?;
        if value.is_null() {
            return Ok(None);
        }

        let value = JString::from(value);
        let title: String = env.get_string(&value).map_err(jni_error)?.into();
        let title = title.trim();
        Ok((!title.is_empty()).then(|| title.to_string()))
    }

    fn release(env: &mut JNIEnv, player: &GlobalRef) {
        if env.call_method(player, "release", "()V", &[]).is_err() {
            let _ = env.exception_clear();
            log::warn!("MediaPlayer.release failed");
        }
    }

    /// Run a MediaPlayer call on an attached thread
    fn with_env<T>(
        &self,
        action: &str,
        f: impl FnOnce(&mut JNIEnv, &GlobalRef) -> jni::errors::Result<T>,
    ) -> Result<T> {
        let vm = java_vm()?;
        let mut env = vm.attach_current_thread().map_err(jni_error)?;
        let result = f(&mut *env, &self.player);
        check_exception(&mut env, action)?;
        result.map_err(jni_error)
    }
}

impl AudioPlayer for AndroidAudioPlayer {
    fn duration(&self) -> f32 {
        self.duration
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn seek_to(&mut self, position: f32) -> Result<()> {
        let millis = (position * 1000.0).round() as i32;
        log::debug!("MediaPlayer.seekTo({})", millis);
        self.with_env("MediaPlayer.seekTo", |env, player| {
            env.call_method(player, "seekTo", "(I)V", &[JValue::Int(millis)])
                .map(|_| ())
        })
    }

    fn play_pause(&mut self) -> Result<()> {
        self.with_env("MediaPlayer.start/pause", |env, player| {
            let playing = env.call_method(player, "isPlaying", "()Z", &[])?.z()?;
            let method = if playing { "pause" } else { "start" };
            log::info!("MediaPlayer.{}()", method);
            env.call_method(player, method, "()V", &[]).map(|_| ())
        })
    }

    fn is_playing(&self) -> bool {
        self.with_env("MediaPlayer.isPlaying", |env, player| {
            env.call_method(player, "isPlaying", "()Z", &[])?.z()
        })
        .unwrap_or_else(|e| {
            log::warn!("{}", e);
            false
        })
    }
}

impl Drop for AndroidAudioPlayer {
    fn drop(&mut self) {
        log::info!("Releasing MediaPlayer");
        match java_vm().and_then(|vm| vm.attach_current_thread().map_err(jni_error)) {
            Ok(mut env) => Self::release(&mut env, &self.player),
            Err(e) => log::error!("Could not release MediaPlayer: {}", e),
        }
    }
}
