// Desktop audio player implementation using symphonia + cpal
// Supports Windows, macOS, and Linux

use crate::decoder::{AudioDecoder, AudioRingBuffer};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Stream, StreamConfig};
use musicplayer_core::{AudioError, AudioPlayer, AudioSource, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Seconds of audio the ring buffer holds
const BUFFER_DURATION_SECS: usize = 2;

/// Pre-buffer target in milliseconds (amount to decode before playback starts)
const PRE_BUFFER_MS: u64 = 100;

/// Decoder thread idle sleep while paused or finished
const IDLE_SLEEP_MS: u64 = 10;

/// State shared with the decoder thread and the output callback
struct Shared {
    ring_buffer: Mutex<AudioRingBuffer>,
    decoder: Mutex<AudioDecoder>,
    /// Native playing state; cleared by the output callback at end of track
    is_playing: AtomicBool,
    /// Decoder has produced its last packet
    end_of_stream: AtomicBool,
    /// Bumped on every seek so in-flight decoded samples are discarded
    seek_epoch: AtomicU64,
    stop_decoder: AtomicBool,
}

impl Shared {
    fn finished(&self) -> bool {
        self.end_of_stream.load(Ordering::Acquire) && self.ring_buffer.lock().is_empty()
    }
}

/// Desktop audio player.
///
/// The "native player" here is a decoder thread feeding a cpal output
/// stream. Duration comes from the container's frame count and is exact.
pub struct DesktopAudioPlayer {
    shared: Arc<Shared>,
    audio_stream: Stream,
    decoder_thread: Option<thread::JoinHandle<()>>,
    duration: f32,
    title: Option<String>,
}

impl DesktopAudioPlayer {
    pub fn new(source: AudioSource) -> Result<Self> {
        log::info!("Initializing desktop audio player for {}", source);

        let path = source.local_path().ok_or_else(|| {
            AudioError::LoadError(format!("{} is not a local file", source))
        })?;
        let decoder = AudioDecoder::open(&path)?;

        let sample_rate = decoder.format.sample_rate;
        let channels = decoder.format.output_channels;
        let duration = decoder.format.duration_secs as f32;
        let title = decoder.title().map(str::to_owned);

        let ring_size = sample_rate as usize * channels as usize * BUFFER_DURATION_SECS;
        let shared = Arc::new(Shared {
            ring_buffer: Mutex::new(AudioRingBuffer::new(ring_size)),
            decoder: Mutex::new(decoder),
            is_playing: AtomicBool::new(false),
            end_of_stream: AtomicBool::new(false),
            seek_epoch: AtomicU64::new(0),
            stop_decoder: AtomicBool::new(false),
        });

        let audio_stream = Self::build_stream(&shared, sample_rate, channels)?;

        let mut player = Self {
            shared,
            audio_stream,
            decoder_thread: None,
            duration,
            title,
        };
        player.prebuffer();
        player.start_decoder_thread();

        log::info!("Audio file loaded successfully");
        Ok(player)
    }

    fn build_stream(shared: &Arc<Shared>, sample_rate: u32, channels: u16) -> Result<Stream> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| AudioError::DeviceError("No output device available".to_string()))?;

        log::info!(
            "Using audio device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let config = StreamConfig {
            channels,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };
        log::debug!("Stream config: {:?}", config);

        let shared = shared.clone();
        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if !shared.is_playing.load(Ordering::Acquire) {
                        data.fill(0.0);
                        return;
                    }

                    let read = shared.ring_buffer.lock().read(data);
                    if read < data.len() {
                        data[read..].fill(0.0);
                    }

                    // Buffer drained after the last packet: the track is over
                    if read == 0 && shared.end_of_stream.load(Ordering::Acquire) {
                        shared.is_playing.store(false, Ordering::Release);
                        log::info!("Playback completed");
                    }
                },
                |err| {
                    log::error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| AudioError::DeviceError(format!("Failed to build output stream: {}", e)))?;

        // Some hosts start streams on creation
        if let Err(e) = stream.pause() {
            log::debug!("Could not pause new stream: {}", e);
        }

        Ok(stream)
    }

    /// Pre-buffer audio data to reduce initial playback latency
    fn prebuffer(&mut self) {
        let mut decoder = self.shared.decoder.lock();
        let target_samples = (PRE_BUFFER_MS * decoder.format.sample_rate as u64 / 1000) as usize
            * decoder.format.output_channels as usize;
        let mut total_buffered = 0;

        while total_buffered < target_samples {
            match decoder.decode_next() {
                Ok(Some(samples)) => {
                    let written = self.shared.ring_buffer.lock().write(&samples);
                    total_buffered += written;
                    if written < samples.len() {
                        break;
                    }
                }
                Ok(None) => {
                    log::debug!("Pre-buffer: reached end of audio after {} samples", total_buffered);
                    self.shared.end_of_stream.store(true, Ordering::Release);
                    break;
                }
                Err(e) => {
                    log::warn!("Pre-buffer decode error: {}", e);
                    break;
                }
            }
        }

        log::debug!("Pre-buffered {} samples", total_buffered);
    }

    fn start_decoder_thread(&mut self) {
        let shared = self.shared.clone();

        let handle = thread::spawn(move || {
            log::debug!("Decoder thread started");

            loop {
                if shared.stop_decoder.load(Ordering::Acquire) {
                    break;
                }

                if !shared.is_playing.load(Ordering::Acquire)
                    || shared.end_of_stream.load(Ordering::Acquire)
                {
                    thread::sleep(Duration::from_millis(IDLE_SLEEP_MS));
                    continue;
                }

                // Decode with the decoder lock held, write after releasing it
                let epoch = shared.seek_epoch.load(Ordering::Acquire);
                let decoded = shared.decoder.lock().decode_next();

                match decoded {
                    Ok(Some(samples)) => Self::write_samples(&shared, &samples, epoch),
                    Ok(None) => {
                        log::debug!("Decoder reached end of stream");
                        shared.end_of_stream.store(true, Ordering::Release);
                    }
                    Err(e) => {
                        log::error!("Decoding error: {}", e);
                        shared.end_of_stream.store(true, Ordering::Release);
                    }
                }
            }

            log::debug!("Decoder thread exited");
        });

        self.decoder_thread = Some(handle);
    }

    fn write_samples(shared: &Shared, samples: &[f32], epoch: u64) {
        let mut written = 0;
        while written < samples.len() {
            if shared.stop_decoder.load(Ordering::Acquire) {
                return;
            }

            let mut buffer = shared.ring_buffer.lock();
            // A seek cleared the buffer while these samples were decoding
            if shared.seek_epoch.load(Ordering::Acquire) != epoch {
                return;
            }
            let w = buffer.write(&samples[written..]);
            drop(buffer);

            if w == 0 {
                thread::sleep(Duration::from_millis(5));
            } else {
                written += w;
            }
        }
    }

    fn stop_decoder_thread(&mut self) {
        self.shared.stop_decoder.store(true, Ordering::Release);
        if let Some(handle) = self.decoder_thread.take() {
            if handle.join().is_err() {
                log::error!("Decoder thread panicked");
            }
        }
    }

    fn seek_decoder(&self, position: f64) -> Result<()> {
        let mut decoder = self.shared.decoder.lock();
        decoder.seek(position)?;

        let mut buffer = self.shared.ring_buffer.lock();
        buffer.clear();
        self.shared.seek_epoch.fetch_add(1, Ordering::AcqRel);
        self.shared.end_of_stream.store(false, Ordering::Release);
        Ok(())
    }
}

impl AudioPlayer for DesktopAudioPlayer {
    fn duration(&self) -> f32 {
        self.duration
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn seek_to(&mut self, position: f32) -> Result<()> {
        log::debug!("Seeking to {:.3}s", position);
        self.seek_decoder(position as f64)
    }

    fn play_pause(&mut self) -> Result<()> {
        if self.shared.is_playing.load(Ordering::Acquire) {
            self.shared.is_playing.store(false, Ordering::Release);
            self.audio_stream
                .pause()
                .map_err(|e| AudioError::PlaybackError(format!("Failed to pause stream: {}", e)))?;
            log::info!("Playback paused");
            return Ok(());
        }

        // Like the mobile players, starting again after completion restarts the track
        if self.shared.finished() {
            log::debug!("Restarting finished track");
            self.seek_decoder(0.0)?;
        }

        self.shared.is_playing.store(true, Ordering::Release);
        self.audio_stream
            .play()
            .map_err(|e| AudioError::PlaybackError(format!("Failed to start stream: {}", e)))?;
        log::info!("Playback started");
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.shared.is_playing.load(Ordering::Acquire)
    }
}

impl Drop for DesktopAudioPlayer {
    fn drop(&mut self) {
        log::info!("Releasing desktop audio player");
        self.shared.is_playing.store(false, Ordering::Release);
        if let Err(e) = self.audio_stream.pause() {
            log::debug!("Failed to pause stream on release: {}", e);
        }
        self.stop_decoder_thread();
    }
}
