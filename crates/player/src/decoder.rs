// Audio decoding using Symphonia
// Handles the formats symphonia ships with (MP3, AAC, FLAC, WAV, Vorbis, ...)

use crate::metadata;
use musicplayer_core::{AudioError, Result};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::{Hint, ProbeResult};
use symphonia::core::units::Time;
use std::fs::File;
use std::path::Path;

/// Audio format information
#[derive(Debug, Clone)]
pub struct AudioFormat {
    pub sample_rate: u32,
    /// Channels in the file
    pub channels: u16,
    /// Channels handed to the output (mono is duplicated to stereo)
    pub output_channels: u16,
    /// Track length in seconds, `0.0` if it could not be determined
    pub duration_secs: f64,
}

/// Audio decoder wrapper
pub struct AudioDecoder {
    format_reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_buf: Option<SampleBuffer<f32>>,
    title: Option<String>,
    pub format: AudioFormat,
}

impl AudioDecoder {
    /// Open and probe a file, failing if it has no decodable audio track
    pub fn open(path: &Path) -> Result<Self> {
        let hint = Self::create_hint_from_path(path);
        let mut probe_result = Self::probe(path, &hint)?;

        let track = probe_result
            .format
            .tracks()
            .iter()
            .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| AudioError::LoadError("No audio track found".to_string()))?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        // Create decoder for the track
        let decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| AudioError::DecodingError(format!("Failed to create decoder: {}", e)))?;

        let sample_rate = codec_params
            .sample_rate
            .ok_or_else(|| AudioError::UnsupportedFormat("Sample rate not specified".to_string()))?;
        let channels = codec_params
            .channels
            .ok_or_else(|| AudioError::UnsupportedFormat("Channels not specified".to_string()))?
            .count() as u16;

        let duration_secs = match codec_params.n_frames {
            Some(n_frames) => match codec_params.time_base {
                Some(time_base) => time_to_secs(time_base.calc_time(n_frames)),
                None => n_frames as f64 / sample_rate as f64,
            },
            None => {
                log::debug!("Container has no frame count, scanning packets");
                Self::scan_duration(path, &hint, track_id, sample_rate).unwrap_or(0.0)
            }
        };

        let title = metadata::extract_title(&mut probe_result.metadata, probe_result.format.as_mut());

        let format = AudioFormat {
            sample_rate,
            channels,
            output_channels: channels.max(2),
            duration_secs,
        };

        log::info!(
            "Loaded audio: {}Hz, {} channels, {:.3}s, title {:?}",
            format.sample_rate,
            format.channels,
            format.duration_secs,
            title
        );

        Ok(Self {
            format_reader: probe_result.format,
            decoder,
            track_id,
            sample_buf: None,
            title,
            format,
        })
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Decode the next packet of our track into interleaved f32 samples.
    /// Returns `None` at end of stream.
    pub fn decode_next(&mut self) -> Result<Option<Vec<f32>>> {
        loop {
            let packet = match self.format_reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    return Ok(None);
                }
                Err(SymphoniaError::ResetRequired) => {
                    log::warn!("Stream reset required, treating as end of track");
                    return Ok(None);
                }
                Err(e) => {
                    return Err(AudioError::DecodingError(format!("Failed to read packet: {}", e)));
                }
            };

            // Skip packets that don't belong to our track
            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    log::warn!("Skipping undecodable packet: {}", e);
                    continue;
                }
                Err(e) => {
                    return Err(AudioError::DecodingError(format!("Failed to decode packet: {}", e)));
                }
            };

            let spec = *decoded.spec();
            let capacity = decoded.capacity() as u64;
            let needs_new_buffer = self
                .sample_buf
                .as_ref()
                .map_or(true, |buf| buf.capacity() < decoded.capacity() * spec.channels.count());
            if needs_new_buffer {
                self.sample_buf = Some(SampleBuffer::new(capacity, spec));
            }

            let Some(sample_buf) = self.sample_buf.as_mut() else {
                continue;
            };
            sample_buf.copy_interleaved_ref(decoded);

            let samples = sample_buf.samples().to_vec();
            if self.format.channels == 1 {
                return Ok(Some(Self::mono_to_stereo(samples)));
            }
            return Ok(Some(samples));
        }
    }

    /// Seek to a time position in seconds. Negative positions seek to the start.
    pub fn seek(&mut self, position_secs: f64) -> Result<()> {
        let position_secs = position_secs.max(0.0);
        let time = Time::new(position_secs.trunc() as u64, position_secs.fract());

        self.format_reader
            .seek(
                SeekMode::Accurate,
                SeekTo::Time {
                    time,
                    track_id: Some(self.track_id),
                },
            )
            .map_err(|e| AudioError::PlaybackError(format!("Seek failed: {}", e)))?;

        // Reset decoder after seek
        self.decoder.reset();

        Ok(())
    }

    /// Convert mono samples to stereo by duplicating each sample
    fn mono_to_stereo(mono_samples: Vec<f32>) -> Vec<f32> {
        let mut stereo_samples = Vec::with_capacity(mono_samples.len() * 2);
        for sample in mono_samples {
            stereo_samples.push(sample);
            stereo_samples.push(sample);
        }
        stereo_samples
    }

    fn probe(path: &Path, hint: &Hint) -> Result<ProbeResult> {
        let file = File::open(path)
            .map_err(|e| AudioError::LoadError(format!("Failed to open file: {}", e)))?;
        let media_source_stream = MediaSourceStream::new(Box::new(file), Default::default());

        symphonia::default::get_probe()
            .format(
                hint,
                media_source_stream,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| AudioError::LoadError(format!("Failed to probe media: {}", e)))
    }

    /// Walk every packet once to find the track length when the header lacks it
    fn scan_duration(path: &Path, hint: &Hint, track_id: u32, sample_rate: u32) -> Option<f64> {
        let probe_result = Self::probe(path, hint).ok()?;
        let mut reader = probe_result.format;
        let time_base = reader
            .tracks()
            .iter()
            .find(|track| track.id == track_id)
            .and_then(|track| track.codec_params.time_base);

        let mut end_ts = 0u64;
        while let Ok(packet) = reader.next_packet() {
            if packet.track_id() == track_id {
                end_ts = end_ts.max(packet.ts() + packet.dur());
            }
        }

        let secs = match time_base {
            Some(time_base) => time_to_secs(time_base.calc_time(end_ts)),
            None => end_ts as f64 / sample_rate as f64,
        };
        log::debug!("Scanned duration: {:.3}s", secs);
        Some(secs)
    }

    /// Create a hint from file path
    fn create_hint_from_path(path: &Path) -> Hint {
        let mut hint = Hint::new();
        if let Some(ext_str) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(ext_str);
        }
        hint
    }
}

fn time_to_secs(time: Time) -> f64 {
    time.seconds as f64 + time.frac
}

/// Sample ring buffer between the decoder thread and the output callback
pub struct AudioRingBuffer {
    buffer: Vec<f32>,
    write_pos: usize,
    read_pos: usize,
    size: usize,
}

impl AudioRingBuffer {
    pub fn new(size: usize) -> Self {
        Self {
            buffer: vec![0.0; size],
            write_pos: 0,
            read_pos: 0,
            size,
        }
    }

    pub fn write(&mut self, data: &[f32]) -> usize {
        let to_write = data.len().min(self.available_write());
        if to_write == 0 {
            return 0;
        }

        // Copy in at most two chunks around the wrap point
        let first_chunk = to_write.min(self.size - self.write_pos);
        self.buffer[self.write_pos..self.write_pos + first_chunk]
            .copy_from_slice(&data[..first_chunk]);
        let second_chunk = to_write - first_chunk;
        if second_chunk > 0 {
            self.buffer[..second_chunk].copy_from_slice(&data[first_chunk..to_write]);
        }
        self.write_pos = (self.write_pos + to_write) % self.size;

        to_write
    }

    pub fn read(&mut self, output: &mut [f32]) -> usize {
        let to_read = output.len().min(self.available_read());
        if to_read == 0 {
            return 0;
        }

        let first_chunk = to_read.min(self.size - self.read_pos);
        output[..first_chunk]
            .copy_from_slice(&self.buffer[self.read_pos..self.read_pos + first_chunk]);
        let second_chunk = to_read - first_chunk;
        if second_chunk > 0 {
            output[first_chunk..to_read].copy_from_slice(&self.buffer[..second_chunk]);
        }
        self.read_pos = (self.read_pos + to_read) % self.size;

        to_read
    }

    pub fn available_write(&self) -> usize {
        self.size - self.available_read() - 1
    }

    pub fn available_read(&self) -> usize {
        if self.write_pos >= self.read_pos {
            self.write_pos - self.read_pos
        } else {
            self.size - (self.read_pos - self.write_pos)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.available_read() == 0
    }

    pub fn clear(&mut self) {
        self.write_pos = 0;
        self.read_pos = 0;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    /// Write a 16-bit PCM WAV with `frames` frames of a quiet ramp
    pub(crate) fn write_wav(
        file: &mut impl Write,
        sample_rate: u32,
        channels: u16,
        frames: u32,
    ) -> std::io::Result<()> {
        let block_align = channels as u32 * 2;
        let data_len = frames * block_align;

        file.write_all(b"RIFF")?;
        file.write_all(&(36 + data_len).to_le_bytes())?;
        file.write_all(b"WAVE")?;
        file.write_all(b"fmt ")?;
        file.write_all(&16u32.to_le_bytes())?;
        file.write_all(&1u16.to_le_bytes())?;
        file.write_all(&channels.to_le_bytes())?;
        file.write_all(&sample_rate.to_le_bytes())?;
        file.write_all(&(sample_rate * block_align).to_le_bytes())?;
        file.write_all(&(block_align as u16).to_le_bytes())?;
        file.write_all(&16u16.to_le_bytes())?;
        file.write_all(b"data")?;
        file.write_all(&data_len.to_le_bytes())?;
        for frame in 0..frames {
            let sample = ((frame % 200) as i16 - 100) * 10;
            for _ in 0..channels {
                file.write_all(&sample.to_le_bytes())?;
            }
        }
        file.flush()
    }

    fn wav_file(sample_rate: u32, channels: u16, frames: u32) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        write_wav(&mut file, sample_rate, channels, frames).unwrap();
        file
    }

    #[test]
    fn test_open_reads_exact_duration() {
        let file = wav_file(8000, 1, 12_000);
        let decoder = AudioDecoder::open(file.path()).unwrap();

        assert_eq!(decoder.format.sample_rate, 8000);
        assert_eq!(decoder.format.channels, 1);
        assert_eq!(decoder.format.output_channels, 2);
        assert!((decoder.format.duration_secs - 1.5).abs() < 1e-9);
        assert_eq!(decoder.title(), None);
    }

    #[test]
    fn test_decode_until_end() {
        let file = wav_file(8000, 2, 4000);
        let mut decoder = AudioDecoder::open(file.path()).unwrap();

        let mut total = 0;
        while let Some(samples) = decoder.decode_next().unwrap() {
            total += samples.len();
        }
        assert_eq!(total, 4000 * 2);
        assert!(decoder.decode_next().unwrap().is_none());
    }

    #[test]
    fn test_mono_is_upmixed() {
        let file = wav_file(8000, 1, 1000);
        let mut decoder = AudioDecoder::open(file.path()).unwrap();
        let samples = decoder.decode_next().unwrap().unwrap();
        assert_eq!(samples.len() % 2, 0);
        assert_eq!(samples[0], samples[1]);
    }

    #[test]
    fn test_seek_then_decode() {
        let file = wav_file(8000, 2, 16_000);
        let mut decoder = AudioDecoder::open(file.path()).unwrap();
        decoder.seek(1.0).unwrap();

        let mut remaining = 0;
        while let Some(samples) = decoder.decode_next().unwrap() {
            remaining += samples.len() / 2;
        }
        assert!(remaining < 12_000, "decoded {} frames after seek", remaining);
        assert!(remaining > 0);
    }

    #[test]
    fn test_open_missing_file() {
        let err = AudioDecoder::open(Path::new("/no/such/file.wav")).err().unwrap();
        assert!(matches!(err, AudioError::LoadError(_)));
    }

    #[test]
    fn test_open_non_audio_file() {
        let mut file = tempfile::Builder::new().suffix(".mp3").tempfile().unwrap();
        file.write_all(b"this is not audio at all").unwrap();
        let err = AudioDecoder::open(file.path()).err().unwrap();
        assert!(matches!(err, AudioError::LoadError(_)));
    }

    #[test]
    fn test_ring_buffer_wraps() {
        let mut ring = AudioRingBuffer::new(8);
        assert_eq!(ring.write(&[1.0, 2.0, 3.0, 4.0, 5.0]), 5);

        let mut out = [0.0; 4];
        assert_eq!(ring.read(&mut out), 4);
        assert_eq!(out, [1.0, 2.0, 3.0, 4.0]);

        // Capacity is size - 1
        assert_eq!(ring.write(&[6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0]), 6);
        let mut out = [0.0; 8];
        assert_eq!(ring.read(&mut out), 7);
        assert_eq!(&out[..7], &[5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0]);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_ring_buffer_clear() {
        let mut ring = AudioRingBuffer::new(16);
        ring.write(&[0.5; 10]);
        ring.clear();
        assert!(ring.is_empty());
        assert_eq!(ring.available_write(), 15);
    }
}
