//! Audio chunk types and the seam between device capture and recognition.

pub mod capture;
#[cfg(feature = "cpal-loopback")]
pub mod loopback;

use thiserror::Error;

/// One fixed-duration slice of mono samples moved between pipeline stages.
///
/// Chunks are immutable once produced; ownership transfers through the queue
/// from the capture side to the recognition side, so there is no shared
/// mutation anywhere in the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioChunk {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioChunk {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Capture-side failures. The source performs no retries of its own; the
/// capture pump owns the retry policy.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),
}

/// Blocking producer of fixed-duration chunks from one logical input device.
///
/// `next_chunk` blocks until `sample_rate * chunk_secs` mono samples have
/// been captured and buffers nothing beyond the chunk being assembled. No
/// resampling happens here; the rate is whatever the device reports.
pub trait ChunkSource {
    fn sample_rate(&self) -> u32;

    /// Blocks until one full chunk is available.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::DeviceUnavailable`] when the device or its
    /// stream has gone away.
    fn next_chunk(&mut self) -> Result<AudioChunk, CaptureError>;
}

/// Number of frames in one chunk at the given rate. Truncates toward zero.
pub fn chunk_frames(sample_rate: u32, chunk_secs: f32) -> usize {
    ((f64::from(sample_rate) * f64::from(chunk_secs)) as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_frames_truncates_toward_zero() {
        assert_eq!(chunk_frames(16_000, 0.4), 6_400);
        assert_eq!(chunk_frames(44_100, 0.4), 17_640);
        assert_eq!(chunk_frames(48_000, 0.4), 19_200);
    }

    #[test]
    fn chunk_frames_never_returns_zero() {
        assert_eq!(chunk_frames(1, 0.0001), 1);
    }

    #[test]
    fn chunk_accessors_expose_samples_and_rate() {
        let chunk = AudioChunk::new(vec![0.0, 0.5, -0.5], 16_000);
        assert_eq!(chunk.samples(), &[0.0, 0.5, -0.5]);
        assert_eq!(chunk.sample_rate(), 16_000);
        assert_eq!(chunk.len(), 3);
        assert!(!chunk.is_empty());
    }
}
