//! Streaming speech recognition adapter.
//!
//! The external recognizer is consumed through a narrow seam: feed bytes,
//! learn whether an utterance boundary was reached, pull the finalized text.
//! This module owns the sample normalization in front of that seam and the
//! Vosk-backed decoder behind it (feature `vosk`).

use crate::audio::AudioChunk;
use half::f16;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The model directory is absent or incompatible. Startup-fatal.
    #[error("failed to load recognition model: {0}")]
    ModelLoad(String),
    #[error("recognizer rejected waveform: {0}")]
    Decode(String),
}

/// Narrow seam over the external streaming recognizer.
///
/// The decoder is a stateful stream: bytes must arrive in capture order, and
/// `finalized_text` is only meaningful right after `accept` reported a
/// boundary. Empty text is how the decoder signals a silent span; it is not
/// an error.
pub trait UtteranceDecoder {
    /// Feeds normalized waveform bytes; returns true when the decoder has
    /// reached an utterance boundary.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Decode`] when the recognizer rejects the
    /// waveform outright.
    fn accept(&mut self, bytes: &[u8]) -> Result<bool, EngineError>;

    /// Pulls the text finalized at the last boundary.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Decode`] when the result cannot be read back.
    fn finalized_text(&mut self) -> Result<String, EngineError>;
}

/// Remaps one sample from [-1, 1] into [0, 1] at half precision.
///
/// Samples are shifted into [0, 2], halved, and encoded as little-endian
/// IEEE f16. The transform is a fixed, stateless, per-sample affine map;
/// it must not change, because the acoustic model was tuned against this
/// exact input distribution.
#[inline]
pub fn remap_sample(sample: f32) -> f16 {
    f16::from_f32((sample + 1.0) / 2.0)
}

/// Serializes a chunk into the byte stream the recognizer consumes. No
/// cross-chunk state: the same chunk always yields the same bytes.
pub fn normalize_chunk(chunk: &AudioChunk) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(chunk.len() * 2);
    for &sample in chunk.samples() {
        bytes.extend_from_slice(&remap_sample(sample).to_le_bytes());
    }
    bytes
}

/// Drives an [`UtteranceDecoder`] one chunk at a time.
pub struct RecognitionEngine<D> {
    decoder: D,
}

impl<D: UtteranceDecoder> RecognitionEngine<D> {
    pub fn new(decoder: D) -> Self {
        Self { decoder }
    }

    /// Feeds one chunk and returns finalized text when the decoder reports an
    /// utterance boundary. A boundary with empty or whitespace-only text is a
    /// silent span and yields `None`.
    ///
    /// # Errors
    ///
    /// Propagates decoder failures; the caller decides whether to keep going.
    pub fn accept_chunk(&mut self, chunk: &AudioChunk) -> Result<Option<String>, EngineError> {
        let bytes = normalize_chunk(chunk);
        if !self.decoder.accept(&bytes)? {
            return Ok(None);
        }
        let text = self.decoder.finalized_text()?;
        let text = text.trim();
        if text.is_empty() {
            Ok(None)
        } else {
            Ok(Some(text.to_owned()))
        }
    }
}

#[cfg(feature = "vosk")]
mod vosk_backend {
    use super::{EngineError, UtteranceDecoder};
    use std::path::Path;
    use std::sync::Once;
    use vosk::{DecodingState, Model, Recognizer};

    /// Vosk-backed streaming decoder.
    ///
    /// The model directory is loaded once at startup and owned here; there
    /// are no process-wide singletons. A missing or incompatible model is
    /// startup-fatal.
    pub struct VoskDecoder {
        recognizer: Recognizer,
    }

    impl VoskDecoder {
        /// Loads the model directory and creates a recognizer at the capture
        /// sample rate.
        ///
        /// # Errors
        ///
        /// Returns [`EngineError::ModelLoad`] when the directory is missing
        /// or the model cannot be instantiated.
        pub fn open(model_dir: &Path, sample_rate: u32) -> Result<Self, EngineError> {
            silence_vosk_logs();
            let model_dir = model_dir
                .to_str()
                .ok_or_else(|| EngineError::ModelLoad("model path is not valid UTF-8".into()))?;
            let model = Model::new(model_dir).ok_or_else(|| {
                EngineError::ModelLoad(format!("could not load model at {model_dir}"))
            })?;
            let recognizer = Recognizer::new(&model, sample_rate as f32)
                .ok_or_else(|| EngineError::ModelLoad("could not create recognizer".into()))?;
            Ok(Self { recognizer })
        }
    }

    impl UtteranceDecoder for VoskDecoder {
        fn accept(&mut self, bytes: &[u8]) -> Result<bool, EngineError> {
            // The engine consumes the normalized stream as 16-bit frames.
            let frames: Vec<i16> = bytes
                .chunks_exact(2)
                .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            match self.recognizer.accept_waveform(&frames) {
                Ok(DecodingState::Finalized) => Ok(true),
                Ok(_) => Ok(false),
                Err(err) => Err(EngineError::Decode(err.to_string())),
            }
        }

        fn finalized_text(&mut self) -> Result<String, EngineError> {
            Ok(self
                .recognizer
                .result()
                .single()
                .map(|alternative| alternative.text.to_owned())
                .unwrap_or_default())
        }
    }

    fn silence_vosk_logs() {
        static SILENCE: Once = Once::new();
        // Vosk prints decoder diagnostics to stderr by default; quiet it
        // before loading the model.
        SILENCE.call_once(|| vosk::set_log_level(vosk::LogLevel::Error));
    }
}

#[cfg(feature = "vosk")]
pub use vosk_backend::VoskDecoder;
