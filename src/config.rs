//! Fixed pipeline parameters.
//!
//! The tool deliberately exposes no runtime flags; capture duration, model
//! location, and transcript location are compile-time constants collected in
//! [`PipelineConfig`] so the supervisor and tests share one source of truth.

use std::path::PathBuf;

/// Duration of one capture chunk in seconds.
pub const CHUNK_SECS: f32 = 0.4;

/// Directory holding the pre-trained acoustic/language model.
pub const MODEL_DIR: &str = "model-en-md";

/// Transcript document appended to on every finalized utterance.
pub const TRANSCRIPT_FILE: &str = "speech.json";

/// Bound on queued-but-undecoded chunks. Audio hardware paces production at
/// real time, so this only matters when the decoder falls behind; a full
/// queue blocks the capture side rather than dropping chunks.
pub const QUEUE_CAPACITY: usize = 64;

/// Everything the supervisor needs to wire the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub chunk_secs: f32,
    pub model_dir: PathBuf,
    pub transcript_file: PathBuf,
    pub queue_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_secs: CHUNK_SECS,
            model_dir: PathBuf::from(MODEL_DIR),
            transcript_file: PathBuf::from(TRANSCRIPT_FILE),
            queue_capacity: QUEUE_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_pipeline_parameter() {
        let config = PipelineConfig::default();
        assert!((config.chunk_secs - 0.4).abs() < f32::EPSILON);
        assert_eq!(config.model_dir, PathBuf::from("model-en-md"));
        assert_eq!(config.transcript_file, PathBuf::from("speech.json"));
        assert!(config.queue_capacity > 0);
    }
}
