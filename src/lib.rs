//! Shared loopscribe library exports that keep the pipeline stages aligned.

pub mod audio;
pub mod config;
pub mod pipeline;
pub mod stt;
pub mod telemetry;
pub mod transcript;

pub use audio::{AudioChunk, CaptureError, ChunkSource};
pub use pipeline::Supervisor;
pub use stt::{EngineError, RecognitionEngine, UtteranceDecoder};
pub use transcript::{StoreError, TranscriptStore, UtteranceRecord};
