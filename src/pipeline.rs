//! Pipeline wiring: the recognition pump and the supervisor that owns both
//! threads, the chunk queue, and interrupt handling.
//!
//! Exactly two units of execution run here, a capture thread and a
//! recognition thread, joined by one bounded FIFO channel. Ordering through
//! the channel is load-bearing: the decoder is a stateful stream and
//! reordered chunks would corrupt it.

use crate::audio::capture::run_capture;
use crate::audio::{AudioChunk, ChunkSource};
use crate::config::PipelineConfig;
use crate::stt::{RecognitionEngine, UtteranceDecoder};
use crate::transcript::{StoreError, TranscriptStore, UtteranceRecord};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// How often a blocked dequeue re-checks the shutdown flag.
const RECV_POLL: Duration = Duration::from_millis(100);

/// Drains the chunk queue into the recognition engine and persists finalized
/// utterances. Returns when the shutdown flag is set or the producer is gone.
///
/// Shutdown is abrupt on purpose: queued chunks and any partially decoded
/// utterance are discarded rather than flushed.
pub fn run_recognition<D: UtteranceDecoder>(
    rx: Receiver<AudioChunk>,
    mut engine: RecognitionEngine<D>,
    store: &TranscriptStore,
    shutdown: &AtomicBool,
) {
    while !shutdown.load(Ordering::SeqCst) {
        let chunk = match rx.recv_timeout(RECV_POLL) {
            Ok(chunk) => chunk,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };
        let text = match engine.accept_chunk(&chunk) {
            Ok(Some(text)) => text,
            Ok(None) => continue,
            Err(err) => {
                warn!(%err, "recognition failed for chunk");
                continue;
            }
        };
        let record = UtteranceRecord::now(text);
        match store.append(&record) {
            Ok(()) => info!(text = %record.text, "utterance persisted"),
            Err(StoreError::Missing(path)) => {
                // Non-fatal by design: log, drop this utterance, keep going.
                warn!(
                    path = %path.display(),
                    "transcript file not found; utterance dropped"
                );
            }
            Err(err) => warn!(%err, "failed to persist utterance"),
        }
    }
}

/// Owns the shutdown flag and both pipeline threads.
pub struct Supervisor {
    shutdown: Arc<AtomicBool>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self {
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared flag the pumps poll; setting it requests shutdown.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Maps SIGINT onto the shutdown flag. The interrupt is the only
    /// designed shutdown path.
    ///
    /// # Errors
    ///
    /// Returns the underlying error when the handler cannot be registered.
    #[cfg(unix)]
    pub fn install_interrupt_handler(&self) -> io::Result<()> {
        signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&self.shutdown))
            .map(|_| ())
    }

    #[cfg(not(unix))]
    pub fn install_interrupt_handler(&self) -> io::Result<()> {
        Ok(())
    }

    /// Runs capture and recognition until interrupt or source exhaustion.
    ///
    /// The capture thread owns the source and the sending half of the queue;
    /// the recognition thread owns the engine and is the sole writer of the
    /// transcript store.
    pub fn run<S, D>(
        &self,
        source: S,
        decoder: D,
        store: &TranscriptStore,
        config: &PipelineConfig,
    ) where
        S: ChunkSource + Send,
        D: UtteranceDecoder + Send,
    {
        let (tx, rx) = bounded(config.queue_capacity);
        let engine = RecognitionEngine::new(decoder);
        let shutdown: &AtomicBool = &self.shutdown;
        std::thread::scope(|scope| {
            scope.spawn(move || run_capture(source, tx, shutdown));
            scope.spawn(move || run_recognition(rx, engine, store, shutdown));
        });
        info!("pipeline stopped");
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}
