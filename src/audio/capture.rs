//! Capture pump: drives a chunk source and feeds the recognition queue.
//!
//! The pump never interprets audio beyond moving it, and it never drops a
//! chunk: a full queue blocks the capture side, which is the only
//! backpressure point in the pipeline.

use super::{AudioChunk, ChunkSource};
use crossbeam_channel::{SendTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// Pause between retries after a capture failure. The source itself does not
/// retry, so a flapping device surfaces here as warn-and-wait.
const DEVICE_RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// How often a blocked enqueue re-checks the shutdown flag.
const SEND_POLL: Duration = Duration::from_millis(100);

/// Runs the capture loop until the shutdown flag is set or the consumer is
/// gone. Chunks are delivered in production order; the channel is the only
/// structure shared with the recognition side.
pub fn run_capture<S: ChunkSource>(
    mut source: S,
    tx: Sender<AudioChunk>,
    shutdown: &AtomicBool,
) {
    while !shutdown.load(Ordering::SeqCst) {
        let chunk = match source.next_chunk() {
            Ok(chunk) => chunk,
            Err(err) => {
                warn!(%err, "audio capture failed; retrying");
                std::thread::sleep(DEVICE_RETRY_BACKOFF);
                continue;
            }
        };
        let mut pending = chunk;
        loop {
            // Blocking send, sliced so an operator interrupt is still
            // observed while the consumer stalls.
            match tx.send_timeout(pending, SEND_POLL) {
                Ok(()) => break,
                Err(SendTimeoutError::Timeout(chunk)) => {
                    if shutdown.load(Ordering::SeqCst) {
                        return;
                    }
                    pending = chunk;
                }
                Err(SendTimeoutError::Disconnected(_)) => {
                    debug!("chunk queue closed; capture pump exiting");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::CaptureError;
    use crossbeam_channel::bounded;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use std::thread;

    /// Yields a fixed list of chunks, then reports the device as gone so the
    /// pump idles in its retry loop until shut down.
    struct ScriptedSource {
        chunks: VecDeque<AudioChunk>,
    }

    impl ScriptedSource {
        fn new(count: usize) -> Self {
            let chunks = (0..count)
                .map(|i| AudioChunk::new(vec![i as f32; 4], 16_000))
                .collect();
            Self { chunks }
        }
    }

    impl ChunkSource for ScriptedSource {
        fn sample_rate(&self) -> u32 {
            16_000
        }

        fn next_chunk(&mut self) -> Result<AudioChunk, CaptureError> {
            self.chunks
                .pop_front()
                .ok_or_else(|| CaptureError::DeviceUnavailable("script exhausted".into()))
        }
    }

    #[test]
    fn pump_forwards_chunks_in_production_order() {
        let (tx, rx) = bounded(8);
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = shutdown.clone();
        let handle = thread::spawn(move || run_capture(ScriptedSource::new(3), tx, &flag));

        for expected in 0..3 {
            let chunk = rx
                .recv_timeout(Duration::from_secs(2))
                .expect("chunk should arrive");
            assert_eq!(chunk.samples()[0], expected as f32);
        }

        shutdown.store(true, Ordering::SeqCst);
        handle.join().expect("capture thread should exit cleanly");
    }

    #[test]
    fn full_queue_blocks_third_enqueue_until_consumer_drains() {
        let (tx, rx) = bounded(2);
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = shutdown.clone();
        let handle = thread::spawn(move || run_capture(ScriptedSource::new(3), tx, &flag));

        // Give the pump time to fill both slots and start blocking on the
        // third send.
        thread::sleep(Duration::from_millis(300));
        assert_eq!(rx.len(), 2, "bounded queue should hold exactly two chunks");

        let first = rx.recv().expect("first chunk");
        assert_eq!(first.samples()[0], 0.0);

        // Draining one slot unblocks the pending send.
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while rx.len() < 2 {
            assert!(
                std::time::Instant::now() < deadline,
                "third chunk never arrived after drain"
            );
            thread::sleep(Duration::from_millis(10));
        }

        shutdown.store(true, Ordering::SeqCst);
        handle.join().expect("capture thread should exit cleanly");
    }

    #[test]
    fn pump_exits_when_consumer_disconnects() {
        let (tx, rx) = bounded(1);
        drop(rx);
        let shutdown = AtomicBool::new(false);
        run_capture(ScriptedSource::new(1), tx, &shutdown);
    }
}
