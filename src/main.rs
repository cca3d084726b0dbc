//! loopscribe binary: capture what the machine is playing, recognize it, and
//! append finalized utterances to the JSON transcript.
//!
//! There are no flags; every parameter is a compile-time constant in
//! `config`. The only designed exit path is the operator interrupt.

use anyhow::Result;
use loopscribe::config::PipelineConfig;
use loopscribe::telemetry;

fn main() -> Result<()> {
    telemetry::init_tracing();
    let config = PipelineConfig::default();
    println!("Type Ctrl+C to stop");
    run(&config)?;
    println!("\nDone");
    Ok(())
}

#[cfg(all(feature = "cpal-loopback", feature = "vosk"))]
fn run(config: &PipelineConfig) -> Result<()> {
    use anyhow::Context;
    use loopscribe::audio::loopback::LoopbackSource;
    use loopscribe::audio::ChunkSource;
    use loopscribe::pipeline::Supervisor;
    use loopscribe::stt::VoskDecoder;
    use loopscribe::transcript::TranscriptStore;

    let source = LoopbackSource::open(config.chunk_secs)
        .context("failed to open loopback capture on the default output device")?;
    let decoder = VoskDecoder::open(&config.model_dir, source.sample_rate())
        .context("failed to load the recognition model")?;
    let store = TranscriptStore::new(&config.transcript_file);
    if !config.transcript_file.exists() {
        tracing::warn!(
            path = %config.transcript_file.display(),
            "transcript file missing; utterances will be dropped until it exists"
        );
    }

    let supervisor = Supervisor::new();
    supervisor
        .install_interrupt_handler()
        .context("failed to install interrupt handler")?;

    println!("Recognizer is ready");
    println!("Output sound from a speaker or a headphone");
    println!("{}", "#".repeat(40));

    supervisor.run(source, decoder, &store, config);
    Ok(())
}

#[cfg(not(all(feature = "cpal-loopback", feature = "vosk")))]
fn run(_config: &PipelineConfig) -> Result<()> {
    // Mirror of the backend-less build: the pipeline logic is all testable,
    // but there is nothing to capture with or decode against.
    anyhow::bail!(
        "this build has no capture or recognition backend; rebuild with `--features full`"
    )
}
