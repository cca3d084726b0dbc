//! cpal-backed loopback capture of the system default output device.
//!
//! WASAPI exposes loopback as an input stream opened on an output device.
//! Hosts that instead surface loopback as a monitor source (PulseAudio,
//! PipeWire) get it through the default input device. Either way the stream
//! runs at the device's reported default rate; no resampling happens here.

use super::{chunk_frames, AudioChunk, CaptureError, ChunkSource};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, StreamConfig};
use crossbeam_channel::{Receiver, Sender};
use tracing::{info, warn};

/// Live capture stream plus the frame ring it fills.
///
/// The cpal callback pushes mono frames into an unbounded channel; holding
/// the ring on the callback side keeps the audio thread free of blocking
/// work while `next_chunk` assembles fixed-duration chunks at its own pace.
pub struct LoopbackSource {
    _stream: cpal::Stream,
    frames: Receiver<f32>,
    sample_rate: u32,
    samples_per_chunk: usize,
}

impl LoopbackSource {
    /// Opens the default output device in loopback mode, falling back to the
    /// default input device on hosts without direct loopback support.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::DeviceUnavailable`] when no device can be
    /// opened or its stream cannot be built.
    pub fn open(chunk_secs: f32) -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .filter(|device| device.default_input_config().is_ok())
            .or_else(|| host.default_input_device())
            .ok_or_else(|| {
                CaptureError::DeviceUnavailable("no loopback-capable device found".into())
            })?;
        let name = device.name().unwrap_or_else(|_| "<unknown>".into());

        let supported = device
            .default_input_config()
            .map_err(|err| CaptureError::DeviceUnavailable(err.to_string()))?;
        let sample_rate = supported.sample_rate().0;
        let channels = usize::from(supported.channels());
        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();

        let (tx, frames) = crossbeam_channel::unbounded();
        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, channels, tx),
            SampleFormat::I16 => build_stream::<i16>(&device, &config, channels, tx),
            SampleFormat::U16 => build_stream::<u16>(&device, &config, channels, tx),
            other => {
                return Err(CaptureError::DeviceUnavailable(format!(
                    "unsupported sample format {other:?}"
                )))
            }
        }?;
        stream
            .play()
            .map_err(|err| CaptureError::DeviceUnavailable(err.to_string()))?;

        info!(device = %name, sample_rate, channels, "loopback capture started");
        Ok(Self {
            _stream: stream,
            frames,
            sample_rate,
            samples_per_chunk: chunk_frames(sample_rate, chunk_secs),
        })
    }
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    channels: usize,
    tx: Sender<f32>,
) -> Result<cpal::Stream, CaptureError>
where
    T: cpal::Sample + cpal::SizedSample + Send + 'static,
    f32: cpal::FromSample<T>,
{
    let channels = channels.max(1);
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                // Mono selection: first interleaved channel only.
                for frame in data.chunks(channels) {
                    if let Some(&sample) = frame.first() {
                        let sample: f32 = cpal::Sample::from_sample(sample);
                        let _ = tx.send(sample);
                    }
                }
            },
            |err| warn!(%err, "loopback stream error"),
            None,
        )
        .map_err(|err| CaptureError::DeviceUnavailable(err.to_string()))
}

impl ChunkSource for LoopbackSource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn next_chunk(&mut self) -> Result<AudioChunk, CaptureError> {
        let mut samples = Vec::with_capacity(self.samples_per_chunk);
        while samples.len() < self.samples_per_chunk {
            match self.frames.recv() {
                Ok(sample) => samples.push(sample),
                Err(_) => {
                    return Err(CaptureError::DeviceUnavailable(
                        "loopback stream closed".into(),
                    ))
                }
            }
        }
        Ok(AudioChunk::new(samples, self.sample_rate))
    }
}
