use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::audio::domain::audio_frame::AudioFrame;
use crate::audio::domain::capture_gate::CaptureGate;
use crate::audio::infrastructure::frame_assembler::FrameAssembler;

/// Microphone capture from the default input device.
///
/// The stream is owned by the thread that created it; `start` and `stop`
/// open and close it, which is how capture is toggled.
pub struct CpalAudioSource {
    gate: Arc<Mutex<CaptureGate>>,
    sample_rate: u32,
    frame_len: usize,
    stream: Option<cpal::Stream>,
}

impl CpalAudioSource {
    pub fn new(gate: CaptureGate, sample_rate: u32, frame_len: usize) -> Self {
        Self {
            gate: Arc::new(Mutex::new(gate)),
            sample_rate,
            frame_len,
            stream: None,
        }
    }

    pub fn start(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if self.stream.is_some() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or("No input device available")?;
        log::info!("Using input device: {}", device.name().unwrap_or_default());

        let supported = device.default_input_config()?;
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();
        log::debug!(
            "Input config: {} Hz, {} channel(s), {sample_format:?}",
            config.sample_rate.0,
            config.channels
        );

        let mut assembler = FrameAssembler::new(
            config.sample_rate.0,
            config.channels,
            self.sample_rate,
            self.frame_len,
        )?;
        let gate = Arc::clone(&self.gate);
        let err_fn = |err: cpal::StreamError| log::error!("Audio stream error: {err}");

        let stream = match sample_format {
            cpal::SampleFormat::F32 => device.build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    assembler.push_f32(data, |frame| offer(&gate, frame));
                },
                err_fn,
                None,
            )?,
            cpal::SampleFormat::I16 => device.build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    assembler.push_i16(data, |frame| offer(&gate, frame));
                },
                err_fn,
                None,
            )?,
            other => return Err(format!("Unsupported sample format: {other:?}").into()),
        };

        stream.play()?;
        self.stream = Some(stream);
        log::info!("Audio capture started");
        Ok(())
    }

    pub fn stop(&mut self) {
        if self.stream.take().is_some() {
            log::info!("Audio capture stopped");
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.stream.is_some()
    }

    /// Flips capture on or off and returns the new state.
    pub fn toggle(&mut self) -> Result<bool, Box<dyn std::error::Error>> {
        if self.is_capturing() {
            self.stop();
        } else {
            self.start()?;
        }
        Ok(self.is_capturing())
    }
}

impl Drop for CpalAudioSource {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Realtime context: skip the frame rather than wait for the lock.
fn offer(gate: &Mutex<CaptureGate>, frame: AudioFrame) {
    if let Ok(mut gate) = gate.try_lock() {
        gate.offer(frame);
    }
}
