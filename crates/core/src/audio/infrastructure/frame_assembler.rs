use rubato::{FftFixedIn, Resampler};

use crate::audio::domain::audio_frame::AudioFrame;

const RESAMPLER_CHUNK_SIZE: usize = 1024;

/// Turns device callback buffers into fixed-size mono frames.
///
/// Interleaved input is averaged down to mono, band-limited and resampled
/// to the target rate with an FFT resampler, and converted to 16-bit PCM.
/// When the device already runs at the target rate no resampler is built.
pub struct FrameAssembler {
    channels: usize,
    resampler: Option<FftFixedIn<f32>>,
    chunk_in: usize,
    in_buf: Vec<f32>,
    frame: Vec<i16>,
    frame_len: usize,
    target_rate: u32,
}

impl FrameAssembler {
    pub fn new(
        device_rate: u32,
        channels: u16,
        target_rate: u32,
        frame_len: usize,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let resampler = if device_rate == target_rate {
            None
        } else {
            Some(FftFixedIn::<f32>::new(
                device_rate as usize,
                target_rate as usize,
                RESAMPLER_CHUNK_SIZE,
                1,
                1,
            )?)
        };
        let chunk_in = resampler
            .as_ref()
            .map_or(RESAMPLER_CHUNK_SIZE, |r| r.input_frames_next());
        let frame_len = frame_len.max(1);

        Ok(Self {
            channels: channels.max(1) as usize,
            resampler,
            chunk_in,
            in_buf: Vec::with_capacity(chunk_in),
            frame: Vec::with_capacity(frame_len),
            frame_len,
            target_rate,
        })
    }

    /// Feeds interleaved samples in `[-1, 1]`; `emit` receives each full frame.
    pub fn push_f32(&mut self, interleaved: &[f32], mut emit: impl FnMut(AudioFrame)) {
        let mono: Vec<f32> = interleaved
            .chunks(self.channels)
            .map(|ch| ch.iter().sum::<f32>() / ch.len() as f32)
            .collect();

        if self.resampler.is_none() {
            self.emit_frames(&mono, &mut emit);
            return;
        }

        let mut src = mono.as_slice();
        while !src.is_empty() {
            let take = (self.chunk_in - self.in_buf.len()).min(src.len());
            self.in_buf.extend_from_slice(&src[..take]);
            src = &src[take..];

            if self.in_buf.len() == self.chunk_in {
                let out = match self.resampler.as_mut() {
                    Some(resampler) => resampler.process(&[&self.in_buf[..]], None),
                    None => return,
                };
                self.in_buf.clear();
                match out {
                    Ok(out) => self.emit_frames(&out[0], &mut emit),
                    Err(e) => log::warn!("Resampling failed: {e}"),
                }
            }
        }
    }

    pub fn push_i16(&mut self, interleaved: &[i16], emit: impl FnMut(AudioFrame)) {
        let converted: Vec<f32> = interleaved
            .iter()
            .map(|&s| s as f32 / i16::MAX as f32)
            .collect();
        self.push_f32(&converted, emit);
    }

    fn emit_frames(&mut self, data: &[f32], emit: &mut impl FnMut(AudioFrame)) {
        for &value in data {
            self.frame.push(to_i16(value));
            if self.frame.len() == self.frame_len {
                let samples =
                    std::mem::replace(&mut self.frame, Vec::with_capacity(self.frame_len));
                emit(AudioFrame::new(samples, self.target_rate));
            }
        }
    }
}

fn to_i16(value: f32) -> i16 {
    (value.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}
