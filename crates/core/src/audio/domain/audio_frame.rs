/// A fixed-duration block of mono 16-bit PCM.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioFrame {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl AudioFrame {
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn duration_ms(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 * 1000.0 / self.sample_rate as f64
    }

    /// Consecutive `len`-sample slices; a trailing partial slice is skipped.
    pub fn sub_frames(&self, len: usize) -> impl Iterator<Item = &[i16]> {
        self.samples.chunks_exact(len.max(1))
    }
}

/// Number of samples covering `duration_ms` at `sample_rate`.
pub fn samples_for(duration_ms: u32, sample_rate: u32) -> usize {
    (sample_rate as u64 * duration_ms as u64 / 1000) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_for() {
        assert_eq!(samples_for(200, 16_000), 3200);
        assert_eq!(samples_for(20, 16_000), 320);
        assert_eq!(samples_for(30, 8_000), 240);
    }

    #[test]
    fn test_duration_ms() {
        let frame = AudioFrame::new(vec![0; 3200], 16_000);
        assert!((frame.duration_ms() - 200.0).abs() < 1e-9);
        assert_eq!(AudioFrame::new(vec![0; 10], 0).duration_ms(), 0.0);
    }

    #[test]
    fn test_sub_frames_skip_trailing_partial() {
        let frame = AudioFrame::new((0..10).collect(), 16_000);
        let subs: Vec<&[i16]> = frame.sub_frames(4).collect();
        assert_eq!(subs, vec![&[0, 1, 2, 3][..], &[4, 5, 6, 7][..]]);
    }
}
