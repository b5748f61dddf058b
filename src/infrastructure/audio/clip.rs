use std::time::Duration;

/// Decoded PCM audio, interleaved `f32` samples in `[-1, 1]`
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<f32>,
}

impl AudioClip {
    pub fn new(sample_rate: u32, channels: u16, samples: Vec<f32>) -> Self {
        Self {
            sample_rate,
            channels,
            samples,
        }
    }

    /// Samples per channel
    pub fn frames(&self) -> u64 {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() as u64 / self.channels as u64
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    /// Clips can be concatenated only with the same rate and channel count
    pub fn same_layout(&self, other: &AudioClip) -> bool {
        self.sample_rate == other.sample_rate && self.channels == other.channels
    }

    pub fn append_silence(&mut self, length: Duration) {
        let frames = (self.sample_rate as u128 * length.as_millis() / 1000) as usize;
        let new_len = self.samples.len() + frames * self.channels as usize;
        self.samples.resize(new_len, 0.0);
    }

    pub fn append(&mut self, other: &AudioClip) {
        self.samples.extend_from_slice(&other.samples);
    }
}
