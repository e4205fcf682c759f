//! In-memory mono audio.

/// Mono samples at a fixed sample rate.
///
/// Samples are nominally in `[-1.0, 1.0]` (0 dBFS = 1.0). Transforms never
/// mutate a waveform; they return a new one carrying the same sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// An empty waveform at `sample_rate`.
    pub fn empty(sample_rate: u32) -> Self {
        Self::new(Vec::new(), sample_rate)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Copies `range` into a new waveform with the same sample rate.
    pub(crate) fn slice(&self, range: std::ops::Range<usize>) -> Self {
        Self::new(self.samples[range].to_vec(), self.sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration() {
        let wave = Waveform::new(vec![0.0; 8000], 16_000);
        assert!((wave.duration_secs() - 0.5).abs() < 1e-12);
        assert_eq!(Waveform::empty(16_000).duration_secs(), 0.0);
    }

    #[test]
    fn test_slice_keeps_rate() {
        let wave = Waveform::new(vec![0.1, 0.2, 0.3, 0.4], 22_050);
        let part = wave.slice(1..3);
        assert_eq!(part.samples(), &[0.2, 0.3]);
        assert_eq!(part.sample_rate(), 22_050);
    }
}
