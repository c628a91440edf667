use crate::audio::{AudioGenerator, TWO_PI};
use once_cell::sync::Lazy;

const SINE_TABLE_SIZE: usize = 4096;

static SINE_TABLE: Lazy<Vec<f32>> = Lazy::new(|| {
    (0..SINE_TABLE_SIZE)
        .map(|i| (i as f32 * TWO_PI / SINE_TABLE_SIZE as f32).sin())
        .collect()
});

/// Table-lookup sine, used as the CV2 LFO at control rate
pub struct SineOscillator {
    /// Normalized position in the cycle, 0.0..1.0
    phase: f32,
    frequency: f32,
    sample_rate: f32,
}

impl SineOscillator {
    pub fn new(frequency: f32, sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            frequency,
            sample_rate,
        }
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

impl AudioGenerator for SineOscillator {
    fn next_sample(&mut self) -> f32 {
        let table_index = (self.phase * SINE_TABLE_SIZE as f32) as usize % SINE_TABLE_SIZE;
        self.phase = (self.phase + self.frequency / self.sample_rate).fract();
        SINE_TABLE[table_index]
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }
}

/// White noise in -1.0..1.0 with its own seeded generator, so audio-rate draws
/// never disturb the sequencer's random stream
#[derive(Clone, Debug)]
pub struct NoiseGenerator {
    rng: fastrand::Rng,
}

impl NoiseGenerator {
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl Default for NoiseGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioGenerator for NoiseGenerator {
    fn next_sample(&mut self) -> f32 {
        self.rng.f32() * 2.0 - 1.0
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {
        // NoiseGenerator doesn't depend on sample rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_quarter_period() {
        // 1 Hz at 4 samples per second lands exactly on the table quadrants
        let mut osc = SineOscillator::new(1.0, 4.0);
        let samples: Vec<f32> = (0..5).map(|_| osc.next_sample()).collect();
        assert!(samples[0].abs() < 1e-6);
        assert!((samples[1] - 1.0).abs() < 1e-6);
        assert!(samples[2].abs() < 1e-3);
        assert!((samples[3] + 1.0).abs() < 1e-6);
        assert!(samples[4].abs() < 1e-6);
    }

    #[test]
    fn test_sine_stays_bounded() {
        let mut osc = SineOscillator::new(0.2, 1000.0);
        for _ in 0..10_000 {
            let sample = osc.next_sample();
            assert!((-1.0..=1.0).contains(&sample));
        }
    }

    #[test]
    fn test_noise_range_and_determinism() {
        let mut a = NoiseGenerator::with_seed(3);
        let mut b = NoiseGenerator::with_seed(3);
        let mut sum = 0.0;
        for _ in 0..10_000 {
            let sample = a.next_sample();
            assert!(sample >= -1.0 && sample < 1.0, "noise sample {} out of range", sample);
            assert_eq!(sample.to_bits(), b.next_sample().to_bits());
            sum += sample;
        }
        let mean = sum / 10_000.0;
        assert!(mean.abs() < 0.05, "noise should be roughly centred, mean {}", mean);
    }
}
