use fastrand::Rng;

/// Uniform random draws used by every generator's randomize path and by the
/// probability gates of the rhythm lanes.
pub trait RandomSource {
    /// Uniform integer in `min..=max`.
    fn next_int(&mut self, min: i32, max: i32) -> i32;

    /// Uniform float between `min` and `max`.
    fn next_float(&mut self, min: f32, max: f32) -> f32;

    /// Uniform float in `0.0..1.0`
    fn next_unit(&mut self) -> f32 {
        self.next_float(0.0, 1.0)
    }

    /// Magnitude drawn between `min` and `max`, sign chosen by a fair coin
    fn next_signed(&mut self, min: f32, max: f32) -> f32 {
        let magnitude = self.next_float(min, max);
        if self.next_int(0, 1) == 0 {
            magnitude
        } else {
            -magnitude
        }
    }
}

/// Seedable source backed by `fastrand`
#[derive(Clone, Debug)]
pub struct FastRandSource {
    rng: Rng,
}

impl FastRandSource {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Rng::with_seed(seed),
        }
    }

    /// Entropy-seeded source for hosts that don't need reproducible runs
    pub fn from_entropy() -> Self {
        Self { rng: Rng::new() }
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng.seed(seed);
    }
}

impl RandomSource for FastRandSource {
    fn next_int(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.rng.i32(min..=max)
    }

    fn next_float(&mut self, min: f32, max: f32) -> f32 {
        min + self.rng.f32() * (max - min)
    }
}

/// Replays fixed draw sequences, cycling when exhausted. Used to pin down the
/// exact branch and gate decisions in tests.
#[cfg(test)]
pub(crate) struct ScriptedSource {
    ints: Vec<i32>,
    floats: Vec<f32>,
    int_cursor: usize,
    float_cursor: usize,
}

#[cfg(test)]
impl ScriptedSource {
    pub(crate) fn new(ints: &[i32], floats: &[f32]) -> Self {
        Self {
            ints: ints.to_vec(),
            floats: floats.to_vec(),
            int_cursor: 0,
            float_cursor: 0,
        }
    }

    pub(crate) fn int_draws(&self) -> usize {
        self.int_cursor
    }

    pub(crate) fn float_draws(&self) -> usize {
        self.float_cursor
    }
}

#[cfg(test)]
impl RandomSource for ScriptedSource {
    fn next_int(&mut self, min: i32, max: i32) -> i32 {
        let value = self.ints[self.int_cursor % self.ints.len()];
        self.int_cursor += 1;
        value.clamp(min, max)
    }

    fn next_float(&mut self, min: f32, max: f32) -> f32 {
        let unit = self.floats[self.float_cursor % self.floats.len()];
        self.float_cursor += 1;
        min + unit * (max - min)
    }
}
