use super::{round_half_up, wrap_index};
use crate::random::RandomSource;

/// Capacity of a lane's pattern storage
pub const MAX_LANE_LENGTH: usize = 32;
/// Number of lanes stepped together by a bank
pub const LANE_COUNT: usize = 4;

const DEFAULT_LENGTH: usize = 16;
const DEFAULT_STEP_COUNT: usize = 4;

/// One Euclidean rhythm track.
/// Distributes `step_count` beats across `length` steps with a fractional
/// accumulator, then gates every hit through a trigger probability.
#[derive(Clone, Debug, PartialEq)]
pub struct EuclideanLane {
    /// Number of steps in the cycle, 1..=32
    length: usize,
    /// Number of active steps, never more than `length`
    step_count: usize,
    /// Rotation applied when reading, kept as given
    shift: usize,
    /// Chance that an active step actually fires
    probability: f32,
    /// Only the first `length` slots are meaningful
    pattern: [bool; MAX_LANE_LENGTH],
    /// Current step position (0-based)
    cursor: usize,
}

impl Default for EuclideanLane {
    fn default() -> Self {
        Self::new(DEFAULT_LENGTH, DEFAULT_STEP_COUNT, 0, 1.0)
    }
}

impl EuclideanLane {
    pub fn new(length: usize, step_count: usize, shift: usize, probability: f32) -> Self {
        let mut lane = Self {
            length: DEFAULT_LENGTH,
            step_count: 0,
            shift: 0,
            probability: 1.0,
            pattern: [false; MAX_LANE_LENGTH],
            cursor: 0,
        };
        lane.configure(length, step_count, shift, probability);
        lane
    }

    /// Replace every parameter and rebuild the pattern from scratch.
    /// The cursor is kept, wrapped into the new length.
    pub fn configure(&mut self, length: usize, step_count: usize, shift: usize, probability: f32) {
        self.length = length.clamp(1, MAX_LANE_LENGTH);
        self.step_count = step_count.min(self.length);
        self.shift = shift;
        self.probability = probability;
        self.cursor = wrap_index(self.cursor, self.length);
        self.rebuild_pattern();
    }

    /// Accumulator placement: mark `round(v)` and add `length / step_count`
    /// until the rounded position leaves the cycle.
    fn rebuild_pattern(&mut self) {
        self.pattern = [false; MAX_LANE_LENGTH];
        if self.step_count == 0 {
            return;
        }

        let length = self.length as i64;
        let delta = self.length as f32 / self.step_count as f32;
        let mut v = 0.0f32;
        let mut position = round_half_up(v);
        while position < length {
            self.pattern[wrap_index(position as usize, MAX_LANE_LENGTH)] = true;
            v += delta;
            position = round_half_up(v);
        }
    }

    /// Advance by one step and return whether it fires.
    /// The cursor moves even when the probability gate suppresses a hit.
    pub fn next<R: RandomSource>(&mut self, rng: &mut R) -> bool {
        let shift = wrap_index(self.shift, self.length);
        let raw = self.pattern[wrap_index(self.cursor + shift, self.length)];
        self.cursor = wrap_index(self.cursor + 1, self.length);

        if self.probability <= 0.0 {
            return false;
        }
        if self.probability >= 1.0 || !raw {
            return raw;
        }
        rng.next_unit() <= self.probability
    }

    /// Draw a fresh 16-step lane: 2..=8 hits, any rotation, 75-100% probability
    pub fn randomize<R: RandomSource>(&mut self, rng: &mut R) {
        let length = DEFAULT_LENGTH;
        let step_count = rng.next_int(2, 8) as usize;
        let shift = rng.next_int(0, length as i32 - 1) as usize;
        let probability = rng.next_float(0.75, 1.0);
        self.configure(length, step_count, shift, probability);
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn shift(&self) -> usize {
        self.shift
    }

    pub fn probability(&self) -> f32 {
        self.probability
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The unrotated pattern, `length` entries
    pub fn pattern(&self) -> &[bool] {
        &self.pattern[..self.length]
    }
}

/// Four lanes stepped in lock-step
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EuclideanBank {
    lanes: [EuclideanLane; LANE_COUNT],
    output: [bool; LANE_COUNT],
}

impl EuclideanBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance every lane in order; results land in `output()` positionally
    pub fn step<R: RandomSource>(&mut self, rng: &mut R) -> [bool; LANE_COUNT] {
        for (value, lane) in self.output.iter_mut().zip(self.lanes.iter_mut()) {
            *value = lane.next(rng);
        }
        self.output
    }

    pub fn reset(&mut self) {
        for lane in self.lanes.iter_mut() {
            lane.reset();
        }
        self.output = [false; LANE_COUNT];
    }

    pub fn randomize<R: RandomSource>(&mut self, rng: &mut R) {
        for lane in self.lanes.iter_mut() {
            lane.randomize(rng);
        }
    }

    pub fn output(&self) -> [bool; LANE_COUNT] {
        self.output
    }

    pub fn lane(&self, index: usize) -> &EuclideanLane {
        &self.lanes[wrap_index(index, LANE_COUNT)]
    }

    pub fn lane_mut(&mut self, index: usize) -> &mut EuclideanLane {
        &mut self.lanes[wrap_index(index, LANE_COUNT)]
    }

    pub fn lanes(&self) -> &[EuclideanLane; LANE_COUNT] {
        &self.lanes
    }
}
