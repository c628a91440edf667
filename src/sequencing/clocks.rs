/// Sub-beats per beat; the clock flips parity on each of them
pub const STEPS_PER_BEAT: f32 = 2.0;

/// Seconds per sub-beat. A zero bpm gives an infinite step that is never reached.
pub fn step_length(bpm: f32) -> f32 {
    (60.0 / bpm) / STEPS_PER_BEAT
}

/// Beat clock driven by control ticks.
///
/// Counts ticks since the last boundary and converts them to seconds at the
/// control rate. When a boundary is crossed, the overshoot is carried into the
/// next tick's elapsed time so boundaries don't accumulate block-size jitter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BeatClock {
    /// Ticks since the last boundary
    tick: u32,
    /// Seconds carried past the last boundary
    tickoff: f32,
    parity: u8,
}

impl BeatClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one control tick. Returns true when a sub-beat boundary was
    /// crossed, in which case the parity has already flipped.
    pub fn advance(&mut self, bpm: f32, control_rate: f32) -> bool {
        let elapsed = self.tickoff + self.tick as f32 / control_rate;
        self.tickoff = 0.0;

        let step = step_length(bpm);
        let crossed = elapsed >= step;
        if crossed {
            self.tickoff = elapsed - step;
            self.tick = 0;
            self.parity = 1 - self.parity;
        }

        self.tick = self.tick.wrapping_add(1);
        crossed
    }

    pub fn parity(&self) -> u8 {
        self.parity
    }

    pub fn tick(&self) -> u32 {
        self.tick
    }

    pub fn carry(&self) -> f32 {
        self.tickoff
    }

    pub fn reset(&mut self) {
        self.tick = 0;
        self.tickoff = 0.0;
        self.parity = 0;
    }
}
