use super::{round_half_up, Channel, NoteSource, Scale, SCALE_LENGTH};
use crate::random::RandomSource;

pub const COEFFICIENT_COUNT: usize = 8;

/// Offset of the second coefficient group
const ALTERNATE_GROUP: usize = 4;
/// The branch draw is uniform over 0..=2; only this value picks the second group
const ALTERNATE_BRANCH_DRAW: i32 = 0;

/// Two-dimensional coupled sine/cosine map quantized to a scale.
///
/// Each call iterates
/// ```text
/// x' = sin(a·y) + c·cos(a·x)
/// y' = sin(b·x) + d·cos(b·y)
/// ```
/// with `(a, b, c, d)` taken from one of two coefficient groups, chosen per call
/// with probability 2/3 for the first group and 1/3 for the second. The lead
/// channel reads `x`, the bass channel reads `y` and sits an octave up.
#[derive(Clone, Debug, PartialEq)]
pub struct ChaosMelody {
    x: f32,
    y: f32,
    coefficients: [f32; COEFFICIENT_COUNT],
    scale: Scale,
    /// Scales |state| before rounding to a scale index
    zoom: f32,
    /// Scale-index offset added before wrapping
    base: i32,
}

impl Default for ChaosMelody {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            coefficients: [0.0; COEFFICIENT_COUNT],
            scale: Scale::Major,
            zoom: 2.0,
            base: 0,
        }
    }
}

impl ChaosMelody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Redraw every coefficient and the starting point.
    /// Scale, zoom and base are configuration and stay as they are.
    pub fn randomize<R: RandomSource>(&mut self, rng: &mut R) {
        let mut coefficients = [0.0; COEFFICIENT_COUNT];
        for (i, coefficient) in coefficients.iter_mut().enumerate() {
            // Frequencies sit in the first two slots of each group, amplitudes in the last two
            *coefficient = if i % 4 < 2 {
                rng.next_signed(0.1, 5.0)
            } else {
                rng.next_float(-1.3, 1.3)
            };
        }
        let x = rng.next_float(-2.0, 2.0);
        let y = rng.next_float(-2.0, 2.0);

        self.coefficients = coefficients;
        self.x = x;
        self.y = y;
    }

    pub fn next_note<R: RandomSource>(&mut self, channel: Channel, rng: &mut R) -> i32 {
        let group = if rng.next_int(0, 2) == ALTERNATE_BRANCH_DRAW {
            ALTERNATE_GROUP
        } else {
            0
        };
        self.iterate(group);

        let value = match channel {
            Channel::Lead => self.x,
            Channel::Bass => self.y,
        };
        self.quantize(value) + channel.transpose()
    }

    fn iterate(&mut self, group: usize) {
        let c = &self.coefficients[group..group + 4];
        let x1 = (c[0] * self.y).sin() + c[2] * (c[0] * self.x).cos();
        let y1 = (c[1] * self.x).sin() + c[3] * (c[1] * self.y).cos();
        self.x = x1;
        self.y = y1;
    }

    fn quantize(&self, value: f32) -> i32 {
        let offset = round_half_up((value * self.zoom).abs());
        let index = (self.base as i64 + offset).rem_euclid(SCALE_LENGTH as i64);
        self.scale.degree(index as usize)
    }

    pub fn coefficients(&self) -> [f32; COEFFICIENT_COUNT] {
        self.coefficients
    }

    pub fn set_coefficients(&mut self, coefficients: [f32; COEFFICIENT_COUNT]) {
        self.coefficients = coefficients;
    }

    pub fn state(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn set_state(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Scale) {
        self.scale = scale;
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Negative zoom is treated as zero
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.max(0.0);
    }

    pub fn base(&self) -> i32 {
        self.base
    }

    pub fn set_base(&mut self, base: i32) {
        self.base = base;
    }
}

impl NoteSource for ChaosMelody {
    fn next_note<R: RandomSource>(&mut self, channel: Channel, rng: &mut R) -> i32 {
        ChaosMelody::next_note(self, channel, rng)
    }

    fn randomize<R: RandomSource>(&mut self, rng: &mut R) {
        ChaosMelody::randomize(self, rng)
    }
}
