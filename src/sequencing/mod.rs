pub mod chaos;
pub mod clocks;
pub mod euclidean;
pub mod scales;
pub mod walk;

pub use chaos::*;
pub use clocks::*;
pub use euclidean::*;
pub use scales::*;
pub use walk::*;

use crate::random::RandomSource;

/// Output channel of a pulse. Bass notes are transposed by the generator, not
/// by whoever consumes the pulse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Lead,
    Bass,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Lead, Channel::Bass];

    pub fn index(self) -> usize {
        match self {
            Channel::Lead => 0,
            Channel::Bass => 1,
        }
    }

    /// Semitones added to every note generated for this channel
    pub fn transpose(self) -> i32 {
        match self {
            Channel::Lead => 0,
            Channel::Bass => 12,
        }
    }
}

/// Anything that can produce the next note for a channel
pub trait NoteSource {
    fn next_note<R: RandomSource>(&mut self, channel: Channel, rng: &mut R) -> i32;

    /// Replace the generator's whole parameter set with fresh draws
    fn randomize<R: RandomSource>(&mut self, rng: &mut R);
}

/// Bounded index into a fixed-capacity table. A zero length maps to slot 0.
#[inline]
pub(crate) fn wrap_index(index: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        index % len
    }
}

/// Single-precision round half up, `floor(v + 0.5)`
#[inline]
pub(crate) fn round_half_up(v: f32) -> i64 {
    (v + 0.5).floor() as i64
}
