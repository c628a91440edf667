use super::{wrap_index, Channel, NoteSource};
use crate::random::RandomSource;

pub const WALK_SCALE_LENGTH: usize = 20;
pub const JUMP_TABLE_LENGTH: usize = 5;

/// Up an octave and a third, then back down
const WALK_SCALE: [i32; WALK_SCALE_LENGTH] = [
    0, 2, 4, 5, 7, 9, 11, 12, -1, 14, 16, 14, 12, 11, 9, 7, 5, 4, 2, -1,
];

/// Jump-table melody: every scale position owns a cursor into a shared table of
/// jump lengths, and the cursor of the position just left advances round-robin.
#[derive(Clone, Debug, PartialEq)]
pub struct AlternateWalkMelody {
    jump_table: [usize; JUMP_TABLE_LENGTH],
    jump_index: [usize; WALK_SCALE_LENGTH],
    position: usize,
}

impl Default for AlternateWalkMelody {
    fn default() -> Self {
        Self {
            jump_table: [1; JUMP_TABLE_LENGTH],
            jump_index: [0; WALK_SCALE_LENGTH],
            position: 0,
        }
    }
}

impl AlternateWalkMelody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicitly set every field. Indices are wrapped into their tables and the
    /// first jump is forced to a single step.
    pub fn configure(
        &mut self,
        jump_table: [usize; JUMP_TABLE_LENGTH],
        jump_index: [usize; WALK_SCALE_LENGTH],
        position: usize,
    ) {
        self.jump_table = jump_table;
        self.jump_table[0] = 1;
        self.jump_index = jump_index.map(|index| wrap_index(index, JUMP_TABLE_LENGTH));
        self.position = wrap_index(position, WALK_SCALE_LENGTH);
    }

    pub fn randomize<R: RandomSource>(&mut self, rng: &mut R) {
        let mut jump_table = [1; JUMP_TABLE_LENGTH];
        for jump in jump_table.iter_mut().skip(1) {
            *jump = rng.next_int(1, (WALK_SCALE_LENGTH / 2) as i32) as usize;
        }
        let mut jump_index = [0; WALK_SCALE_LENGTH];
        for index in jump_index.iter_mut() {
            *index = rng.next_int(0, JUMP_TABLE_LENGTH as i32 - 1) as usize;
        }
        let position = rng.next_int(0, WALK_SCALE_LENGTH as i32 - 1) as usize;
        self.configure(jump_table, jump_index, position);
    }

    /// Note at the current position; then hop
    pub fn next_note(&mut self) -> i32 {
        let position = self.position;
        let note = WALK_SCALE[position];
        let slot = self.jump_index[position];
        let jump = self.jump_table[wrap_index(slot, JUMP_TABLE_LENGTH)];
        self.jump_index[position] = wrap_index(slot + 1, JUMP_TABLE_LENGTH);
        self.position = wrap_index(position + jump, WALK_SCALE_LENGTH);
        note
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn jump_table(&self) -> [usize; JUMP_TABLE_LENGTH] {
        self.jump_table
    }

    pub fn jump_index(&self) -> [usize; WALK_SCALE_LENGTH] {
        self.jump_index
    }
}

impl NoteSource for AlternateWalkMelody {
    fn next_note<R: RandomSource>(&mut self, channel: Channel, _rng: &mut R) -> i32 {
        AlternateWalkMelody::next_note(self) + channel.transpose()
    }

    fn randomize<R: RandomSource>(&mut self, rng: &mut R) {
        AlternateWalkMelody::randomize(self, rng)
    }
}
