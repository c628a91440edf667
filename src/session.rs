use tracing::debug;

use crate::audio::oscillators::NoiseGenerator;
use crate::audio::AudioGenerator;
use crate::config::SessionConfig;
use crate::random::{FastRandSource, RandomSource};
use crate::sequencing::{
    wrap_index, BeatClock, Channel, ChaosMelody, EuclideanBank, LANE_COUNT,
};

/// Notes played in test mode, one per beat
pub const TEST_NOTES: [i32; 8] = [0, 2, 4, 5, 7, 9, 11, 12];

/// Mixed into the session seed so the noise stream differs from the sequencer's
const NOISE_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// What a single tick produced
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PulseDecision {
    #[default]
    NoPulse,
    Pulse { channel: Channel, note: i32 },
}

impl PulseDecision {
    pub fn is_pulse(&self) -> bool {
        matches!(self, PulseDecision::Pulse { .. })
    }
}

/// Lanes 0 and 1 trigger the lead, lanes 2 and 3 the bass; the lead wins when
/// both groups fire. Several lanes in one group count as a single trigger.
pub fn resolve_channel(triggers: [bool; LANE_COUNT]) -> Option<Channel> {
    if triggers[0] || triggers[1] {
        Some(Channel::Lead)
    } else if triggers[2] || triggers[3] {
        Some(Channel::Bass)
    } else {
        None
    }
}

/// Per-channel output read by the host after each tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChannelOutput {
    /// Set only on the tick that produced the note
    pub pulse: bool,
    /// Last note played on this channel, held between pulses
    pub note: i32,
}

/// The sequencing core: one rhythm bank, one chaos melody and the beat clock.
///
/// Call `process_tick` once per control block and `process_audio_sample` once
/// per audio frame. Neither allocates and neither can fail.
pub struct SequencerSession<R: RandomSource = FastRandSource> {
    bank: EuclideanBank,
    chaos: ChaosMelody,
    clock: BeatClock,
    config: SessionConfig,

    audio_rate: f32,
    control_rate: f32,

    outputs: [ChannelOutput; 2],
    last_decision: PulseDecision,
    test_index: usize,

    rng: R,
    noise: NoiseGenerator,
    noise_sample: f32,
}

impl SequencerSession<FastRandSource> {
    pub fn new(audio_rate: f32, control_rate: f32, seed: u64) -> Self {
        Self::with_rng(
            audio_rate,
            control_rate,
            FastRandSource::with_seed(seed),
            NoiseGenerator::with_seed(seed ^ NOISE_SEED_SALT),
        )
    }
}

impl<R: RandomSource> SequencerSession<R> {
    /// A non-positive control rate falls back to one tick per audio sample.
    /// Generators start from a fresh randomize.
    pub fn with_rng(audio_rate: f32, control_rate: f32, rng: R, noise: NoiseGenerator) -> Self {
        let control_rate = if control_rate > 0.0 { control_rate } else { audio_rate };
        let mut session = Self {
            bank: EuclideanBank::new(),
            chaos: ChaosMelody::new(),
            clock: BeatClock::new(),
            config: SessionConfig::default(),
            audio_rate,
            control_rate,
            outputs: [ChannelOutput::default(); 2],
            last_decision: PulseDecision::NoPulse,
            test_index: 0,
            rng,
            noise,
            noise_sample: 0.0,
        };
        session.randomize();
        session
    }

    /// Advance the beat clock by one control tick and resolve at most one pulse
    pub fn process_tick(&mut self) -> PulseDecision {
        self.chaos.set_zoom(self.config.zoom);
        self.chaos.set_base(self.config.base);
        self.chaos.set_scale(self.config.scale);

        for output in self.outputs.iter_mut() {
            output.pulse = false;
        }

        let decision = if self.clock.advance(self.config.bpm, self.control_rate) {
            self.resolve_boundary()
        } else {
            PulseDecision::NoPulse
        };

        if let PulseDecision::Pulse { channel, note } = decision {
            let output = &mut self.outputs[channel.index()];
            output.pulse = true;
            output.note = note;
        }
        self.last_decision = decision;
        decision
    }

    fn resolve_boundary(&mut self) -> PulseDecision {
        if self.config.test_mode {
            if self.clock.parity() != 0 {
                return PulseDecision::NoPulse;
            }
            let note = TEST_NOTES[wrap_index(self.test_index, TEST_NOTES.len())];
            self.test_index = wrap_index(self.test_index + 1, TEST_NOTES.len());
            return PulseDecision::Pulse {
                channel: Channel::Lead,
                note,
            };
        }

        let triggers = self.bank.step(&mut self.rng);
        match resolve_channel(triggers) {
            Some(channel) => PulseDecision::Pulse {
                channel,
                note: self.chaos.next_note(channel, &mut self.rng),
            },
            None => PulseDecision::NoPulse,
        }
    }

    /// Advance the noise source by one audio frame
    pub fn process_audio_sample(&mut self) -> f32 {
        self.noise_sample = self.noise.next_sample();
        self.noise_sample
    }

    /// Replace every lane and the whole chaos parameter set
    pub fn randomize(&mut self) {
        self.bank.randomize(&mut self.rng);
        self.chaos.randomize(&mut self.rng);
        let step_counts: [usize; LANE_COUNT] =
            std::array::from_fn(|index| self.bank.lane(index).step_count());
        debug!(
            lanes = ?step_counts,
            coefficients = ?self.chaos.coefficients(),
            "sequencer randomized"
        );
    }

    /// Rewind lanes, clock and test sequence without touching any parameters
    pub fn reset(&mut self) {
        self.bank.reset();
        self.clock.reset();
        self.test_index = 0;
        self.outputs = [ChannelOutput::default(); 2];
        self.last_decision = PulseDecision::NoPulse;
        debug!("sequencer reset");
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Raw access; values written here reach the core unclamped
    pub fn config_mut(&mut self) -> &mut SessionConfig {
        &mut self.config
    }

    pub fn set_config(&mut self, config: SessionConfig) {
        self.config = config;
    }

    pub fn output(&self, channel: Channel) -> ChannelOutput {
        self.outputs[channel.index()]
    }

    pub fn last_decision(&self) -> PulseDecision {
        self.last_decision
    }

    pub fn beat_parity(&self) -> u8 {
        self.clock.parity()
    }

    pub fn noise_sample(&self) -> f32 {
        self.noise_sample
    }

    pub fn test_index(&self) -> usize {
        self.test_index
    }

    pub fn audio_rate(&self) -> f32 {
        self.audio_rate
    }

    pub fn control_rate(&self) -> f32 {
        self.control_rate
    }

    /// Change the tick and sample rates; the clock keeps its position in ticks
    pub fn set_rates(&mut self, audio_rate: f32, control_rate: f32) {
        self.audio_rate = audio_rate;
        self.control_rate = if control_rate > 0.0 { control_rate } else { audio_rate };
    }

    pub fn clock(&self) -> &BeatClock {
        &self.clock
    }

    pub fn bank(&self) -> &EuclideanBank {
        &self.bank
    }

    pub fn bank_mut(&mut self) -> &mut EuclideanBank {
        &mut self.bank
    }

    pub fn chaos(&self) -> &ChaosMelody {
        &self.chaos
    }

    pub fn chaos_mut(&mut self) -> &mut ChaosMelody {
        &mut self.chaos
    }
}
