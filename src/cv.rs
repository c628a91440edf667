use serde::{Deserialize, Serialize};

use crate::audio::oscillators::SineOscillator;
use crate::audio::AudioGenerator;
use crate::random::{FastRandSource, RandomSource};
use crate::sequencing::Channel;
use crate::session::PulseDecision;

/// Full-scale CV output
pub const MAX_CV_VOLTS: f32 = 5.0;
/// Length of the gate raised with every CV1 write
pub const GATE_LENGTH_MS: u32 = 3;

/// What the second CV output carries
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cv2Mode {
    /// Unipolar sine at `mod_freq`
    #[default]
    Lfo,
    /// A new random level on every pulse
    Random,
    /// Bass notes go to CV2, lead notes stay on CV1
    Bassline,
}

impl Cv2Mode {
    pub const ALL: [Cv2Mode; 3] = [Cv2Mode::Lfo, Cv2Mode::Random, Cv2Mode::Bassline];

    /// Menu order, wrapping
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "lfo" => Some(Cv2Mode::Lfo),
            "random" | "rand" => Some(Cv2Mode::Random),
            "bassline" | "bass" => Some(Cv2Mode::Bassline),
            _ => None,
        }
    }
}

/// One volt per octave
pub fn note_to_volts(note: i32) -> f32 {
    note as f32 / 12.0
}

/// Control ticks in `GATE_LENGTH_MS`, counting at least one tick per millisecond
pub fn gate_ticks(control_rate: f32) -> u32 {
    let ticks_per_ms = 1 + (control_rate / 1000.0) as u32;
    GATE_LENGTH_MS * ticks_per_ms
}

/// Output levels for one control tick. `None` leaves a CV output where it was.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CvFrame {
    pub cv1: Option<f32>,
    pub cv2: Option<f32>,
    pub gate: bool,
    /// Raised for the audio block of any pulse
    pub trigger: bool,
    /// Beat indicator, lit on even sub-beats
    pub led: bool,
}

/// Maps pulse decisions onto the two CV outputs, the gate and the LED
pub struct CvRouter<R: RandomSource = FastRandSource> {
    mode: Cv2Mode,
    mod_gain: f32,
    lfo: SineOscillator,
    rng: R,
    gate_ticks: u32,
    gate_remaining: u32,
}

impl CvRouter<FastRandSource> {
    pub fn new(control_rate: f32, mode: Cv2Mode, mod_gain: f32, mod_freq: f32, seed: u64) -> Self {
        Self::with_rng(control_rate, mode, mod_gain, mod_freq, FastRandSource::with_seed(seed))
    }
}

impl<R: RandomSource> CvRouter<R> {
    pub fn with_rng(control_rate: f32, mode: Cv2Mode, mod_gain: f32, mod_freq: f32, rng: R) -> Self {
        Self {
            mode,
            mod_gain,
            lfo: SineOscillator::new(mod_freq, control_rate),
            rng,
            gate_ticks: gate_ticks(control_rate),
            gate_remaining: 0,
        }
    }

    /// Call once per control tick, after the session has resolved its pulse
    pub fn route(&mut self, decision: PulseDecision, beat_parity: u8) -> CvFrame {
        let mut frame = CvFrame {
            led: beat_parity == 0,
            ..CvFrame::default()
        };

        if let PulseDecision::Pulse { channel, note } = decision {
            let volts = note_to_volts(note);
            if channel == Channel::Bass && self.mode == Cv2Mode::Bassline {
                frame.cv2 = Some(volts);
            } else {
                frame.cv1 = Some(volts);
                self.gate_remaining = self.gate_ticks;
            }
            frame.trigger = true;
        }

        match self.mode {
            Cv2Mode::Lfo => {
                let lfo = self.lfo.next_sample();
                frame.cv2 = Some(self.scaled(MAX_CV_VOLTS * 0.5 * (lfo + 1.0)));
            }
            Cv2Mode::Random => {
                if frame.trigger {
                    let level = self.rng.next_float(0.0, MAX_CV_VOLTS);
                    frame.cv2 = Some(self.scaled(level));
                }
            }
            Cv2Mode::Bassline => {}
        }

        // The write tick counts against the gate
        self.gate_remaining = self.gate_remaining.saturating_sub(1);
        frame.gate = self.gate_remaining > 0;
        frame
    }

    fn scaled(&self, volts: f32) -> f32 {
        (volts * self.mod_gain).clamp(0.0, MAX_CV_VOLTS)
    }

    pub fn mode(&self) -> Cv2Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Cv2Mode) {
        if mode != self.mode {
            self.lfo.reset();
        }
        self.mode = mode;
    }

    pub fn mod_gain(&self) -> f32 {
        self.mod_gain
    }

    pub fn set_mod_gain(&mut self, mod_gain: f32) {
        self.mod_gain = mod_gain.max(0.0);
    }

    pub fn set_mod_freq(&mut self, mod_freq: f32) {
        self.lfo.set_frequency(mod_freq);
    }

    pub fn gate_ticks(&self) -> u32 {
        self.gate_ticks
    }

    pub fn set_control_rate(&mut self, control_rate: f32) {
        self.lfo.set_sample_rate(control_rate);
        self.gate_ticks = gate_ticks(control_rate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEAD_C: PulseDecision = PulseDecision::Pulse {
        channel: Channel::Lead,
        note: 12,
    };
    const BASS_G: PulseDecision = PulseDecision::Pulse {
        channel: Channel::Bass,
        note: 19,
    };

    #[test]
    fn test_note_to_volts() {
        assert_eq!(note_to_volts(0), 0.0);
        assert_eq!(note_to_volts(12), 1.0);
        assert_eq!(note_to_volts(24), 2.0);
    }

    #[test]
    fn test_gate_ticks() {
        assert_eq!(gate_ticks(1000.0), 6);
        assert_eq!(gate_ticks(500.0), 3);
        assert_eq!(gate_ticks(48000.0), 147);
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(Cv2Mode::from_name("LFO"), Some(Cv2Mode::Lfo));
        assert_eq!(Cv2Mode::from_name("bass"), Some(Cv2Mode::Bassline));
        assert_eq!(Cv2Mode::from_name("ramp"), None);
        assert_eq!(Cv2Mode::from_index(4), Cv2Mode::Random);
    }

    #[test]
    fn test_lead_pulse_writes_cv1_and_opens_gate() {
        let mut router = CvRouter::new(500.0, Cv2Mode::Bassline, 1.0, 1.0, 1);
        let frame = router.route(LEAD_C, 0);
        assert_eq!(frame.cv1, Some(1.0));
        assert_eq!(frame.cv2, None);
        assert!(frame.gate && frame.trigger && frame.led);

        let open: Vec<bool> = (0..4)
            .map(|_| router.route(PulseDecision::NoPulse, 1).gate)
            .collect();
        assert_eq!(open, vec![true, false, false, false]);
    }

    #[test]
    fn test_gate_is_high_one_tick_short_of_its_length() {
        for control_rate in [500.0, 1000.0, 12000.0] {
            let mut router = CvRouter::new(control_rate, Cv2Mode::Lfo, 1.0, 1.0, 1);
            let mut open = router.route(LEAD_C, 0).gate as u32;
            for _ in 0..200 {
                open += router.route(PulseDecision::NoPulse, 0).gate as u32;
            }
            assert_eq!(open, gate_ticks(control_rate) - 1, "at {} Hz", control_rate);
        }
    }

    #[test]
    fn test_new_pulse_restarts_the_gate() {
        let mut router = CvRouter::new(1000.0, Cv2Mode::Lfo, 1.0, 1.0, 1);
        router.route(LEAD_C, 0);
        router.route(PulseDecision::NoPulse, 0);
        router.route(PulseDecision::NoPulse, 0);
        assert!(router.route(LEAD_C, 0).gate);
        let open = (0..10)
            .filter(|_| router.route(PulseDecision::NoPulse, 0).gate)
            .count();
        assert_eq!(open, 4);
    }

    #[test]
    fn test_bassline_routes_bass_to_cv2_without_gate() {
        let mut router = CvRouter::new(500.0, Cv2Mode::Bassline, 1.0, 1.0, 1);
        let frame = router.route(BASS_G, 1);
        assert_eq!(frame.cv1, None);
        assert_eq!(frame.cv2, Some(19.0 / 12.0));
        assert!(frame.trigger);
        assert!(!frame.gate);
        assert!(!frame.led);
    }

    #[test]
    fn test_bass_goes_to_cv1_outside_bassline_mode() {
        let mut router = CvRouter::new(500.0, Cv2Mode::Random, 1.0, 1.0, 1);
        let frame = router.route(BASS_G, 0);
        assert_eq!(frame.cv1, Some(19.0 / 12.0));
    }

    #[test]
    fn test_lfo_is_unipolar_and_scaled() {
        // Quarter-cycle steps: peak, middle, trough, middle
        let mut router = CvRouter::new(4.0, Cv2Mode::Lfo, 1.0, 1.0, 1);
        let levels: Vec<f32> = (0..5)
            .filter_map(|_| router.route(PulseDecision::NoPulse, 0).cv2)
            .collect();
        let expected = [2.5, 5.0, 2.5, 0.0, 2.5];
        for (level, expected) in levels.iter().zip(expected) {
            assert!((level - expected).abs() < 1e-3, "{} vs {}", level, expected);
        }

        let mut router = CvRouter::new(4.0, Cv2Mode::Lfo, 0.5, 1.0, 1);
        router.route(PulseDecision::NoPulse, 0);
        let peak = router.route(PulseDecision::NoPulse, 0).cv2.unwrap_or_default();
        assert!((peak - 2.5).abs() < 1e-3);
    }

    #[test]
    fn test_random_mode_only_changes_on_pulse() {
        let mut router = CvRouter::new(1000.0, Cv2Mode::Random, 1.0, 1.0, 3);
        assert_eq!(router.route(PulseDecision::NoPulse, 0).cv2, None);
        for _ in 0..100 {
            let level = router.route(LEAD_C, 0).cv2.unwrap_or(-1.0);
            assert!((0.0..=MAX_CV_VOLTS).contains(&level));
        }
    }

    #[test]
    fn test_gain_is_clamped_to_full_scale() {
        let mut router = CvRouter::new(4.0, Cv2Mode::Lfo, 3.0, 1.0, 1);
        for _ in 0..8 {
            let level = router.route(PulseDecision::NoPulse, 0).cv2.unwrap_or(-1.0);
            assert!((0.0..=MAX_CV_VOLTS).contains(&level));
        }
    }
}
