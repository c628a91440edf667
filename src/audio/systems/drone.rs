use tracing::debug;

use crate::audio::AudioSystem;
use crate::commands::{SessionCommand, SessionCommandReceiver};
use crate::config::HostConfig;
use crate::cv::{CvFrame, CvRouter};
use crate::events::{SessionEvent, SessionEventSender};
use crate::session::{PulseDecision, SequencerSession};

/// Output level of the noise channel
pub const NOISE_LEVEL: f32 = 0.09;
/// Output level of the trigger channel during a pulse block
pub const TRIGGER_LEVEL: f32 = 0.7;

/// Seed offset for the CV2 random source
const ROUTER_SEED_SALT: u64 = 0x2545_f491_4f6c_dd1d;

/// Block-driven host for one sequencer session.
///
/// Every `block_size` frames it applies queued commands, ticks the session once
/// and routes the result to CV. Each frame carries the noise sample on the first
/// channel and the trigger level on the second.
pub struct DroneSystem {
    session: SequencerSession,
    router: CvRouter,

    commands: SessionCommandReceiver,
    events: SessionEventSender,

    block_size: usize,
    frame_in_block: usize,
    frame: CvFrame,
    parity: u8,
}

impl DroneSystem {
    pub fn new(host: &HostConfig, commands: SessionCommandReceiver, events: SessionEventSender) -> Self {
        let block_size = host.block_size.max(1);
        let control_rate = host.audio_rate / block_size as f32;

        let mut session = SequencerSession::new(host.audio_rate, control_rate, host.seed);
        session.set_config(host.session.clone().sanitized());
        let router = CvRouter::new(
            control_rate,
            host.cv2_mode,
            host.mod_gain,
            host.mod_freq,
            host.seed ^ ROUTER_SEED_SALT,
        );

        Self {
            session,
            router,
            commands,
            events,
            block_size,
            frame_in_block: 0,
            frame: CvFrame::default(),
            parity: 0,
        }
    }

    /// One control tick: drain commands, tick, route, publish
    pub fn process_block(&mut self) -> CvFrame {
        let session = &mut self.session;
        let router = &mut self.router;
        self.commands
            .process_commands(|command| apply_command(session, router, command));

        let decision = self.session.process_tick();
        let parity = self.session.beat_parity();
        self.frame = self.router.route(decision, parity);

        if parity != self.parity {
            self.parity = parity;
            self.events.send(SessionEvent::BeatChanged(parity));
        }
        if let PulseDecision::Pulse { channel, note } = decision {
            self.events.send(SessionEvent::Pulse { channel, note });
        }
        self.frame
    }

    /// Outputs of the most recent tick
    pub fn cv_frame(&self) -> CvFrame {
        self.frame
    }

    pub fn session(&self) -> &SequencerSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SequencerSession {
        &mut self.session
    }

    pub fn router(&self) -> &CvRouter {
        &self.router
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

fn apply_command(session: &mut SequencerSession, router: &mut CvRouter, command: SessionCommand) {
    match command {
        SessionCommand::SetBpm(bpm) => session.config_mut().set_bpm(bpm),
        SessionCommand::SetZoom(zoom) => session.config_mut().set_zoom(zoom),
        SessionCommand::SetBase(base) => session.config_mut().set_base(base),
        SessionCommand::SetScale(scale) => session.config_mut().scale = scale,
        SessionCommand::SetTestMode(enabled) => session.config_mut().test_mode = enabled,
        SessionCommand::Randomize => session.randomize(),
        SessionCommand::Reset => session.reset(),
        SessionCommand::SetCv2Mode(mode) => router.set_mode(mode),
        SessionCommand::SetModGain(gain) => router.set_mod_gain(gain),
        SessionCommand::SetModFreq(freq) => router.set_mod_freq(freq),
    }
    debug!(?command, "applied session command");
}

impl AudioSystem for DroneSystem {
    fn generate(&mut self, data: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }

        for frame in data.chunks_mut(channels) {
            if self.frame_in_block == 0 {
                self.process_block();
            }
            self.frame_in_block = (self.frame_in_block + 1) % self.block_size;

            let noise = self.session.process_audio_sample() * NOISE_LEVEL;
            let trigger = if self.frame.trigger { TRIGGER_LEVEL } else { 0.0 };

            frame[0] = noise;
            if let Some(sample) = frame.get_mut(1) {
                *sample = trigger;
            }
            for sample in frame.iter_mut().skip(2) {
                *sample = 0.0;
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        let control_rate = sample_rate / self.block_size as f32;
        self.session.set_rates(sample_rate, control_rate);
        self.router.set_control_rate(control_rate);
        debug!(sample_rate, control_rate, "drone system rates changed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::SessionCommandQueue;
    use crate::cv::Cv2Mode;
    use crate::events::{session_events, ControlEvent, SessionEventReceiver};
    use crate::sequencing::{Channel, Scale};

    struct Rig {
        system: DroneSystem,
        commands: SessionCommandQueue,
        events: SessionEventReceiver,
    }

    /// Four frames per block at 8 Hz: two control ticks per second
    fn rig() -> Rig {
        let mut host = HostConfig {
            audio_rate: 8.0,
            block_size: 4,
            cv2_mode: Cv2Mode::Bassline,
            ..HostConfig::default()
        };
        host.session.bpm = 60.0;

        let commands = SessionCommandQueue::new();
        let (event_sender, events) = session_events();
        let system = DroneSystem::new(&host, commands.receiver(), event_sender);
        Rig {
            system,
            commands,
            events,
        }
    }

    #[test]
    fn test_commands_apply_before_the_tick() {
        let mut rig = rig();
        let sender = rig.commands.sender();
        sender.send(SessionCommand::SetBpm(500.0));
        sender.send(SessionCommand::SetScale(Scale::Minor));
        sender
            .send_event(&ControlEvent::new("set_test_mode", 1.0))
            .unwrap();

        rig.system.process_block();
        let config = rig.system.session().config();
        assert_eq!(config.bpm, 200.0);
        assert_eq!(config.scale, Scale::Minor);
        assert!(config.test_mode);
    }

    #[test]
    fn test_test_mode_pulse_reaches_outputs() {
        let mut rig = rig();
        rig.commands.sender().send(SessionCommand::SetTestMode(true));

        let mut buffer = vec![1.0; 4 * 3 * 2];
        rig.system.generate(&mut buffer, 2);

        for (i, frame) in buffer.chunks(2).enumerate() {
            assert!(frame[0].abs() <= NOISE_LEVEL);
            let expected = if i >= 8 { TRIGGER_LEVEL } else { 0.0 };
            assert_eq!(frame[1], expected, "frame {}", i);
        }

        let cv = rig.system.cv_frame();
        assert_eq!(cv.cv1, Some(0.0));
        assert!(cv.gate && cv.trigger && cv.led);

        assert_eq!(
            rig.events.drain(),
            vec![
                SessionEvent::BeatChanged(1),
                SessionEvent::BeatChanged(0),
                SessionEvent::Pulse {
                    channel: Channel::Lead,
                    note: 0
                },
            ]
        );
    }

    #[test]
    fn test_block_position_survives_odd_buffer_sizes() {
        let mut whole = rig();
        let mut split = rig();

        let mut a = vec![0.0; 40];
        whole.system.generate(&mut a, 2);

        let mut b = vec![0.0; 40];
        let (first, second) = b.split_at_mut(6);
        split.system.generate(first, 2);
        split.system.generate(second, 2);

        assert_eq!(a, b);
        assert_eq!(whole.events.drain(), split.events.drain());
    }

    #[test]
    fn test_extra_channels_are_silent() {
        let mut rig = rig();
        let mut buffer = vec![1.0; 4 * 4];
        rig.system.generate(&mut buffer, 4);
        for frame in buffer.chunks(4) {
            assert_eq!(&frame[2..], &[0.0, 0.0]);
        }
    }

    #[test]
    fn test_router_commands() {
        let mut rig = rig();
        let sender = rig.commands.sender();
        sender.send(SessionCommand::SetCv2Mode(Cv2Mode::Random));
        sender.send(SessionCommand::SetModGain(0.25));
        rig.system.process_block();
        assert_eq!(rig.system.router().mode(), Cv2Mode::Random);
        assert_eq!(rig.system.router().mod_gain(), 0.25);
    }

    #[test]
    fn test_reset_command_rewinds_the_clock() {
        let mut rig = rig();
        for _ in 0..5 {
            rig.system.process_block();
        }
        rig.commands.sender().send(SessionCommand::Reset);
        rig.system.process_block();
        assert_eq!(rig.system.session().clock().tick(), 1);
        assert_eq!(rig.system.session().beat_parity(), 0);
    }

    #[test]
    fn test_sample_rate_change_moves_the_control_rate() {
        let mut rig = rig();
        rig.system.set_sample_rate(48000.0);
        assert_eq!(rig.system.session().control_rate(), 12000.0);
        assert_eq!(rig.system.router().gate_ticks(), 39);
    }
}
