//! Generative sequencing core for a CV/gate drone instrument: four Euclidean
//! rhythm lanes pick a channel, a chaotic sine/cosine map picks the note, and a
//! beat clock driven by control ticks decides when.

pub mod audio;
#[cfg(feature = "audio-output")]
pub mod audio_output;
pub mod commands;
pub mod config;
pub mod cv;
pub mod events;
pub mod random;
pub mod sequencing;
pub mod session;

pub use audio::systems::DroneSystem;
#[cfg(feature = "audio-output")]
pub use audio_output::{AudioOutput, AudioOutputError};
pub use commands::{CommandError, SessionCommand, SessionCommandQueue};
pub use config::{ConfigError, HostConfig, SessionConfig};
pub use cv::{Cv2Mode, CvFrame, CvRouter};
pub use events::{session_events, ControlEvent, SessionEvent, SessionEventReceiver};
pub use random::{FastRandSource, RandomSource};
pub use sequencing::{
    AlternateWalkMelody, BeatClock, Channel, ChaosMelody, EuclideanBank, EuclideanLane, NoteSource,
    Scale,
};
pub use session::{ChannelOutput, PulseDecision, SequencerSession};
