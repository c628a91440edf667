use crossbeam::queue::SegQueue;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::cv::Cv2Mode;
use crate::events::ControlEvent;
use crate::sequencing::Scale;

/// Maximum commands applied per audio block
pub const MAX_COMMANDS_PER_BLOCK: usize = 64;

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("unknown control event '{0}'")]
    UnknownEvent(String),

    #[error("invalid parameter {value} for '{event}'")]
    InvalidParameter { event: String, value: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionCommand {
    SetBpm(f32),
    SetZoom(f32),
    SetBase(i32),
    SetScale(Scale),
    SetTestMode(bool),
    Randomize,
    Reset,
    SetCv2Mode(Cv2Mode),
    SetModGain(f32),
    SetModFreq(f32),
}

impl SessionCommand {
    /// Parse a named control event. Indexed parameters (scale, CV2 mode) wrap.
    pub fn from_event(event: &ControlEvent) -> Result<Self, CommandError> {
        let value = event.parameter;
        if !value.is_finite() {
            return Err(invalid(event));
        }

        let command = match event.event.as_str() {
            "set_bpm" => SessionCommand::SetBpm(value),
            "set_zoom" => SessionCommand::SetZoom(value),
            "set_base" => SessionCommand::SetBase(value.round() as i32),
            "set_scale" => SessionCommand::SetScale(Scale::from_index(index_of(event)?)),
            "set_test_mode" => SessionCommand::SetTestMode(event.as_bool()),
            "randomize" => SessionCommand::Randomize,
            "reset" => SessionCommand::Reset,
            "set_cv2_mode" => SessionCommand::SetCv2Mode(Cv2Mode::from_index(index_of(event)?)),
            "set_mod_gain" if value >= 0.0 => SessionCommand::SetModGain(value),
            "set_mod_freq" if value > 0.0 => SessionCommand::SetModFreq(value),
            "set_mod_gain" | "set_mod_freq" => return Err(invalid(event)),
            other => return Err(CommandError::UnknownEvent(other.to_string())),
        };
        Ok(command)
    }
}

fn invalid(event: &ControlEvent) -> CommandError {
    CommandError::InvalidParameter {
        event: event.event.clone(),
        value: event.parameter,
    }
}

fn index_of(event: &ControlEvent) -> Result<usize, CommandError> {
    if event.parameter < 0.0 {
        return Err(invalid(event));
    }
    Ok(event.parameter.round() as usize)
}

/// Lock-free command queue for session parameter changes
/// Uses a multiple-producer, single-consumer queue from crossbeam
pub struct SessionCommandQueue {
    queue: Arc<SegQueue<SessionCommand>>,
}

impl SessionCommandQueue {
    pub fn new() -> Self {
        Self {
            queue: Arc::new(SegQueue::new()),
        }
    }

    /// Get a handle for sending commands (for UI thread)
    pub fn sender(&self) -> SessionCommandSender {
        SessionCommandSender {
            queue: Arc::clone(&self.queue),
        }
    }

    /// Get a handle for receiving commands (for audio thread)
    pub fn receiver(&self) -> SessionCommandReceiver {
        SessionCommandReceiver {
            queue: Arc::clone(&self.queue),
        }
    }
}

impl Default for SessionCommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Sender handle for UI thread
#[derive(Clone)]
pub struct SessionCommandSender {
    queue: Arc<SegQueue<SessionCommand>>,
}

impl SessionCommandSender {
    /// Send a command to the audio thread (non-blocking)
    pub fn send(&self, command: SessionCommand) {
        self.queue.push(command);
    }

    /// Parse and send a named event; rejected events are logged and dropped
    pub fn send_event(&self, event: &ControlEvent) -> Result<(), CommandError> {
        match SessionCommand::from_event(event) {
            Ok(command) => {
                self.send(command);
                Ok(())
            }
            Err(err) => {
                warn!(event = %event.event, parameter = event.parameter, "rejected control event: {}", err);
                Err(err)
            }
        }
    }
}

/// Receiver handle for audio thread
pub struct SessionCommandReceiver {
    queue: Arc<SegQueue<SessionCommand>>,
}

impl SessionCommandReceiver {
    /// Apply pending commands, at most `MAX_COMMANDS_PER_BLOCK` of them.
    /// Call at the start of each audio block.
    pub fn process_commands<F>(&self, mut apply_command: F)
    where
        F: FnMut(SessionCommand),
    {
        for _ in 0..MAX_COMMANDS_PER_BLOCK {
            if let Some(command) = self.queue.pop() {
                apply_command(command);
            } else {
                break;
            }
        }
    }

    pub fn has_commands(&self) -> bool {
        !self.queue.is_empty()
    }
}
