use crossbeam::queue::SegQueue;
use std::sync::Arc;

use crate::sequencing::Channel;

/// Control event - sent from a front panel or UI to the audio thread by name
#[derive(Debug, Clone, PartialEq)]
pub struct ControlEvent {
    /// Event name (e.g. "set_bpm", "randomize", "set_cv2_mode")
    pub event: String,
    /// Event parameter (for booleans: 0.0 = false, 1.0 = true)
    pub parameter: f32,
}

impl ControlEvent {
    pub fn new(event: &str, parameter: f32) -> Self {
        Self {
            event: event.to_string(),
            parameter,
        }
    }

    /// Get parameter as boolean (0.0 = false, non-zero = true)
    pub fn as_bool(&self) -> bool {
        self.parameter != 0.0
    }
}

// Session events for audio -> UI communication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Pulse { channel: Channel, note: i32 },
    BeatChanged(u8),
}

/// Lock-free audio -> UI event channel
pub fn session_events() -> (SessionEventSender, SessionEventReceiver) {
    let queue = Arc::new(SegQueue::new());
    (
        SessionEventSender {
            queue: Arc::clone(&queue),
        },
        SessionEventReceiver { queue },
    )
}

/// Sender handle for audio thread
#[derive(Clone)]
pub struct SessionEventSender {
    queue: Arc<SegQueue<SessionEvent>>,
}

impl SessionEventSender {
    /// Non-blocking
    pub fn send(&self, event: SessionEvent) {
        self.queue.push(event);
    }
}

/// Receiver handle for UI thread
pub struct SessionEventReceiver {
    queue: Arc<SegQueue<SessionEvent>>,
}

impl SessionEventReceiver {
    /// Hand every pending event to `emit_event`
    pub fn process_events<F>(&self, mut emit_event: F)
    where
        F: FnMut(SessionEvent),
    {
        while let Some(event) = self.queue.pop() {
            emit_event(event);
        }
    }

    pub fn drain(&self) -> Vec<SessionEvent> {
        let mut events = Vec::with_capacity(self.queue.len());
        self.process_events(|event| events.push(event));
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_arrive_in_order() {
        let (sender, receiver) = session_events();

        sender.send(SessionEvent::BeatChanged(1));
        sender.clone().send(SessionEvent::Pulse {
            channel: Channel::Bass,
            note: 14,
        });

        assert_eq!(
            receiver.drain(),
            vec![
                SessionEvent::BeatChanged(1),
                SessionEvent::Pulse {
                    channel: Channel::Bass,
                    note: 14
                }
            ]
        );
        assert!(receiver.drain().is_empty());
    }

    #[test]
    fn test_control_event_bool() {
        assert!(ControlEvent::new("set_test_mode", 1.0).as_bool());
        assert!(!ControlEvent::new("set_test_mode", 0.0).as_bool());
    }
}
