//! Channel-backed job event emitter.

use dlpro_core::{JobEvent, JobEventEmitterPort};
use tokio::sync::mpsc;

/// Forwards job events into an unbounded tokio channel.
///
/// Sending never blocks. Events sent after the receiver is dropped are
/// discarded.
#[derive(Debug, Clone)]
pub struct ChannelJobEmitter {
    sender: mpsc::UnboundedSender<JobEvent>,
}

impl ChannelJobEmitter {
    /// Create an emitter and the receiver that observes its events.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<JobEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    #[must_use]
    pub const fn from_sender(sender: mpsc::UnboundedSender<JobEvent>) -> Self {
        Self { sender }
    }
}

impl JobEventEmitterPort for ChannelJobEmitter {
    fn emit(&self, event: JobEvent) {
        let _ = self.sender.send(event);
    }

    fn clone_box(&self) -> Box<dyn JobEventEmitterPort> {
        Box::new(self.clone())
    }
}
