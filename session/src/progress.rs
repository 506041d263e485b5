//! Progress events emitted while a session advances, for UI status text.

use std::sync::RwLock;

use soundgraph_types::SessionStatus;

pub(crate) const MSG_INITIALIZING: &str = "Initializing proof provider...";
pub(crate) const MSG_STARTING: &str = "Starting verification session...";
pub(crate) const MSG_BUILDING: &str = "Building verification request...";
pub(crate) const MSG_OPENING: &str = "Opening verification...";
pub(crate) const MSG_COMPLETE: &str = "Verification complete";

/// One status change or progress-text update of a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Generation of the session that emitted this event.
    pub generation: u64,
    pub status: SessionStatus,
    pub message: String,
}

type Listener = Box<dyn Fn(&ProgressEvent) + Send + Sync>;

/// Synchronous fan-out bus for [`ProgressEvent`]s.
///
/// Listeners are invoked inline, in emission order, on the task driving the
/// session; keep handlers fast.
#[derive(Default)]
pub struct ProgressBus {
    listeners: RwLock<Vec<Listener>>,
}

impl ProgressBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: Listener) {
        if let Ok(mut listeners) = self.listeners.write() {
            listeners.push(listener);
        }
    }

    pub fn emit(&self, event: &ProgressEvent) {
        if let Ok(listeners) = self.listeners.read() {
            for listener in listeners.iter() {
                listener(event);
            }
        }
    }
}
