pub mod codec;
mod memory;

use crate::identity::SessionId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

pub use memory::MemoryHistory;

/// Payload written into every host history entry owned by the engine.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryStateRecord {
    pub index: i64,
    pub session: SessionId,
}

/// Notification that the host's current history position changed.
#[derive(Debug, Clone, PartialEq)]
pub struct PopStateEvent {
    pub state: Option<Value>,
}

pub type HostEvents = mpsc::UnboundedReceiver<PopStateEvent>;

/// The platform's back/forward ledger.
///
/// Implementations deliver a [`PopStateEvent`] on their [`HostEvents`] channel
/// whenever the position changes because of [`HostHistory::go`] or the
/// platform's own navigation UI. Pushing and replacing never notify.
#[cfg_attr(test, mockall::automock)]
pub trait HostHistory {
    fn push_state(&self, state: Value);
    fn replace_state(&self, state: Value);
    fn go(&self, delta: i64);
    fn state(&self) -> Option<Value>;
}
