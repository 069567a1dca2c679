use crate::identity::OperationId;
use std::collections::{HashMap, VecDeque};
use tokio::sync::oneshot;

/// Resolves the callers of back navigations once the host transition they
/// caused has been reconciled.
///
/// Requests are bound to host back notifications in the order they were
/// issued. A caller whose operation is dropped observes a closed channel,
/// which the engine reports as a cancelled navigation.
#[derive(Default)]
pub(crate) struct OperationSignal {
    pending: HashMap<OperationId, oneshot::Sender<()>>,
    requested: VecDeque<OperationId>,
}

impl OperationSignal {
    /// Registers a new operation waiting for its host back notification.
    pub fn set_back_hook(&mut self) -> (OperationId, oneshot::Receiver<()>) {
        let id = OperationId::generate();
        let (tx, rx) = oneshot::channel();
        self.pending.insert(id, tx);
        self.requested.push_back(id);
        (id, rx)
    }

    /// Binds the very next host back notification to an already registered
    /// operation.
    pub fn retag(&mut self, id: OperationId) {
        self.requested.retain(|requested| *requested != id);
        self.requested.push_front(id);
    }

    pub fn take_next(&mut self) -> Option<OperationId> {
        self.requested.pop_front()
    }

    pub fn apply_back_hook(&mut self, id: Option<OperationId>) {
        if let Some(resolve) = id.and_then(|id| self.pending.remove(&id)) {
            let _ = resolve.send(());
        }
    }

    pub fn cancel(&mut self, id: OperationId) {
        self.requested.retain(|requested| *requested != id);
        self.pending.remove(&id);
    }

    pub fn cancel_all(&mut self) {
        self.requested.clear();
        self.pending.clear();
    }
}
