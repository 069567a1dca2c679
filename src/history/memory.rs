use crate::history::{HostEvents, HostHistory, PopStateEvent};
use log::debug;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use tokio::sync::mpsc;

struct Entries {
    states: Vec<Option<Value>>,
    position: usize,
}

/// Host history kept in memory, behaving like a browser session history.
#[derive(Clone)]
pub struct MemoryHistory {
    entries: Rc<RefCell<Entries>>,
    events: mpsc::UnboundedSender<PopStateEvent>,
}

impl MemoryHistory {
    /// Starts with the single, state-less entry of a fresh page load.
    pub fn new() -> (Self, HostEvents) {
        let (events, rx) = mpsc::unbounded_channel();
        let history = MemoryHistory {
            entries: Rc::new(RefCell::new(Entries {
                states: vec![None],
                position: 0,
            })),
            events,
        };
        (history, rx)
    }

    /// The user pressed the platform back button.
    pub fn back(&self) {
        self.go(-1);
    }

    /// The user pressed the platform forward button.
    pub fn forward(&self) {
        self.go(1);
    }

    pub fn position(&self) -> usize {
        self.entries.borrow().position
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().states.is_empty()
    }
}

impl HostHistory for MemoryHistory {
    fn push_state(&self, state: Value) {
        let mut entries = self.entries.borrow_mut();
        let next = entries.position + 1;
        entries.states.truncate(next);
        entries.states.push(Some(state));
        entries.position = next;
    }

    fn replace_state(&self, state: Value) {
        let mut entries = self.entries.borrow_mut();
        let position = entries.position;
        entries.states[position] = Some(state);
    }

    fn go(&self, delta: i64) {
        let state = {
            let mut entries = self.entries.borrow_mut();
            let target = entries.position as i64 + delta;
            if delta == 0 || target < 0 || target >= entries.states.len() as i64 {
                debug!("Ignoring history.go({}) from position {}", delta, entries.position);
                return;
            }
            entries.position = target as usize;
            entries.states[entries.position].clone()
        };
        if self.events.send(PopStateEvent { state }).is_err() {
            debug!("Nobody is listening to history notifications anymore");
        }
    }

    fn state(&self) -> Option<Value> {
        let entries = self.entries.borrow();
        entries.states[entries.position].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn push_truncates_forward_entries() {
        let (history, mut events) = MemoryHistory::new();
        history.push_state(json!(1));
        history.push_state(json!(2));
        history.back();
        history.push_state(json!(3));
        assert_eq!(history.len(), 3);
        assert_eq!(history.position(), 2);
        assert_eq!(history.state(), Some(json!(3)));
        assert_eq!(events.try_recv().unwrap(), PopStateEvent { state: Some(json!(1)) });
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn go_out_of_range_does_nothing() {
        let (history, mut events) = MemoryHistory::new();
        history.replace_state(json!(0));
        history.go(-1);
        history.forward();
        assert_eq!(history.position(), 0);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn go_notifies_with_the_new_current_state() {
        let (history, mut events) = MemoryHistory::new();
        history.replace_state(json!(0));
        history.push_state(json!(1));
        history.push_state(json!(2));
        history.go(-2);
        history.forward();
        assert_eq!(events.try_recv().unwrap().state, Some(json!(0)));
        assert_eq!(events.try_recv().unwrap().state, Some(json!(1)));
        assert_eq!(history.position(), 1);
    }
}
