use super::NavigationEngine;
use crate::adapter::AdapterPort;
use crate::history::HostHistory;
use crate::identity::ItemId;
use crate::stack::GestureProgress;
use log::debug;

/// Signals of an edge-swipe recognizer, delivered in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureSignal {
    Began,
    /// Progress of the swipe, `0.0..=1.0`.
    Changed(f64),
    Ended { is_finish: bool },
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(super) enum GestureState {
    #[default]
    Idle,
    Tracking {
        from: ItemId,
        to: ItemId,
    },
    /// The top page guards leaving, the swipe was turned into a regular back.
    Abandoned,
}

impl<A, H> NavigationEngine<A, H>
where
    A: AdapterPort,
    H: HostHistory,
{
    /// Routes one gesture signal. Pages without a leave-before hook track the
    /// swipe through their progress-exit hook; once the swipe ends with
    /// `is_finish`, the page calls [`NavigationEngine::go_back`] itself after
    /// its settle animation and the departing transition is skipped.
    pub fn on_gesture(&self, signal: GestureSignal) {
        let looked_up = {
            let state = self.state.borrow();
            match (state.stack.top(), state.stack.below_top()) {
                (Some(top), Some(below)) => Some((
                    top.id(),
                    below.id(),
                    self.adapter.leave_before(top).is_some(),
                    self.adapter.progress_handler(top),
                )),
                _ => None,
            }
        };
        let Some((top, below, guarded, progress_exit)) = looked_up else {
            debug!("Ignoring {:?}, nothing to go back to", signal);
            if let GestureSignal::Ended { .. } = signal {
                self.reset_gesture();
            }
            return;
        };

        let gesture = self.state.borrow().gesture;
        match (signal, gesture) {
            (GestureSignal::Began, _) => {
                self.suspend_input();
                if guarded {
                    self.abandon_gesture(top);
                } else {
                    self.state.borrow_mut().gesture =
                        GestureState::Tracking { from: top, to: below };
                }
            }
            (GestureSignal::Changed(progress), GestureState::Tracking { from, to }) => {
                if guarded {
                    self.abandon_gesture(top);
                } else if let Some(progress_exit) = progress_exit {
                    progress_exit(GestureProgress {
                        from,
                        to,
                        progress: progress.clamp(0.0, 1.0),
                        finish: None,
                    });
                }
            }
            (GestureSignal::Ended { is_finish }, GestureState::Tracking { from, to }) => {
                if guarded {
                    self.abandon_gesture(top);
                    self.state.borrow_mut().gesture = GestureState::Idle;
                    return;
                }
                self.state.borrow_mut().skip_leave_transition = is_finish;
                self.reset_gesture();
                if let Some(progress_exit) = progress_exit {
                    progress_exit(GestureProgress {
                        from,
                        to,
                        progress: 0.0,
                        finish: Some(is_finish),
                    });
                }
            }
            (GestureSignal::Ended { .. }, GestureState::Abandoned) => {
                self.state.borrow_mut().gesture = GestureState::Idle;
            }
            (signal, gesture) => debug!("Ignoring {:?} while gesture is {:?}", signal, gesture),
        }
    }

    fn abandon_gesture(&self, top: ItemId) {
        debug!("Page {} guards leaving, turning the swipe into a back", top);
        self.state.borrow_mut().gesture = GestureState::Abandoned;
        let _ = self.request_back(1);
    }

    fn reset_gesture(&self) {
        let was_tracking = {
            let mut state = self.state.borrow_mut();
            let was_tracking = matches!(state.gesture, GestureState::Tracking { .. });
            state.gesture = GestureState::Idle;
            was_tracking
        };
        if was_tracking {
            self.resume_input();
        }
    }
}
