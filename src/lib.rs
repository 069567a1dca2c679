//! A page stack kept in lock-step with a host back/forward history.
//!
//! The [`NavigationEngine`] owns the stack of open pages, writes one host
//! history entry per page and reconciles every host back/forward
//! notification against the stack. Pages can veto leaving (synchronously or
//! asynchronously), be dropped silently from beneath the visible page, and be
//! swiped away with an edge gesture. Rendering is left to an [`AdapterPort`]
//! implementation.

pub mod adapter;
pub mod config;
pub mod engine;
mod error;
pub mod history;
pub mod identity;
pub mod stack;

#[cfg(test)]
mod mock;

pub use adapter::{AdapterPort, Mounted};
pub use config::EngineConfig;
pub use engine::{BackOutcome, GestureSignal, NavigationEngine};
pub use error::Error;
pub use history::{HistoryStateRecord, HostHistory, MemoryHistory, PopStateEvent};
pub use identity::{ItemId, OperationId, SessionId};
pub use stack::{
    GestureProgress, HookSet, LeaveAnswer, StackItem, TransitionContext, TransitionDone,
};
