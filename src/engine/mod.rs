mod black_box;
mod gesture;
mod interceptor;
mod signal;


use crate::adapter::AdapterPort;
use crate::config::EngineConfig;
use crate::error::Error;
use crate::history::{codec, HistoryStateRecord, HostEvents, HostHistory, PopStateEvent};
use crate::identity::{ItemId, OperationId, SessionId};
use crate::stack::{
    HookSet, LeaveBeforeHook, StackItem, StackRegistry, TransitionContext, TransitionDone,
    TransitionHook,
};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use gesture::GestureState;
use interceptor::PendingLeaveCheck;
use log::{debug, error, info};
use signal::OperationSignal;
use std::cell::RefCell;
use std::cmp::Ordering;
use tokio::select;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

pub use gesture::GestureSignal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    /// The host transition settled and the pages were removed.
    Completed,
    /// A leave check vetoed the navigation, went stale or timed out, or the
    /// engine stopped first.
    Cancelled,
    /// There was nothing to go back to.
    Ignored,
}

enum HostWrite {
    Push,
    Replace,
}

enum BackMode {
    Intercepted,
    Approved,
    BlackBox,
}

struct EngineState<C> {
    stack: StackRegistry<C>,
    current: Option<HistoryStateRecord>,
    signal: OperationSignal,
    black_box_armed: bool,
    approved_back: bool,
    skip_leave_transition: bool,
    gesture: GestureState,
    input_suspended: bool,
}

impl<C> Default for EngineState<C> {
    fn default() -> Self {
        EngineState {
            stack: StackRegistry::default(),
            current: None,
            signal: OperationSignal::default(),
            black_box_armed: false,
            approved_back: false,
            skip_leave_transition: false,
            gesture: GestureState::default(),
            input_suspended: false,
        }
    }
}

/// Keeps a stack of pages in lock-step with the host history.
///
/// All methods take `&self`; the engine is meant to live on one
/// single-threaded executor, with [`NavigationEngine::run`] consuming host
/// notifications while the application awaits navigation calls.
pub struct NavigationEngine<A: AdapterPort, H> {
    adapter: A,
    host: H,
    config: EngineConfig,
    session: SessionId,
    state: RefCell<EngineState<A::Container>>,
    shutdown: CancellationToken,
}

impl<A, H> NavigationEngine<A, H>
where
    A: AdapterPort,
    H: HostHistory,
{
    pub fn new(adapter: A, host: H, config: EngineConfig) -> Self {
        let session = SessionId::generate();
        debug!("Starting navigation session {}", session);
        NavigationEngine {
            adapter,
            host,
            config,
            session,
            state: RefCell::new(EngineState::default()),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn len(&self) -> usize {
        self.state.borrow().stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().stack.is_empty()
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        self.state.borrow().stack.ids()
    }

    pub fn containers(&self) -> Vec<A::Container>
    where
        A::Container: Clone,
    {
        self.state.borrow().stack.containers()
    }

    pub fn top_id(&self) -> Option<ItemId> {
        self.state.borrow().stack.top().map(StackItem::id)
    }

    pub fn current_record(&self) -> Option<HistoryStateRecord> {
        self.state.borrow().current
    }

    pub fn is_input_suspended(&self) -> bool {
        self.state.borrow().input_suspended
    }

    pub fn page_mate(&self, id: ItemId) -> Option<serde_json::Value> {
        self.state
            .borrow()
            .stack
            .get(id)
            .and_then(|item| item.hooks().page_mate.clone())
    }

    pub fn update_hooks<F>(&self, id: ItemId, update: F) -> Result<(), Error>
    where
        F: FnOnce(&mut HookSet),
    {
        let mut state = self.state.borrow_mut();
        let item = state.stack.get_mut(id).ok_or(Error::UnknownItem(id))?;
        update(item.hooks_mut());
        Ok(())
    }

    pub fn set_leave_before(&self, id: ItemId, hook: Option<LeaveBeforeHook>) -> Result<(), Error> {
        let mut state = self.state.borrow_mut();
        let item = state.stack.get_mut(id).ok_or(Error::UnknownItem(id))?;
        self.adapter.set_leave_before(item, hook);
        Ok(())
    }

    /// Mounts `component` on top of the stack and resolves once its enter
    /// transition is done.
    pub async fn push(&self, component: A::Component) -> ItemId {
        self.suspend_input();
        let id = ItemId::generate();
        let mounted = self.adapter.mount(id, component);
        let item = StackItem::new(id, mounted.container, mounted.hooks);
        let enter = item.hooks().transition_enter.clone();
        let quiet = item.hooks().is_quiet_page;

        let below = {
            let mut state = self.state.borrow_mut();
            let below = state
                .stack
                .top()
                .map(|top| (top.id(), top.hooks().on_disappear.clone()));
            let record = HistoryStateRecord {
                index: state.stack.len() as i64,
                session: self.session,
            };
            let write = if state.stack.is_empty() {
                HostWrite::Replace
            } else {
                HostWrite::Push
            };
            self.write_host(record, write);
            state.stack.push(item);
            state.current = Some(record);
            state.skip_leave_transition = false;
            below
        };
        info!("Pushed page {} at index {}", id, self.len() - 1);

        let from = below.as_ref().map(|(below_id, _)| *below_id);
        self.run_transition(enter, TransitionContext { from, to: Some(id) }).await;
        if !quiet {
            if let Some((_, Some(disappear))) = below {
                disappear();
            }
        }
        self.resume_input();
        id
    }

    /// Swaps the visible page for `component` without growing the history.
    pub async fn replace(&self, component: A::Component) -> ItemId {
        if self.is_empty() {
            return self.push(component).await;
        }
        self.suspend_input();
        let id = ItemId::generate();
        let mounted = self.adapter.mount(id, component);
        let item = StackItem::new(id, mounted.container, mounted.hooks);
        let enter = item.hooks().transition_enter.clone();

        let replaced = {
            let mut state = self.state.borrow_mut();
            let record = HistoryStateRecord {
                index: state.stack.len() as i64 - 1,
                session: self.session,
            };
            self.write_host(record, HostWrite::Replace);
            let replaced = state.stack.replace_top(item);
            state.current = Some(record);
            state.skip_leave_transition = false;
            replaced
        };
        info!("Replaced top page with {}", id);

        let from = replaced.as_ref().map(StackItem::id);
        self.run_transition(enter, TransitionContext { from, to: Some(id) }).await;
        if let Some(replaced) = replaced {
            self.adapter.unmount(replaced, false).await;
        }
        self.resume_input();
        id
    }

    /// Goes back `n` pages (clamped to the stack) and resolves once the host
    /// transition has been reconciled.
    pub async fn go_back(&self, n: usize) -> BackOutcome {
        match self.request_back(n) {
            Some(resolved) => Self::outcome(resolved).await,
            None => BackOutcome::Ignored,
        }
    }

    /// Stops [`NavigationEngine::run`]. Pending navigations resolve as
    /// cancelled.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Stops the engine and destroys every page without animation.
    pub async fn teardown(&self) {
        self.shutdown();
        let items = {
            let mut state = self.state.borrow_mut();
            state.signal.cancel_all();
            state.current = None;
            state.black_box_armed = false;
            state.approved_back = false;
            state.gesture = GestureState::default();
            state.stack.drain()
        };
        info!("Tearing down {} page(s)", items.len());
        for item in items.into_iter().rev() {
            self.adapter.unmount(item, false).await;
        }
        self.resume_input();
    }

    /// Reconciles host notifications with the stack until the channel closes
    /// or the engine is shut down.
    pub async fn run(&self, mut events: HostEvents) {
        let mut checks: FuturesUnordered<PendingLeaveCheck> = FuturesUnordered::new();
        loop {
            select! {
                _ = self.shutdown.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => {
                        if let Some(check) = self.on_pop_state(event).await {
                            checks.push(check);
                        }
                    }
                    None => break,
                },
                Some(verdict) = checks.next(), if !checks.is_empty() => {
                    self.settle_leave_check(verdict);
                }
            }
        }
        self.state.borrow_mut().signal.cancel_all();
        debug!("Navigation engine for session {} stopped", self.session);
    }

    async fn on_pop_state(&self, event: PopStateEvent) -> Option<PendingLeaveCheck> {
        let landed = match codec::decode_for_session(event.state.as_ref(), self.session) {
            Ok(record) => record,
            Err(e) => {
                debug!("Ignoring history notification: {}", e);
                return None;
            }
        };
        let Some(current) = self.current_record() else {
            debug!("Ignoring history notification, no page was pushed yet");
            return None;
        };
        let delta = landed.index - current.index;
        match delta.cmp(&0) {
            Ordering::Equal => {
                debug!("Ignoring duplicate history notification for index {}", landed.index);
                None
            }
            Ordering::Greater => {
                debug!("Host moved forward by {}, going back to index {}", delta, current.index);
                self.host.go(-delta);
                None
            }
            Ordering::Less => self.on_back(landed, delta.unsigned_abs() as usize).await,
        }
    }

    async fn on_back(&self, landed: HistoryStateRecord, count: usize) -> Option<PendingLeaveCheck> {
        let (count, op, mode) = {
            let mut state = self.state.borrow_mut();
            let count = count.min(state.stack.len().saturating_sub(1));
            let op = state.signal.take_next();
            let mode = if std::mem::take(&mut state.black_box_armed) {
                BackMode::BlackBox
            } else if std::mem::take(&mut state.approved_back) {
                BackMode::Approved
            } else {
                BackMode::Intercepted
            };
            (count, op, mode)
        };
        if count == 0 {
            debug!("Ignoring back notification, only the root page is open");
            if let Some(op) = op {
                self.state.borrow_mut().signal.cancel(op);
            }
            return None;
        }
        match mode {
            BackMode::BlackBox => {
                self.remove_black_box(landed, count, op).await;
                None
            }
            BackMode::Approved => {
                self.commit_back(landed, count, op).await;
                None
            }
            BackMode::Intercepted => self.intercept(landed, count, op).await,
        }
    }

    /// Removes the `count` topmost pages after the host already moved back
    /// to `landed`.
    async fn commit_back(
        &self,
        landed: HistoryStateRecord,
        count: usize,
        op: Option<OperationId>,
    ) {
        let (mut removed, new_top, skip_transition) = {
            let mut state = self.state.borrow_mut();
            let removed = state.stack.pop_top(count);
            state.current = Self::landed_record(&state.stack, landed);
            let new_top = state
                .stack
                .top()
                .map(|top| (top.id(), top.hooks().on_appear.clone()));
            let skip_transition = std::mem::take(&mut state.skip_leave_transition);
            (removed, new_top, skip_transition)
        };
        info!("Went back {} page(s), {} remain", removed.len(), self.len());

        let departing = removed.pop();
        for item in removed {
            self.adapter.unmount(item, false).await;
        }
        if let Some(item) = departing {
            let quiet = item.hooks().is_quiet_page;
            if !skip_transition {
                let context = TransitionContext {
                    from: Some(item.id()),
                    to: new_top.as_ref().map(|(id, _)| *id),
                };
                self.run_transition(item.hooks().transition_leave.clone(), context)
                    .await;
            }
            self.adapter.unmount(item, !skip_transition).await;
            if !quiet {
                if let Some((_, Some(appear))) = new_top {
                    appear();
                }
            }
        }

        self.state.borrow_mut().signal.apply_back_hook(op);
        self.resume_input();
    }

    /// How far a back of `n` pages can actually go: bounded by the pages
    /// beneath the top and by the engine's entries behind the host position,
    /// which may already have moved for notifications not processed yet.
    fn back_count(&self, n: usize) -> usize {
        let pages = self.len().saturating_sub(1);
        let entries = match codec::decode_for_session(self.host.state().as_ref(), self.session) {
            Ok(record) => usize::try_from(record.index).unwrap_or(0),
            Err(e) => {
                debug!("Host entry cannot be gone back from: {}", e);
                0
            }
        };
        n.min(pages).min(entries)
    }

    fn request_back(&self, n: usize) -> Option<oneshot::Receiver<()>> {
        let count = self.back_count(n);
        if count == 0 {
            debug!("Ignoring back request, nothing to go back to");
            return None;
        }
        let resolved = {
            let mut state = self.state.borrow_mut();
            let (op, resolved) = state.signal.set_back_hook();
            debug!("Operation {} requests going back {} page(s)", op, count);
            resolved
        };
        self.suspend_input();
        self.host.go(-(count as i64));
        Some(resolved)
    }

    async fn outcome(resolved: oneshot::Receiver<()>) -> BackOutcome {
        match resolved.await {
            Ok(()) => BackOutcome::Completed,
            Err(_) => BackOutcome::Cancelled,
        }
    }

    async fn run_transition(&self, hook: Option<TransitionHook>, context: TransitionContext) {
        if let Some(hook) = hook {
            let (done, finished) = TransitionDone::channel();
            hook(context, done);
            let _ = finished.await;
        }
    }

    /// The record to track once the host settled on `landed`, nothing when
    /// no page is left to match it against.
    fn landed_record(
        stack: &StackRegistry<A::Container>,
        landed: HistoryStateRecord,
    ) -> Option<HistoryStateRecord> {
        if stack.is_empty() {
            None
        } else {
            Some(landed)
        }
    }

    fn write_host(&self, record: HistoryStateRecord, write: HostWrite) {
        match codec::encode(&record) {
            Ok(state) => match write {
                HostWrite::Push => self.host.push_state(state),
                HostWrite::Replace => self.host.replace_state(state),
            },
            Err(e) => error!("Failed to encode history state {:?}: {}", record, e),
        }
    }

    fn suspend_input(&self) {
        if !self.config.gate_input {
            return;
        }
        let was_suspended = std::mem::replace(&mut self.state.borrow_mut().input_suspended, true);
        if !was_suspended {
            self.adapter.set_input_enabled(false);
        }
    }

    fn resume_input(&self) {
        if !self.config.gate_input {
            return;
        }
        let was_suspended = std::mem::replace(&mut self.state.borrow_mut().input_suspended, false);
        if was_suspended {
            self.adapter.set_input_enabled(true);
        }
    }
}
