use crate::identity::ItemId;
use futures::future::LocalBoxFuture;
use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::rc::Rc;
use tokio::sync::oneshot;

/// Answer of a leave-before hook.
pub enum LeaveAnswer {
    Now(bool),
    Later(LocalBoxFuture<'static, bool>),
}

impl LeaveAnswer {
    pub fn later<F>(future: F) -> Self
    where
        F: Future<Output = bool> + 'static,
    {
        LeaveAnswer::Later(Box::pin(future))
    }
}

impl From<bool> for LeaveAnswer {
    fn from(value: bool) -> Self {
        LeaveAnswer::Now(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionContext {
    pub from: Option<ItemId>,
    pub to: Option<ItemId>,
}

/// Completion signal handed to transition hooks. Dropping it counts as done.
pub struct TransitionDone(oneshot::Sender<()>);

impl TransitionDone {
    pub(crate) fn channel() -> (TransitionDone, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (TransitionDone(tx), rx)
    }

    pub fn finish(self) {
        let _ = self.0.send(());
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureProgress {
    pub from: ItemId,
    pub to: ItemId,
    pub progress: f64,
    /// `None` while the gesture is moving, `Some(commit)` once it ended.
    pub finish: Option<bool>,
}

pub type LeaveBeforeHook = Rc<dyn Fn() -> LeaveAnswer>;
pub type TransitionHook = Rc<dyn Fn(TransitionContext, TransitionDone)>;
pub type ProgressExitHook = Rc<dyn Fn(GestureProgress)>;
pub type VisibilityHook = Rc<dyn Fn()>;

#[derive(Clone, Default)]
pub struct HookSet {
    pub leave_before: Option<LeaveBeforeHook>,
    pub transition_enter: Option<TransitionHook>,
    pub transition_leave: Option<TransitionHook>,
    pub progress_exit: Option<ProgressExitHook>,
    pub on_appear: Option<VisibilityHook>,
    pub on_disappear: Option<VisibilityHook>,
    /// A quiet page does not fire appear/disappear on the page beneath it.
    pub is_quiet_page: bool,
    pub page_mate: Option<serde_json::Value>,
}

impl HookSet {
    pub fn with_leave_before<F, A>(mut self, hook: F) -> Self
    where
        F: Fn() -> A + 'static,
        A: Into<LeaveAnswer>,
    {
        self.leave_before = Some(Rc::new(move || hook().into()));
        self
    }

    pub fn with_transition_enter<F>(mut self, hook: F) -> Self
    where
        F: Fn(TransitionContext, TransitionDone) + 'static,
    {
        self.transition_enter = Some(Rc::new(hook));
        self
    }

    pub fn with_transition_leave<F>(mut self, hook: F) -> Self
    where
        F: Fn(TransitionContext, TransitionDone) + 'static,
    {
        self.transition_leave = Some(Rc::new(hook));
        self
    }

    pub fn with_progress_exit<F>(mut self, hook: F) -> Self
    where
        F: Fn(GestureProgress) + 'static,
    {
        self.progress_exit = Some(Rc::new(hook));
        self
    }

    pub fn with_on_appear<F: Fn() + 'static>(mut self, hook: F) -> Self {
        self.on_appear = Some(Rc::new(hook));
        self
    }

    pub fn with_on_disappear<F: Fn() + 'static>(mut self, hook: F) -> Self {
        self.on_disappear = Some(Rc::new(hook));
        self
    }

    pub fn quiet(mut self) -> Self {
        self.is_quiet_page = true;
        self
    }

    pub fn with_page_mate(mut self, page_mate: serde_json::Value) -> Self {
        self.page_mate = Some(page_mate);
        self
    }
}

impl Debug for HookSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookSet")
            .field("leave_before", &self.leave_before.is_some())
            .field("transition_enter", &self.transition_enter.is_some())
            .field("transition_leave", &self.transition_leave.is_some())
            .field("progress_exit", &self.progress_exit.is_some())
            .field("is_quiet_page", &self.is_quiet_page)
            .field("page_mate", &self.page_mate)
            .finish()
    }
}

#[derive(Debug)]
pub struct StackItem<C> {
    id: ItemId,
    container: C,
    hooks: HookSet,
    generation: u64,
}

impl<C> StackItem<C> {
    pub fn new(id: ItemId, container: C, hooks: HookSet) -> Self {
        StackItem {
            id,
            container,
            hooks,
            generation: 0,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    pub fn into_container(self) -> C {
        self.container
    }

    pub fn hooks(&self) -> &HookSet {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut HookSet {
        &mut self.hooks
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Starts a new leave check on this item, invalidating every check
    /// started before.
    pub(crate) fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}

/// Open pages in z-order, the last one is visible.
pub struct StackRegistry<C> {
    items: Vec<StackItem<C>>,
}

impl<C> Default for StackRegistry<C> {
    fn default() -> Self {
        StackRegistry { items: vec![] }
    }
}

impl<C> StackRegistry<C> {
    pub fn push(&mut self, item: StackItem<C>) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn top(&self) -> Option<&StackItem<C>> {
        self.items.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut StackItem<C>> {
        self.items.last_mut()
    }

    pub fn below_top(&self) -> Option<&StackItem<C>> {
        self.items.len().checked_sub(2).map(|i| &self.items[i])
    }

    pub fn get(&self, id: ItemId) -> Option<&StackItem<C>> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut StackItem<C>> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id).collect()
    }

    pub fn containers(&self) -> Vec<C>
    where
        C: Clone,
    {
        self.items.iter().map(|item| item.container.clone()).collect()
    }

    /// Swaps the visible item, returning the one it replaced.
    pub fn replace_top(&mut self, item: StackItem<C>) -> Option<StackItem<C>> {
        let previous = self.items.pop();
        self.items.push(item);
        previous
    }

    /// Removes the `count` topmost items, bottom-most first.
    pub fn pop_top(&mut self, count: usize) -> Vec<StackItem<C>> {
        let at = self.items.len().saturating_sub(count);
        self.items.split_off(at)
    }

    /// Removes the `count` items directly beneath the top, keeping the top.
    pub fn remove_below_top(&mut self, count: usize) -> Vec<StackItem<C>> {
        let Some(top) = self.items.len().checked_sub(1) else {
            return vec![];
        };
        let start = top.saturating_sub(count);
        self.items.drain(start..top).collect()
    }

    pub fn drain(&mut self) -> Vec<StackItem<C>> {
        std::mem::take(&mut self.items)
    }
}
