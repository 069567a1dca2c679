use crate::identity::ItemId;
use crate::stack::{HookSet, LeaveBeforeHook, ProgressExitHook, StackItem};
use futures::future::LocalBoxFuture;

/// Result of mounting a page: the view layer's handle plus the hooks the
/// page declares.
pub struct Mounted<C> {
    pub container: C,
    pub hooks: HookSet,
}

impl<C> Mounted<C> {
    pub fn new(container: C) -> Self {
        Mounted {
            container,
            hooks: HookSet::default(),
        }
    }

    pub fn with_hooks(container: C, hooks: HookSet) -> Self {
        Mounted { container, hooks }
    }
}

/// The seam a UI framework plugs into the engine through.
///
/// The engine never looks inside a container. Hook lookups go through the
/// adapter so a framework can keep hooks in its own component storage; the
/// default implementations use the item's [`HookSet`].
pub trait AdapterPort {
    type Component;
    type Container;

    fn mount(&self, id: ItemId, component: Self::Component) -> Mounted<Self::Container>;

    /// Animates (when `animated`) and destroys the page.
    fn unmount(
        &self,
        item: StackItem<Self::Container>,
        animated: bool,
    ) -> LocalBoxFuture<'static, ()>;

    fn leave_before(&self, item: &StackItem<Self::Container>) -> Option<LeaveBeforeHook> {
        item.hooks().leave_before.clone()
    }

    fn set_leave_before(
        &self,
        item: &mut StackItem<Self::Container>,
        hook: Option<LeaveBeforeHook>,
    ) {
        item.hooks_mut().leave_before = hook;
    }

    fn progress_handler(&self, item: &StackItem<Self::Container>) -> Option<ProgressExitHook> {
        item.hooks().progress_exit.clone()
    }

    fn set_input_enabled(&self, _enabled: bool) {}
}
