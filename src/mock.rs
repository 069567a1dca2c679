use crate::adapter::{AdapterPort, Mounted};
use crate::config::EngineConfig;
use crate::engine::NavigationEngine;
use crate::history::{HostEvents, MemoryHistory};
use crate::identity::ItemId;
use crate::stack::{HookSet, StackItem};
use futures::future::LocalBoxFuture;
use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

/// Shared log of everything the adapter and the page hooks were asked to do.
#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.0.borrow().iter().any(|e| e == entry)
    }

    pub fn mentions(&self, name: &str) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter(|e| e.split(' ').any(|word| word == name))
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Transition and visibility hooks that log under `name` and finish
    /// immediately.
    pub fn hooks(&self, name: &'static str) -> HookSet {
        let enter = self.clone();
        let leave = self.clone();
        let appear = self.clone();
        let disappear = self.clone();
        HookSet::default()
            .with_transition_enter(move |_, done| {
                enter.record(format!("enter {}", name));
                done.finish();
            })
            .with_transition_leave(move |_, done| {
                leave.record(format!("leave {}", name));
                done.finish();
            })
            .with_on_appear(move || appear.record(format!("appear {}", name)))
            .with_on_disappear(move || disappear.record(format!("disappear {}", name)))
    }
}

pub struct TestPage {
    pub name: &'static str,
    pub hooks: HookSet,
}

impl TestPage {
    pub fn new(name: &'static str) -> Self {
        TestPage {
            name,
            hooks: HookSet::default(),
        }
    }

    pub fn with_hooks(name: &'static str, hooks: HookSet) -> Self {
        TestPage { name, hooks }
    }
}

#[derive(Clone, Default)]
pub struct RecordingAdapter {
    pub journal: Journal,
    pub input_toggles: Rc<RefCell<Vec<bool>>>,
}

impl AdapterPort for RecordingAdapter {
    type Component = TestPage;
    type Container = &'static str;

    fn mount(&self, _id: ItemId, component: TestPage) -> Mounted<&'static str> {
        self.journal.record(format!("mount {}", component.name));
        Mounted::with_hooks(component.name, component.hooks)
    }

    fn unmount(
        &self,
        item: StackItem<&'static str>,
        animated: bool,
    ) -> LocalBoxFuture<'static, ()> {
        let how = if animated { "animated" } else { "abrupt" };
        self.journal
            .record(format!("unmount {} {}", item.container(), how));
        Box::pin(async {})
    }

    fn set_input_enabled(&self, enabled: bool) {
        self.input_toggles.borrow_mut().push(enabled);
    }
}

pub type TestEngine = NavigationEngine<RecordingAdapter, MemoryHistory>;

pub fn test_engine(config: EngineConfig) -> (TestEngine, MemoryHistory, HostEvents, Journal) {
    let (history, events) = MemoryHistory::new();
    let adapter = RecordingAdapter::default();
    let journal = adapter.journal.clone();
    let engine = NavigationEngine::new(adapter, history.clone(), config);
    (engine, history, events, journal)
}

/// Runs `body` while the engine consumes host notifications.
pub async fn drive<F: Future>(engine: &TestEngine, events: HostEvents, body: F) -> F::Output {
    tokio::select! {
        biased;
        output = body => output,
        _ = engine.run(events) => panic!("navigation engine stopped before the test finished"),
    }
}

/// Lets the event loop process every queued host notification.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
