use anyhow::Context;
use flexi_logger::Logger;
use futures::future::LocalBoxFuture;
use log::info;
use pagestack::{
    AdapterPort, BackOutcome, EngineConfig, GestureSignal, HookSet, ItemId, LeaveAnswer,
    MemoryHistory, Mounted, NavigationEngine, StackItem,
};
use std::env;
use std::time::Duration;

/// Renders pages as log lines.
struct ConsoleAdapter;

impl AdapterPort for ConsoleAdapter {
    type Component = (&'static str, HookSet);
    type Container = &'static str;

    fn mount(&self, id: ItemId, (title, hooks): Self::Component) -> Mounted<&'static str> {
        info!("mount {} ({})", title, id);
        Mounted::with_hooks(title, hooks)
    }

    fn unmount(
        &self,
        item: StackItem<&'static str>,
        animated: bool,
    ) -> LocalBoxFuture<'static, ()> {
        let title = *item.container();
        Box::pin(async move {
            if animated {
                tokio::time::sleep(Duration::from_millis(150)).await;
            }
            info!("unmount {}", title);
        })
    }

    fn set_input_enabled(&self, enabled: bool) {
        info!("input {}", if enabled { "enabled" } else { "disabled" });
    }
}

type DemoEngine = NavigationEngine<ConsoleAdapter, MemoryHistory>;

fn page(title: &'static str) -> (&'static str, HookSet) {
    (title, HookSet::default())
}

fn show(engine: &DemoEngine, history: &MemoryHistory) {
    println!(
        "stack {:?}, host entry {} of {}",
        engine.containers(),
        history.position() + 1,
        history.len()
    );
}

async fn script(engine: &DemoEngine, history: &MemoryHistory) {
    engine.push(page("home")).await;
    engine.push(page("inbox")).await;
    let draft = HookSet::default().with_leave_before(|| {
        LeaveAnswer::later(async {
            tokio::time::sleep(Duration::from_millis(300)).await;
            info!("draft discarded");
            true
        })
    });
    engine.push(("compose", draft)).await;
    show(engine, history);

    history.back();
    tokio::time::sleep(Duration::from_millis(600)).await;
    show(engine, history);

    for step in ["signup-1", "signup-2", "welcome"] {
        engine.push(page(step)).await;
    }
    show(engine, history);
    let outcome = engine.black_box_back(2).await;
    println!("black-box back: {:?}", outcome);
    show(engine, history);

    engine.on_gesture(GestureSignal::Began);
    for progress in [0.25, 0.5, 0.75] {
        engine.on_gesture(GestureSignal::Changed(progress));
    }
    engine.on_gesture(GestureSignal::Ended { is_finish: true });
    if engine.go_back(1).await == BackOutcome::Completed {
        show(engine, history);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _logger = Logger::try_with_env_or_str("info")
        .context("Invalid log specification")?
        .start()
        .context("Failed to start logger")?;

    let config = match env::args().nth(1) {
        Some(path) => EngineConfig::from_json_file(&path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => EngineConfig::default(),
    };

    let (history, events) = MemoryHistory::new();
    let engine = NavigationEngine::new(ConsoleAdapter, history.clone(), config);
    tokio::select! {
        _ = engine.run(events) => {}
        _ = script(&engine, &history) => {}
    }
    engine.teardown().await;
    Ok(())
}
