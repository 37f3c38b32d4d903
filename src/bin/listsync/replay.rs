use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};

use listsync::{
    fetcher::MemoryPageFetcher, ContinuationToken, Identified, ListView, LoadCoordinator,
    RefreshEvent, RefreshTriggerRouter, SyncConfig,
};

use crate::{args::CliArgs, fixture::Fixture};

struct LoggingView;

impl ListView for LoggingView {
    fn scroll_to_top(&self) {
        log::info!("Scrolled to top");
    }
}

/// One output line: what happened and where the list settled.
#[derive(Serialize)]
struct Transition<'a> {
    event: &'a RefreshEvent,
    action: String,
    ids: Vec<i64>,
    has_more: bool,
    show_trailing_gap: bool,
    next_token: Option<&'a ContinuationToken>,
    total_hint: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<String>,
}

pub async fn run<T>(fixture: Fixture, config: &SyncConfig, args: &CliArgs) -> anyhow::Result<()>
where
    T: Identified<Id = i64> + DeserializeOwned + Clone + Send + Sync + 'static,
{
    let query = fixture.query(config)?;
    let mut source = MemoryPageFetcher::new(fixture.items::<T>()?);
    if args.latency_ms > 0 {
        source = source.with_latency(Duration::from_millis(args.latency_ms));
    }
    let coordinator: LoadCoordinator<T> =
        LoadCoordinator::with_config(query, Arc::new(source), config);
    let router = RefreshTriggerRouter::new(coordinator.clone(), Arc::new(LoggingView))
        .load_more_automatically(config.load_more_automatically);
    let mut failures = coordinator.failures();

    for event in fixture.script(args.pages) {
        let action = router.dispatch(&event);
        let state = coordinator.wait_idle().await;
        let transition = Transition {
            event: &event,
            action: format!("{action:?}"),
            ids: state.items().iter().map(Identified::id).collect(),
            has_more: state.has_more(),
            show_trailing_gap: state.show_trailing_gap(),
            next_token: state.next_token(),
            total_hint: state.total_hint(),
            failure: failures.try_recv().ok().map(|err| err.to_string()),
        };
        let mut out = io::stdout().lock();
        serde_json::to_writer(&mut out, &transition)?;
        writeln!(out)?;
    }
    Ok(())
}
