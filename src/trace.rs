// Status and telemetry side channel - best-effort, never load-bearing

use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavPhase {
    Requested,
    Redirected,
    SnapshotHit,
    Enumerated,
    Bound,
    Cancelled,
    Failed,
    Retried,
}

#[derive(Clone, Debug)]
pub struct TraceEvent {
    pub nav_id: u64,
    pub phase: NavPhase,
    pub elapsed: Duration,
    pub item_count: usize,
}

pub trait StatusSink {
    /// Human-readable status line (errors, redirects, progress).
    fn status(&mut self, message: &str);

    /// Window title / breadcrumb text, pushed eagerly before content loads.
    fn title(&mut self, _text: &str) {}

    fn trace(&mut self, event: TraceEvent) {
        log::debug!(
            "nav={} phase={:?} elapsed={:?} items={}",
            event.nav_id,
            event.phase,
            event.elapsed,
            event.item_count
        );
    }
}

/// Sink that forwards everything to the log facade.
#[derive(Default)]
pub struct LogSink;

impl StatusSink for LogSink {
    fn status(&mut self, message: &str) {
        log::info!("{}", message);
    }
}
