//! Observability: filter-side counters and the sink boundary.
//!
//! Recording is fire-and-forget and must never affect filtering semantics.

use std::cell::RefCell;

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent {
    /// An access check refused a management or query operation.
    AccessDenied,

    /// One view result passed through the channel filter.
    RowsFiltered { scanned: u64, returned: u64 },

    /// One analytic scan passed through the channel filter.
    AnalyticFiltered { scanned: u64, returned: u64 },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

///
/// Counters
/// Process-local accumulation of filter activity.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Counters {
    pub denials: u64,
    pub rows_scanned: u64,
    pub rows_returned: u64,
    pub analytic_rows_scanned: u64,
    pub analytic_rows_returned: u64,
}

thread_local! {
    static COUNTERS: RefCell<Counters> = RefCell::new(Counters::default());
}

/// GlobalSink
/// Default process-local sink that writes into the counter state.

struct GlobalSink;

impl MetricsSink for GlobalSink {
    fn record(&self, event: MetricsEvent) {
        COUNTERS.with_borrow_mut(|counters| match event {
            MetricsEvent::AccessDenied => {
                counters.denials = counters.denials.saturating_add(1);
            }
            MetricsEvent::RowsFiltered { scanned, returned } => {
                counters.rows_scanned = counters.rows_scanned.saturating_add(scanned);
                counters.rows_returned = counters.rows_returned.saturating_add(returned);
            }
            MetricsEvent::AnalyticFiltered { scanned, returned } => {
                counters.analytic_rows_scanned =
                    counters.analytic_rows_scanned.saturating_add(scanned);
                counters.analytic_rows_returned =
                    counters.analytic_rows_returned.saturating_add(returned);
            }
        });
    }
}

pub(crate) fn record(event: MetricsEvent) {
    GlobalSink.record(event);
}

/// Snapshot the current counters for endpoint/test plumbing.
#[must_use]
pub fn metrics_report() -> Counters {
    COUNTERS.with_borrow(|counters| *counters)
}

/// Reset all counters.
pub fn metrics_reset_all() {
    COUNTERS.with_borrow_mut(|counters| *counters = Counters::default());
}

///
/// TESTS
///
