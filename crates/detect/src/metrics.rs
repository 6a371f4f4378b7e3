// Metrics hooks for the `detect` crate.
//
// Callers install a global `DetectMetrics` implementation via
// [`set_detect_metrics`], then `DetectService` will report per-analysis
// latency and match counts for each call to `analyze`. This keeps
// instrumentation decoupled from any specific metrics backend.
use std::sync::{Arc, RwLock};
use std::time::Duration;

use once_cell::sync::OnceCell;

/// Metrics observer for analysis operations.
pub trait DetectMetrics: Send + Sync {
    /// Record the outcome of one analysis.
    ///
    /// `item_id` is the analyzed item, `latency` is the wall-clock duration
    /// of the full analysis, `exact_count` and `similar_count` are the match
    /// totals reported to the caller, and `degraded` is true when a storage
    /// failure forced a partial report.
    fn record_analyze(
        &self,
        item_id: &str,
        latency: Duration,
        exact_count: usize,
        similar_count: usize,
        degraded: bool,
    );
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn DetectMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn DetectMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn DetectMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global detect metrics recorder.
///
/// This is typically called once during service startup so all
/// `DetectService` instances share the same metrics backend.
pub fn set_detect_metrics(recorder: Option<Arc<dyn DetectMetrics>>) {
    let lock = metrics_lock();
    let mut guard = lock.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}
