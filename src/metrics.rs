//! Runtime metrics for the drift feed pipeline.
//!
//! [`DriftFeedMetrics`] provides a snapshot of counters and gauges that track
//! pipeline health: reports received, dropped (stale or malformed), window
//! resets, candidates emitted, and the current window size.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared metrics handle, cheaply cloneable.
///
/// All counters use relaxed atomic operations — exact consistency is not
/// required for metrics.
#[derive(Debug, Clone)]
pub struct MetricsHandle {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    reports_received: AtomicU64,
    reports_dropped_stale: AtomicU64,
    reports_dropped_invalid: AtomicU64,
    window_resets: AtomicU64,
    candidates_emitted: AtomicU64,
    window_size: AtomicU64,
}

/// A point-in-time snapshot of pipeline metrics.
#[derive(Debug, Clone)]
pub struct DriftFeedMetrics {
    /// Total position reports received from the producer.
    pub reports_received: u64,
    /// Reports dropped for stale or duplicate timestamps.
    pub reports_dropped_stale: u64,
    /// Reports dropped for malformed angle fields before classification.
    pub reports_dropped_invalid: u64,
    /// Window resets from identity switches or capacity overruns.
    pub window_resets: u64,
    /// Total drift candidates emitted to the consumer.
    pub candidates_emitted: u64,
    /// Current number of entries in the live window.
    pub window_size: u64,
}

impl MetricsHandle {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    pub fn inc_reports_received(&self) {
        self.inner.reports_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_reports_dropped_stale(&self) {
        self.inner.reports_dropped_stale.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_reports_dropped_invalid(&self) {
        self.inner.reports_dropped_invalid.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_window_resets(&self) {
        self.inner.window_resets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_candidates_emitted(&self, n: u64) {
        self.inner.candidates_emitted.fetch_add(n, Ordering::Relaxed);
    }

    pub fn set_window_size(&self, size: u64) {
        self.inner.window_size.store(size, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot of all metrics.
    pub fn snapshot(&self) -> DriftFeedMetrics {
        DriftFeedMetrics {
            reports_received: self.inner.reports_received.load(Ordering::Relaxed),
            reports_dropped_stale: self.inner.reports_dropped_stale.load(Ordering::Relaxed),
            reports_dropped_invalid: self.inner.reports_dropped_invalid.load(Ordering::Relaxed),
            window_resets: self.inner.window_resets.load(Ordering::Relaxed),
            candidates_emitted: self.inner.candidates_emitted.load(Ordering::Relaxed),
            window_size: self.inner.window_size.load(Ordering::Relaxed),
        }
    }
}

impl Default for MetricsHandle {
    fn default() -> Self {
        Self::new()
    }
}
