//! DriftFeed builder and top-level API.
//!
//! The primary entry point for consuming applications. Use [`DriftFeedBuilder`]
//! to configure the detector, then call [`build()`](DriftFeedBuilder::build)
//! to start the feed. Producers push decoded position reports through the
//! returned [`ReportHandle`]; the [`DriftFeed`] handle yields drift candidates
//! and controls shutdown.
//!
//! The feed owns the serialization contract the engine requires: reports flow
//! through one mpsc channel into a single engine task, so concurrent
//! producers are merged upstream of the detector.

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::classifier::has_valid_angles;
use crate::config::{ConfigError, DriftConfig};
use crate::engine::DriftEngine;
use crate::metrics::MetricsHandle;
use crate::model::{DriftEvent, PositionReport, UpstreamError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from building a [`DriftFeed`].
#[derive(Debug, thiserror::Error)]
pub enum DriftFeedError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// The feed has shut down and no longer accepts input.
#[derive(Debug, thiserror::Error)]
#[error("drift feed closed")]
pub struct FeedClosed;

// ---------------------------------------------------------------------------
// Producer side
// ---------------------------------------------------------------------------

/// Messages sent from the producer into the engine task.
#[derive(Debug)]
pub enum FeedMessage {
    /// A decoded position report, ordered per vessel.
    Report(PositionReport),
    /// A producer failure; forwarded verbatim and terminates the feed.
    Error(String),
}

/// Producer handle for pushing reports into the feed.
///
/// Cloneable; dropping every clone completes the stream, after which the
/// feed drains and closes its event channel. Reports must arrive in the
/// order the engine should observe them — clones do not serialize producers
/// for you.
#[derive(Debug, Clone)]
pub struct ReportHandle {
    tx: mpsc::Sender<FeedMessage>,
}

impl ReportHandle {
    /// Push one report. Errors if the feed has shut down.
    pub async fn send(&self, report: PositionReport) -> Result<(), FeedClosed> {
        self.tx
            .send(FeedMessage::Report(report))
            .await
            .map_err(|_| FeedClosed)
    }

    /// Signal an upstream failure, terminating the feed after delivery.
    pub async fn fail(&self, message: impl Into<String>) -> Result<(), FeedClosed> {
        self.tx
            .send(FeedMessage::Error(message.into()))
            .await
            .map_err(|_| FeedClosed)
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`DriftFeed`] instance.
///
/// All options have defaults; `build()` validates the config and spawns the
/// engine task.
pub struct DriftFeedBuilder {
    config: DriftConfig,
    report_channel_capacity: usize,
    event_channel_capacity: usize,
}

impl Default for DriftFeedBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DriftFeedBuilder {
    pub fn new() -> Self {
        Self {
            config: DriftConfig::default(),
            report_channel_capacity: 256,
            event_channel_capacity: 256,
        }
    }

    /// Set the detection thresholds. Validated at build time.
    pub fn config(mut self, config: DriftConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the capacity of the producer-to-engine channel.
    pub fn report_channel_capacity(mut self, cap: usize) -> Self {
        self.report_channel_capacity = cap;
        self
    }

    /// Set the capacity of the engine-to-consumer channel.
    pub fn event_channel_capacity(mut self, cap: usize) -> Self {
        self.event_channel_capacity = cap;
        self
    }

    /// Build and start the feed.
    ///
    /// Fails fast on an invalid configuration; a running feed never raises
    /// config errors.
    pub fn build(self) -> Result<(DriftFeed, ReportHandle), DriftFeedError> {
        let engine = DriftEngine::new(self.config)?;
        let shutdown = CancellationToken::new();
        let metrics = MetricsHandle::new();

        let (report_tx, report_rx) = mpsc::channel(self.report_channel_capacity);
        let (event_tx, event_rx) = mpsc::channel(self.event_channel_capacity);

        let task_shutdown = shutdown.clone();
        let task_metrics = metrics.clone();
        let engine_handle = tokio::spawn(run_engine_task(
            engine,
            report_rx,
            event_tx,
            task_shutdown,
            task_metrics,
        ));

        let feed = DriftFeed {
            event_rx,
            shutdown,
            metrics,
            _engine_handle: engine_handle,
        };
        Ok((feed, ReportHandle { tx: report_tx }))
    }
}

// ---------------------------------------------------------------------------
// DriftFeed handle
// ---------------------------------------------------------------------------

/// Handle to a running drift feed.
pub struct DriftFeed {
    event_rx: mpsc::Receiver<DriftEvent>,
    shutdown: CancellationToken,
    metrics: MetricsHandle,
    _engine_handle: JoinHandle<()>,
}

impl DriftFeed {
    /// Receive the next event. Returns `None` once the stream has completed
    /// (or errored) and all pending events have been consumed.
    pub async fn next_event(&mut self) -> Option<DriftEvent> {
        self.event_rx.recv().await
    }

    /// Request clean shutdown of the engine task.
    ///
    /// Events already in the channel can still be drained via `next_event()`.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Returns `true` if shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Snapshot of pipeline metrics.
    pub fn metrics(&self) -> MetricsHandle {
        self.metrics.clone()
    }
}

// ---------------------------------------------------------------------------
// Engine task
// ---------------------------------------------------------------------------

async fn run_engine_task(
    mut engine: DriftEngine,
    mut report_rx: mpsc::Receiver<FeedMessage>,
    event_tx: mpsc::Sender<DriftEvent>,
    shutdown: CancellationToken,
    metrics: MetricsHandle,
) {
    // Mirror of the engine's acceptance rule, kept here so drops and resets
    // can be counted without the engine growing an observer interface.
    let mut last_accepted_time: Option<i64> = None;

    loop {
        tokio::select! {
            msg = report_rx.recv() => {
                match msg {
                    Some(FeedMessage::Report(report)) => {
                        metrics.inc_reports_received();

                        if !has_valid_angles(&report) {
                            metrics.inc_reports_dropped_invalid();
                            debug!(mmsi = %report.mmsi, time_ms = report.time_ms,
                                "dropping report with out-of-range angles");
                            continue;
                        }

                        let same_vessel = engine.current_mmsi() == Some(report.mmsi);
                        let resets = !same_vessel
                            || engine.window_len() == engine.max_window_entries();
                        let stale = same_vessel
                            && !resets
                            && last_accepted_time.is_some_and(|t| report.time_ms <= t);

                        if stale {
                            metrics.inc_reports_dropped_stale();
                        } else {
                            last_accepted_time = Some(report.time_ms);
                            if resets {
                                metrics.inc_window_resets();
                            }
                        }

                        match engine.process(report) {
                            Ok(candidates) => {
                                metrics.set_window_size(engine.window_len() as u64);
                                metrics.add_candidates_emitted(candidates.len() as u64);
                                for candidate in candidates {
                                    if event_tx.send(DriftEvent::Candidate(candidate)).await.is_err() {
                                        return;
                                    }
                                }
                            }
                            Err(e) => {
                                // Unreachable given the angle check above.
                                warn!(error = %e, "classifier rejected a sanitized report");
                                metrics.inc_reports_dropped_invalid();
                            }
                        }
                    }
                    Some(FeedMessage::Error(message)) => {
                        debug!(%message, "forwarding upstream error");
                        let _ = event_tx
                            .send(DriftEvent::UpstreamError(UpstreamError {
                                message,
                                timestamp: Utc::now(),
                            }))
                            .await;
                        return;
                    }
                    // Producer completed; closing event_tx completes the feed.
                    None => return,
                }
            }
            _ = shutdown.cancelled() => {
                return;
            }
        }
    }
}
