//! Drift detection engine: per-vessel episode tracking plus the window
//! trim/emission algorithm. Synchronous state machine — no async here.
//!
//! The engine expects reports of increasing time per vessel; reports for
//! different vessels may interleave, but each identity switch discards all
//! prior window state. One engine instance tracks exactly one vessel at a
//! time — fan-out across vessels needs one engine per identity or an
//! external keyed-routing layer.

use crate::classifier::{is_drift_candidate, ClassifierError};
use crate::config::{ConfigError, DriftConfig};
use crate::model::{DriftCandidate, Mmsi, PositionReport};
use crate::window::{WindowEntry, WindowQueue};

/// Fastest expected reporting cadence for a drifting vessel (mandated by its
/// speed class under the AIS reporting rules).
const MIN_REPORT_INTERVAL_MS: i64 = 10_000;

/// Window capacity: 1.5x the maximum entries one window can hold at the
/// fastest cadence. Hitting this bound forces a reset instead of unbounded
/// growth, which in practice only happens for rubbish identities (e.g. MMSI
/// 0) reporting near-continuously.
fn max_window_entries(window_size_ms: i64) -> usize {
    (window_size_ms * 3 / 2 / MIN_REPORT_INTERVAL_MS).max(1) as usize
}

// ---------------------------------------------------------------------------
// DriftEngine
// ---------------------------------------------------------------------------

/// The per-vessel drift detector.
///
/// Owns the episode state for the currently tracked vessel: the live window,
/// the start of the open drift episode (`drifting_since`), and the start of
/// the current non-drifting run. Processing is single-producer by contract;
/// all state lives in plain fields.
#[derive(Debug)]
pub struct DriftEngine {
    config: DriftConfig,
    max_size: usize,
    current_mmsi: Option<Mmsi>,
    drifting_since_ms: Option<i64>,
    non_drifting_since_ms: Option<i64>,
    window: WindowQueue,
}

impl DriftEngine {
    /// Build an engine from a validated configuration.
    ///
    /// Fails fast on an invalid config; processing itself never raises
    /// configuration errors.
    pub fn new(config: DriftConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let max_size = max_window_entries(config.window_size_ms);
        let window = WindowQueue::new(config.queue_backing, max_size);
        Ok(Self {
            config,
            max_size,
            current_mmsi: None,
            drifting_since_ms: None,
            non_drifting_since_ms: None,
            window,
        })
    }

    /// Ingest one report, returning the drift candidates it surfaces
    /// (oldest first, possibly none).
    ///
    /// An identity change or a full window clears all state before the report
    /// is accepted as the first entry of a fresh window. Within a window,
    /// reports whose timestamp does not advance past the newest entry are
    /// dropped silently — normal behaviour for a noisy feed, not an error.
    ///
    /// Errors only on a classifier contract violation (angles outside
    /// `[0,360)`); sanitize upstream with
    /// [`has_valid_angles`](crate::classifier::has_valid_angles).
    pub fn process(
        &mut self,
        report: PositionReport,
    ) -> Result<Vec<DriftCandidate>, ClassifierError> {
        if self.current_mmsi != Some(report.mmsi) || self.window.len() == self.max_size {
            self.window.clear();
            self.drifting_since_ms = None;
            self.non_drifting_since_ms = None;
            self.current_mmsi = Some(report.mmsi);
        }

        if let Some(newest) = self.window.back() {
            if report.time_ms <= newest.time_ms() {
                return Ok(Vec::new());
            }
        }

        let is_candidate = is_drift_candidate(&report, &self.config)?;
        self.window.push_back(WindowEntry::new(report, is_candidate));
        Ok(self.trim_and_emit())
    }

    /// Recompute episode boundaries over the whole window, emit whatever is
    /// due, drop stale entries, and rebuild the window.
    ///
    /// Full recomputation (rather than an incremental update) keeps episode
    /// semantics correct under the hysteresis rule at O(window) cost per
    /// report; the capacity bound keeps that cheap.
    fn trim_and_emit(&mut self) -> Vec<DriftCandidate> {
        let now = match self.window.back() {
            Some(newest) => newest.time_ms(),
            None => return Vec::new(),
        };
        let len = self.window.len();
        let candidates = self.window.iter().filter(|e| e.is_candidate).count();
        let can_emit = candidates as f64 / len as f64 >= self.config.min_proportion && len > 1;

        let mut out = Vec::new();
        let mut retained: Vec<WindowEntry> = Vec::with_capacity(len);
        // The most recent entry older than the window, kept (unless already
        // retained) so the next recomputation still sees one report
        // immediately preceding the window.
        let mut last_before_window: Option<WindowEntry> = None;
        let mut drifting_since = self.drifting_since_ms;
        let mut non_drifting_since: Option<i64> = None;

        while let Some(mut x) = self.window.pop_front() {
            let age = now - x.time_ms();
            let in_window = age < self.config.window_size_ms;
            let mut emitted_now = false;

            if x.is_candidate {
                let reopen = match (drifting_since, non_drifting_since) {
                    // No open episode yet.
                    (None, _) => true,
                    // Quiet gap too long to absorb into the episode.
                    (Some(_), Some(nds)) => {
                        x.time_ms() - nds > self.config.non_drifting_threshold_ms
                    }
                    (Some(_), None) => false,
                };
                if reopen {
                    drifting_since = Some(x.time_ms());
                }
                non_drifting_since = None;

                if !x.emitted && can_emit {
                    if let Some(since) = drifting_since {
                        out.push(DriftCandidate {
                            report: x.report.clone(),
                            drifting_since_ms: since,
                        });
                        x.emitted = true;
                        emitted_now = true;
                    }
                }
            } else if non_drifting_since.is_none() {
                non_drifting_since = Some(x.time_ms());
            }

            let keep = if emitted_now {
                in_window
            } else {
                // Entries awaiting the proportion gate linger up to the
                // expiry age (disabled when expiry_age_ms == 0).
                in_window || (!can_emit && age < self.config.expiry_age_ms)
            };

            if keep {
                if !in_window {
                    // A retained pre-window entry already provides continuity.
                    last_before_window = None;
                }
                retained.push(x);
            } else if !in_window {
                last_before_window = Some(x);
            }
        }

        if let Some(anchor) = last_before_window {
            self.window.push_back(anchor);
        }
        self.window.extend(retained);

        self.drifting_since_ms = drifting_since;
        self.non_drifting_since_ms = non_drifting_since;
        out
    }

    /// Entries currently buffered.
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Capacity bound of the window buffer.
    pub fn max_window_entries(&self) -> usize {
        self.max_size
    }

    /// The vessel currently tracked, if any report has been accepted.
    pub fn current_mmsi(&self) -> Option<Mmsi> {
        self.current_mmsi
    }

    /// Start of the open drift episode, if one is open.
    pub fn drifting_since_ms(&self) -> Option<i64> {
        self.drifting_since_ms
    }

    /// Start of the current non-drifting run, if one is open.
    pub fn non_drifting_since_ms(&self) -> Option<i64> {
        self.non_drifting_since_ms
    }

    pub fn config(&self) -> &DriftConfig {
        &self.config
    }
}
