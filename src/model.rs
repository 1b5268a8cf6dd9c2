//! Core data types: position reports, drift candidates, and feed events.

use chrono::{DateTime, Utc};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Maritime Mobile Service Identity — the per-vessel stream key.
///
/// Kept as a plain integer; malformed identities (e.g. 0) are tolerated and
/// simply behave as their own stream key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mmsi(pub u64);

impl std::fmt::Display for Mmsi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// NavigationalStatus — AIS status codes 0..=15
// ---------------------------------------------------------------------------

/// AIS navigational status as reported by the vessel.
///
/// Only [`AtAnchor`](NavigationalStatus::AtAnchor) and
/// [`Moored`](NavigationalStatus::Moored) affect drift classification; the
/// full enumeration is kept so upstream decoders can pass status through
/// without loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NavigationalStatus {
    UnderWayUsingEngine,
    AtAnchor,
    NotUnderCommand,
    RestrictedManoeuvrability,
    ConstrainedByDraught,
    Moored,
    Aground,
    EngagedInFishing,
    UnderWaySailing,
    ReservedHsc,
    ReservedWig,
    PowerDrivenTowingAstern,
    PowerDrivenPushingAhead,
    ReservedFutureUse,
    AisSart,
    NotDefined,
}

impl NavigationalStatus {
    /// Decode a raw AIS status code (0..=15). Out-of-range codes map to
    /// [`NotDefined`](NavigationalStatus::NotDefined).
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::UnderWayUsingEngine,
            1 => Self::AtAnchor,
            2 => Self::NotUnderCommand,
            3 => Self::RestrictedManoeuvrability,
            4 => Self::ConstrainedByDraught,
            5 => Self::Moored,
            6 => Self::Aground,
            7 => Self::EngagedInFishing,
            8 => Self::UnderWaySailing,
            9 => Self::ReservedHsc,
            10 => Self::ReservedWig,
            11 => Self::PowerDrivenTowingAstern,
            12 => Self::PowerDrivenPushingAhead,
            13 => Self::ReservedFutureUse,
            14 => Self::AisSart,
            _ => Self::NotDefined,
        }
    }
}

// ---------------------------------------------------------------------------
// PositionReport — input to the engine
// ---------------------------------------------------------------------------

/// One decoded AIS position fix.
///
/// Timestamps are epoch milliseconds and must be monotonically non-decreasing
/// within one vessel's sub-stream; the engine drops violations rather than
/// erroring. Sensor fields the transponder did not populate are `None`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionReport {
    pub mmsi: Mmsi,
    pub time_ms: i64,
    pub lat: f64,
    pub lon: f64,
    pub course_over_ground_deg: Option<f64>,
    pub heading_deg: Option<f64>,
    pub speed_over_ground_knots: Option<f64>,
    pub navigational_status: Option<NavigationalStatus>,
}

// ---------------------------------------------------------------------------
// DriftCandidate — the engine's output
// ---------------------------------------------------------------------------

/// A position report classified as drifting, tagged with the start of the
/// episode it belongs to.
///
/// Each underlying report is surfaced at most once, in non-decreasing
/// `report.time_ms` order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DriftCandidate {
    pub report: PositionReport,
    /// Start of the current uninterrupted-enough drift episode (epoch ms).
    pub drifting_since_ms: i64,
}

// ---------------------------------------------------------------------------
// Feed events
// ---------------------------------------------------------------------------

/// Top-level event emitted to the consuming application.
#[derive(Debug, Clone)]
pub enum DriftEvent {
    Candidate(DriftCandidate),
    /// A producer failure, forwarded verbatim. Terminates the feed.
    UpstreamError(UpstreamError),
}

/// A failure signalled by the report producer.
#[derive(Debug, Clone)]
pub struct UpstreamError {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}
