//! Pure drift-candidate classification.
//!
//! A report is a drift candidate when its course, heading and speed are all
//! present, its navigational status does not explain the movement (anchored
//! or moored), the circular course/heading difference falls inside the
//! configured band, and the speed falls inside the configured drifting range.

use crate::config::DriftConfig;
use crate::model::{NavigationalStatus, PositionReport};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Contract violations in classifier inputs.
///
/// Angles outside `[0,360)` are a programming error, not a data-quality
/// condition — upstream code must sanitize reports before classification
/// (the feed shell does this via [`has_valid_angles`]).
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("angle out of range [0,360): {0}")]
    AngleOutOfRange(f64),
}

// ---------------------------------------------------------------------------
// Angular difference
// ---------------------------------------------------------------------------

/// Circular difference between two angles in degrees.
///
/// Both inputs must lie in `[0,360)`; the result lies in `[0,180]` and is
/// symmetric in its arguments.
pub fn angular_difference(a: f64, b: f64) -> Result<f64, ClassifierError> {
    if !(0.0..360.0).contains(&a) {
        return Err(ClassifierError::AngleOutOfRange(a));
    }
    if !(0.0..360.0).contains(&b) {
        return Err(ClassifierError::AngleOutOfRange(b));
    }
    let raw = if a < b { a + 360.0 - b } else { a - b };
    if raw > 180.0 {
        Ok(360.0 - raw)
    } else {
        Ok(raw)
    }
}

// ---------------------------------------------------------------------------
// Candidate predicate
// ---------------------------------------------------------------------------

/// Returns `true` iff the report matches the drifting signature.
///
/// Pure — no side effects, safe to call repeatedly on the same report.
pub fn is_drift_candidate(
    report: &PositionReport,
    config: &DriftConfig,
) -> Result<bool, ClassifierError> {
    let (Some(cog), Some(heading), Some(speed)) = (
        report.course_over_ground_deg,
        report.heading_deg,
        report.speed_over_ground_knots,
    ) else {
        return Ok(false);
    };

    if matches!(
        report.navigational_status,
        Some(NavigationalStatus::AtAnchor) | Some(NavigationalStatus::Moored)
    ) {
        return Ok(false);
    }

    let diff = angular_difference(cog, heading)?;
    Ok(diff >= config.min_heading_cog_difference
        && diff <= config.max_heading_cog_difference
        && speed > config.min_drifting_speed_knots
        && speed <= config.max_drifting_speed_knots)
}

/// Whether the report's angle fields, where present, lie in `[0,360)`.
///
/// The feed shell drops reports failing this check before they reach the
/// classifier, honouring its input contract.
pub fn has_valid_angles(report: &PositionReport) -> bool {
    let ok = |v: Option<f64>| v.map_or(true, |a| (0.0..360.0).contains(&a));
    ok(report.course_over_ground_deg) && ok(report.heading_deg)
}
