//! Drift detection thresholds.
//!
//! [`DriftConfig`] is an immutable, validated bundle consumed by the
//! classifier and the window trim algorithm. Construction is the only place
//! validation happens — a config accepted by [`validate()`](DriftConfig::validate)
//! never fails mid-stream.

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from validating a [`DriftConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("heading/COG difference bounds must lie in [0,360): {0}..{1}")]
    HeadingDifferenceOutOfRange(f64, f64),
    #[error("min heading/COG difference exceeds max: {0} > {1}")]
    HeadingDifferenceReversed(f64, f64),
    #[error("drifting speed bounds invalid: {0}..{1} kn")]
    SpeedBoundsInvalid(f64, f64),
    #[error("window size must be > 0 ms")]
    WindowSizeZero,
    #[error("expiry age ({0} ms) must be 0 or exceed the window size ({1} ms)")]
    ExpiryAgeTooSmall(i64, i64),
    #[error("min proportion must lie in [0,1]: {0}")]
    ProportionOutOfRange(f64),
    #[error("non-drifting threshold must be >= 0 ms")]
    NonDriftingThresholdNegative,
}

// ---------------------------------------------------------------------------
// Queue backing
// ---------------------------------------------------------------------------

/// Which store backs the per-vessel window buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QueueBacking {
    /// Growable deque; lowest memory footprint at rest.
    Growable,
    /// Pre-sized ring buffer; allocation-free in steady state.
    FixedCapacity,
}

impl Default for QueueBacking {
    fn default() -> Self {
        Self::Growable
    }
}

// ---------------------------------------------------------------------------
// DriftConfig
// ---------------------------------------------------------------------------

/// Thresholds for drift classification and window trimming.
///
/// Angular bounds are in degrees, speeds in knots, durations in epoch
/// milliseconds. A report is a drift candidate when the circular difference
/// between its course and heading lies in
/// `[min_heading_cog_difference, max_heading_cog_difference]` and its speed
/// lies in `(min_drifting_speed_knots, max_drifting_speed_knots]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DriftConfig {
    pub min_heading_cog_difference: f64,
    pub max_heading_cog_difference: f64,
    pub min_drifting_speed_knots: f64,
    pub max_drifting_speed_knots: f64,
    /// Sliding window length. Entries older than this relative to the newest
    /// report fall out of the window.
    pub window_size_ms: i64,
    /// Maximum retention for entries awaiting the proportion gate. 0 disables
    /// the extension; otherwise must exceed `window_size_ms`.
    pub expiry_age_ms: i64,
    /// Minimum fraction of window entries that must be candidates before any
    /// emission is permitted.
    pub min_proportion: f64,
    /// Maximum non-drifting gap absorbed into the current episode.
    pub non_drifting_threshold_ms: i64,
    pub queue_backing: QueueBacking,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            min_heading_cog_difference: 45.0,
            max_heading_cog_difference: 135.0,
            min_drifting_speed_knots: 0.25,
            max_drifting_speed_knots: 20.0,
            window_size_ms: 5 * 60 * 1000,
            expiry_age_ms: 5 * 60 * 60 * 1000,
            min_proportion: 0.5,
            non_drifting_threshold_ms: 5 * 60 * 1000,
            queue_backing: QueueBacking::Growable,
        }
    }
}

impl DriftConfig {
    /// Check every invariant. Called once at engine/feed construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (min_d, max_d) = (self.min_heading_cog_difference, self.max_heading_cog_difference);
        if !(0.0..360.0).contains(&min_d) || !(0.0..360.0).contains(&max_d) {
            return Err(ConfigError::HeadingDifferenceOutOfRange(min_d, max_d));
        }
        if min_d > max_d {
            return Err(ConfigError::HeadingDifferenceReversed(min_d, max_d));
        }
        let (min_s, max_s) = (self.min_drifting_speed_knots, self.max_drifting_speed_knots);
        if min_s < 0.0 || min_s > max_s || !min_s.is_finite() || !max_s.is_finite() {
            return Err(ConfigError::SpeedBoundsInvalid(min_s, max_s));
        }
        if self.window_size_ms <= 0 {
            return Err(ConfigError::WindowSizeZero);
        }
        if self.expiry_age_ms != 0 && self.expiry_age_ms <= self.window_size_ms {
            return Err(ConfigError::ExpiryAgeTooSmall(self.expiry_age_ms, self.window_size_ms));
        }
        if !(0.0..=1.0).contains(&self.min_proportion) {
            return Err(ConfigError::ProportionOutOfRange(self.min_proportion));
        }
        if self.non_drifting_threshold_ms < 0 {
            return Err(ConfigError::NonDriftingThresholdNegative);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(DriftConfig::default().validate().is_ok());
    }

    #[test]
    fn default_values_match_operational_profile() {
        let c = DriftConfig::default();
        assert_eq!(c.min_heading_cog_difference, 45.0);
        assert_eq!(c.max_heading_cog_difference, 135.0);
        assert_eq!(c.min_drifting_speed_knots, 0.25);
        assert_eq!(c.max_drifting_speed_knots, 20.0);
        assert_eq!(c.window_size_ms, 300_000);
        assert_eq!(c.expiry_age_ms, 18_000_000);
        assert_eq!(c.min_proportion, 0.5);
        assert_eq!(c.non_drifting_threshold_ms, 300_000);
        assert_eq!(c.queue_backing, QueueBacking::Growable);
    }

    #[test]
    fn independent_instances_do_not_share_state() {
        let a = DriftConfig::default();
        let mut b = DriftConfig::default();
        b.window_size_ms = 600_000;
        b.expiry_age_ms = 0;
        assert_eq!(a.window_size_ms, 300_000);
        assert!(b.validate().is_ok());
    }

    #[test]
    fn rejects_reversed_heading_bounds() {
        let c = DriftConfig {
            min_heading_cog_difference: 200.0,
            max_heading_cog_difference: 100.0,
            ..DriftConfig::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConfigError::HeadingDifferenceReversed(..))
        ));
    }

    #[test]
    fn rejects_heading_bounds_outside_circle() {
        let c = DriftConfig {
            max_heading_cog_difference: 360.0,
            ..DriftConfig::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConfigError::HeadingDifferenceOutOfRange(..))
        ));

        let c = DriftConfig {
            min_heading_cog_difference: -1.0,
            ..DriftConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_reversed_speed_bounds() {
        let c = DriftConfig {
            min_drifting_speed_knots: 21.0,
            max_drifting_speed_knots: 20.0,
            ..DriftConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::SpeedBoundsInvalid(..))));
    }

    #[test]
    fn rejects_negative_min_speed() {
        let c = DriftConfig {
            min_drifting_speed_knots: -0.1,
            ..DriftConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_window() {
        let c = DriftConfig {
            window_size_ms: 0,
            ..DriftConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::WindowSizeZero)));
    }

    #[test]
    fn expiry_age_zero_is_allowed() {
        let c = DriftConfig {
            expiry_age_ms: 0,
            ..DriftConfig::default()
        };
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_expiry_age_not_exceeding_window() {
        let c = DriftConfig {
            expiry_age_ms: 300_000, // equal to window
            ..DriftConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::ExpiryAgeTooSmall(..))));
    }

    #[test]
    fn rejects_proportion_outside_unit_interval() {
        for p in [-0.01, 1.01] {
            let c = DriftConfig {
                min_proportion: p,
                ..DriftConfig::default()
            };
            assert!(matches!(c.validate(), Err(ConfigError::ProportionOutOfRange(_))));
        }
    }

    #[test]
    fn rejects_negative_non_drifting_threshold() {
        let c = DriftConfig {
            non_drifting_threshold_ms: -1,
            ..DriftConfig::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConfigError::NonDriftingThresholdNegative)
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_serde_round_trip() {
        let c = DriftConfig {
            queue_backing: QueueBacking::FixedCapacity,
            ..DriftConfig::default()
        };
        let json = serde_json::to_string(&c).unwrap();
        let back: DriftConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }
}
