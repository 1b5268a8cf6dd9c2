//! driftfeed — windowed drift-behaviour detection over live AIS position
//! streams.
//!
//! A vessel is "drifting" when it keeps moving in a direction inconsistent
//! with its heading, within speed bounds, without an anchored or moored
//! status explaining it. This crate classifies each position report against
//! that signature, tracks per-vessel episodes through a sliding time window
//! with hysteresis across brief interruptions, and emits each qualifying
//! report downstream at most once.
//!
//! Two entry points:
//! - [`engine::DriftEngine`] — the synchronous core, one report in, zero or
//!   more [`model::DriftCandidate`]s out; for callers that own their own
//!   pipeline.
//! - [`feed::DriftFeedBuilder`] — an async shell that serializes producers
//!   into the engine, forwards upstream completion/errors, and exposes
//!   metrics.
//!
//! ```no_run
//! use driftfeed::feed::DriftFeedBuilder;
//! use driftfeed::model::{DriftEvent, Mmsi, PositionReport};
//!
//! # async fn example() {
//! let (mut feed, reports) = DriftFeedBuilder::new().build().unwrap();
//!
//! reports.send(PositionReport {
//!     mmsi: Mmsi(503123456),
//!     time_ms: 1_700_000_000_000,
//!     lat: -35.1,
//!     lon: 150.9,
//!     course_over_ground_deg: Some(90.0),
//!     heading_deg: Some(0.0),
//!     speed_over_ground_knots: Some(2.5),
//!     navigational_status: None,
//! }).await.unwrap();
//! drop(reports); // completes the stream
//!
//! while let Some(DriftEvent::Candidate(c)) = feed.next_event().await {
//!     println!("{} drifting since {}", c.report.mmsi, c.drifting_since_ms);
//! }
//! # }
//! ```

pub mod classifier;
pub mod config;
pub mod engine;
pub mod feed;
pub mod metrics;
pub mod model;
pub mod window;

pub use config::{ConfigError, DriftConfig, QueueBacking};
pub use engine::DriftEngine;
pub use feed::{DriftFeed, DriftFeedBuilder, ReportHandle};
pub use model::{DriftCandidate, DriftEvent, Mmsi, NavigationalStatus, PositionReport};
