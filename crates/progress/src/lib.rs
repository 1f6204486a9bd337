//! Progress Tracking
//!
//! Merges incremental training updates into per-cohort requirement progress
//! and derives the append-only timeline of those updates.

#![warn(missing_docs)]

pub mod aggregator;
pub mod recorder;
pub mod request;
pub mod error;
pub mod updater;
pub mod catalog;
pub mod scoreboard;

pub use aggregator::{Aggregation, ProgressAggregator, ProgressDelta};
pub use recorder::TimelineRecorder;
pub use request::{ProgressUpdateRequest, ValidatedUpdate};
pub use error::{ErrorResponse, ProgressError, Result};
pub use updater::{Clock, ConcurrencyMode, ProgressUpdater, UpdateStage, UpdaterConfig};
pub use catalog::{filter_for_cohort, requirements_for_cohort};
pub use scoreboard::{score_user, UserScore};
