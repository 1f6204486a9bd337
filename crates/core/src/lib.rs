//! Dojo core data models.
//!
//! This crate defines the structures shared by the progress tracking
//! layers: users, curriculum requirements, per-cohort progress and the
//! append-only timeline.

#![warn(missing_docs)]

// Identities
mod id;
mod cohort;

// Curriculum
mod requirement;

// Per-user state
mod progress;
mod user;
mod timeline;

// Re-exports
pub use id::*;
pub use cohort::{Cohort, ALL_COHORTS};
pub use requirement::{Requirement, ScoreboardDisplay};
pub use progress::RequirementProgress;
pub use user::User;
pub use timeline::TimelineEntry;

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
