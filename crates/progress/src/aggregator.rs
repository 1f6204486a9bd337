//! Progress aggregation.

use dojo_core::{Cohort, RequirementId, RequirementProgress, Time};

/// An incremental update for one cohort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressDelta {
    /// Cohort the increment is recorded under
    pub cohort: Cohort,

    /// Completed count to add (may be zero or negative)
    pub count: i64,

    /// Minutes to add (may be zero or negative)
    pub minutes: i64,
}

impl ProgressDelta {
    /// Count after applying this delta to `previous`.
    pub fn new_count(&self, previous: i64) -> i64 {
        previous.saturating_add(self.count)
    }
}

/// Result of merging a delta into stored progress.
#[derive(Debug, Clone)]
pub struct Aggregation {
    /// Updated progress record
    pub progress: RequirementProgress,

    /// Cohort count before the update
    pub previous_count: i64,

    /// Cohort count after the update
    pub new_count: i64,
}

/// Merges incremental deltas into per-cohort progress.
///
/// Pure: persistence is left to the caller.
pub struct ProgressAggregator;

impl ProgressAggregator {
    /// Apply `delta` to `existing`, creating an empty record when the user
    /// has no progress on the requirement yet.
    pub fn apply(
        &self,
        existing: Option<RequirementProgress>,
        requirement_id: &RequirementId,
        delta: &ProgressDelta,
        now: Time,
    ) -> Aggregation {
        let mut progress =
            existing.unwrap_or_else(|| RequirementProgress::empty(requirement_id.clone(), now));

        let previous_count = progress.count_for(&delta.cohort);
        let new_count = delta.new_count(previous_count);
        let minutes = progress.minutes_for(&delta.cohort).saturating_add(delta.minutes);

        progress.counts.insert(delta.cohort.clone(), new_count);
        progress.minutes_spent.insert(delta.cohort.clone(), minutes);
        progress.updated_at = now;

        Aggregation {
            progress,
            previous_count,
            new_count,
        }
    }
}

impl Default for ProgressAggregator {
    fn default() -> Self {
        Self
    }
}
