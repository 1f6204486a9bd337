//! Timeline entry derivation.

use dojo_core::{EntryId, Requirement, TimelineEntry, Time, Username};

use crate::aggregator::ProgressDelta;

/// Builds the immutable history record of an applied delta.
pub struct TimelineRecorder;

impl TimelineRecorder {
    /// Describe the transition from `previous_count` by `delta`.
    ///
    /// Requirement metadata is snapshotted into the entry. `total_count`
    /// resolves the cohort-specific target first, then the `ALL_COHORTS`
    /// default, then zero.
    pub fn record(
        &self,
        owner: &Username,
        requirement: &Requirement,
        delta: &ProgressDelta,
        previous_count: i64,
        now: Time,
    ) -> TimelineEntry {
        TimelineEntry {
            id: EntryId::new(),
            owner: owner.clone(),
            requirement_id: requirement.id.clone(),
            requirement_name: requirement.name.clone(),
            requirement_category: requirement.category.clone(),
            scoreboard_display: requirement.scoreboard_display,
            cohort: delta.cohort.clone(),
            total_count: requirement.target_for(&delta.cohort),
            previous_count,
            new_count: delta.new_count(previous_count),
            minutes_spent: delta.minutes,
            created_at: now,
        }
    }
}

impl Default for TimelineRecorder {
    fn default() -> Self {
        Self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::ProgressAggregator;
    use chrono::Utc;
    use dojo_core::{Cohort, RequirementProgress, ScoreboardDisplay};

    fn requirement() -> Requirement {
        let mut requirement = Requirement::new("req1", "Play classical games", "Games + Analysis")
            .with_count("1200-1300", 5);
        requirement.scoreboard_display = ScoreboardDisplay::Checkbox;
        requirement
    }

    fn delta(cohort: &str, count: i64, minutes: i64) -> ProgressDelta {
        ProgressDelta {
            cohort: Cohort::parse(cohort),
            count,
            minutes,
        }
    }

    #[test]
    fn test_snapshot_fields() {
        let now = Utc::now();
        let entry = TimelineRecorder.record(
            &Username::new("magnus"),
            &requirement(),
            &delta("1200-1300", 2, 30),
            0,
            now,
        );

        assert_eq!(entry.owner, Username::new("magnus"));
        assert_eq!(entry.requirement_name, "Play classical games");
        assert_eq!(entry.requirement_category, "Games + Analysis");
        assert_eq!(entry.scoreboard_display, ScoreboardDisplay::Checkbox);
        assert_eq!(entry.total_count, 5);
        assert_eq!(entry.previous_count, 0);
        assert_eq!(entry.new_count, 2);
        assert_eq!(entry.minutes_spent, 30);
        assert_eq!(entry.created_at, now);
    }

    #[test]
    fn test_cohort_target_ignores_wildcard_value() {
        for wildcard in [0i64, 1, 5, 100] {
            let requirement = requirement().with_count(Cohort::All, wildcard);
            let entry = TimelineRecorder.record(
                &Username::new("magnus"),
                &requirement,
                &delta("1200-1300", 1, 0),
                0,
                Utc::now(),
            );
            assert_eq!(entry.total_count, 5);
        }
    }

    #[test]
    fn test_wildcard_target_fallback() {
        let requirement = Requirement::new("req2", "Tactics", "Tactics").with_count(Cohort::All, 10);
        let entry = TimelineRecorder.record(
            &Username::new("magnus"),
            &requirement,
            &delta("800-900", 1, 0),
            0,
            Utc::now(),
        );
        assert_eq!(entry.total_count, 10);
    }

    #[test]
    fn test_missing_target_is_zero() {
        let entry = TimelineRecorder.record(
            &Username::new("magnus"),
            &requirement(),
            &delta("2000-2100", 1, 0),
            0,
            Utc::now(),
        );
        assert_eq!(entry.total_count, 0);
    }

    #[test]
    fn test_minutes_are_incremental_and_counts_match_aggregator() {
        let now = Utc::now();
        let requirement = requirement();
        let cohort = Cohort::specific("1200-1300");
        let mut existing = RequirementProgress::empty(requirement.id.clone(), now);
        existing.counts.insert(cohort.clone(), 3);
        existing.minutes_spent.insert(cohort.clone(), 90);
        let update = delta("1200-1300", 1, 20);

        let aggregation = ProgressAggregator.apply(Some(existing), &requirement.id, &update, now);
        let entry = TimelineRecorder.record(
            &Username::new("magnus"),
            &requirement,
            &update,
            aggregation.previous_count,
            now,
        );

        assert_eq!(entry.previous_count, 3);
        assert_eq!(entry.new_count, aggregation.new_count);
        assert_eq!(entry.new_count, 4);
        assert_eq!(entry.minutes_spent, 20);
        assert_eq!(aggregation.progress.minutes_for(&cohort), 110);
    }
}
