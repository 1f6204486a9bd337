//! Requirement progress - a user's cumulative state for one requirement.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use crate::cohort::Cohort;
use crate::id::RequirementId;
use crate::Time;

/// Cumulative completion state of one requirement, keyed by cohort.
///
/// Counts and minutes only ever change by adding an increment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementProgress {
    /// Requirement this progress belongs to
    pub requirement_id: RequirementId,

    /// Completed count per cohort
    #[serde(default)]
    pub counts: HashMap<Cohort, i64>,

    /// Minutes spent per cohort
    #[serde(default)]
    pub minutes_spent: HashMap<Cohort, i64>,

    /// Last mutation
    pub updated_at: Time,
}

impl RequirementProgress {
    /// Progress with no counts or minutes recorded yet.
    pub fn empty(requirement_id: RequirementId, now: Time) -> Self {
        Self {
            requirement_id,
            counts: HashMap::new(),
            minutes_spent: HashMap::new(),
            updated_at: now,
        }
    }

    /// Completed count for a cohort (zero if unseen).
    pub fn count_for(&self, cohort: &Cohort) -> i64 {
        self.counts.get(cohort).copied().unwrap_or(0)
    }

    /// Minutes spent for a cohort (zero if unseen).
    pub fn minutes_for(&self, cohort: &Cohort) -> i64 {
        self.minutes_spent.get(cohort).copied().unwrap_or(0)
    }
}
