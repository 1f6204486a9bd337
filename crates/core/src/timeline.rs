//! Timeline entry - immutable audit record of one progress update.

use serde::{Deserialize, Serialize};
use crate::cohort::Cohort;
use crate::id::{EntryId, RequirementId, Username};
use crate::requirement::ScoreboardDisplay;
use crate::Time;

/// One progress-update event.
///
/// Requirement metadata is copied at creation time; later catalog edits do
/// not change existing entries. `minutes_spent` is the increment of this
/// update, unlike `RequirementProgress::minutes_spent` which is cumulative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    /// Unique identifier
    pub id: EntryId,

    /// User the entry belongs to
    pub owner: Username,

    /// Requirement that was updated
    pub requirement_id: RequirementId,

    /// Requirement name at the time of the update
    pub requirement_name: String,

    /// Requirement category at the time of the update
    pub requirement_category: String,

    /// Scoreboard display at the time of the update
    pub scoreboard_display: ScoreboardDisplay,

    /// Cohort the update was recorded under
    pub cohort: Cohort,

    /// Resolved target count
    pub total_count: i64,

    /// Count before the update
    pub previous_count: i64,

    /// Count after the update
    pub new_count: i64,

    /// Minutes added by this update
    pub minutes_spent: i64,

    /// When the update happened
    pub created_at: Time,
}
