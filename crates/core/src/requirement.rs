//! Requirement model - a curriculum task with per-cohort targets.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use crate::cohort::Cohort;
use crate::id::RequirementId;

/// A curriculum requirement. Read-only reference data owned by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    /// Unique identifier
    pub id: RequirementId,

    /// Display name
    pub name: String,

    /// Category the requirement is grouped under
    pub category: String,

    /// Longer description
    #[serde(default)]
    pub description: String,

    /// Target count per cohort, with `Cohort::All` as the default bucket
    #[serde(default)]
    pub counts: HashMap<Cohort, i64>,

    /// Count a member starts from; only progress above it scores
    #[serde(default)]
    pub start_count: i64,

    /// Score awarded per completed unit above `start_count`
    #[serde(default = "default_unit_score")]
    pub unit_score: f64,

    /// How the requirement appears on the scoreboard
    #[serde(default)]
    pub scoreboard_display: ScoreboardDisplay,

    /// Ordering key within a category
    #[serde(default)]
    pub sort_priority: String,
}

impl Requirement {
    /// Create a requirement with no targets.
    pub fn new(
        id: impl Into<RequirementId>,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            description: String::new(),
            counts: HashMap::new(),
            start_count: 0,
            unit_score: default_unit_score(),
            scoreboard_display: ScoreboardDisplay::default(),
            sort_priority: String::new(),
        }
    }

    /// Set the target for a cohort.
    pub fn with_count(mut self, cohort: impl Into<Cohort>, count: i64) -> Self {
        self.counts.insert(cohort.into(), count);
        self
    }

    /// Resolve the target count for a cohort.
    ///
    /// A cohort-specific target always wins; otherwise the `ALL_COHORTS`
    /// default applies; otherwise the target is zero.
    pub fn target_for(&self, cohort: &Cohort) -> i64 {
        self.counts
            .get(cohort)
            .or_else(|| self.counts.get(&Cohort::All))
            .copied()
            .unwrap_or(0)
    }

    /// Whether this requirement defines a target specifically for `cohort`.
    pub fn has_target_for(&self, cohort: &Cohort) -> bool {
        self.counts.contains_key(cohort)
    }
}

fn default_unit_score() -> f64 {
    1.0
}

/// Scoreboard presentation of a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScoreboardDisplay {
    /// No explicit display mode
    #[default]
    #[serde(rename = "")]
    Unspecified,
    /// Not shown on the scoreboard
    #[serde(rename = "HIDDEN")]
    Hidden,
    /// Shown as a checkbox
    #[serde(rename = "CHECKBOX")]
    Checkbox,
    /// Shown as a progress bar
    #[serde(rename = "PROGRESS_BAR")]
    ProgressBar,
    /// Tracked outside the dojo scoreboard
    #[serde(rename = "NON_DOJO")]
    NonDojo,
}

impl ScoreboardDisplay {
    /// Whether requirements with this mode belong on the scoreboard.
    pub fn on_scoreboard(self) -> bool {
        !matches!(self, Self::Hidden | Self::NonDojo)
    }
}
