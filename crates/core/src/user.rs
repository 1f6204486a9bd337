//! User model - the owner of all progress.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use crate::cohort::Cohort;
use crate::id::{RequirementId, Username};
use crate::progress::RequirementProgress;
use crate::Time;

/// A dojo member and their progress on every requirement they touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique username
    pub username: Username,

    /// Name shown to other members
    #[serde(default)]
    pub display_name: String,

    /// The cohort the user currently trains in
    #[serde(default)]
    pub dojo_cohort: Option<Cohort>,

    /// Progress per requirement
    #[serde(default)]
    pub progress: HashMap<RequirementId, RequirementProgress>,

    /// Bumped on every committed progress update
    #[serde(default)]
    pub version: u64,

    /// When created
    pub created_at: Time,

    /// Last updated
    pub updated_at: Time,
}

impl User {
    /// Create a user with no progress.
    pub fn new(username: impl Into<Username>, now: Time) -> Self {
        Self {
            username: username.into(),
            display_name: String::new(),
            dojo_cohort: None,
            progress: HashMap::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Progress on a requirement, if any was recorded.
    pub fn progress_on(&self, requirement_id: &RequirementId) -> Option<&RequirementProgress> {
        self.progress.get(requirement_id)
    }

    /// Replace the progress record for its requirement and bump the version.
    pub fn apply_progress(&mut self, progress: RequirementProgress) {
        self.updated_at = progress.updated_at;
        self.progress.insert(progress.requirement_id.clone(), progress);
        self.version += 1;
    }
}
