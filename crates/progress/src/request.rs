//! Inbound progress update request.

use dojo_core::{Cohort, RequirementId, Username};
use serde::{Deserialize, Serialize};

use crate::aggregator::ProgressDelta;
use crate::error::{ProgressError, Result};

/// Body of a progress update request.
///
/// Missing increments default to zero. Missing identifiers deserialize as
/// empty strings and are rejected by [`ProgressUpdateRequest::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdateRequest {
    /// Requirement to update
    #[serde(default)]
    pub requirement_id: String,

    /// Completed count to add
    #[serde(default)]
    pub incremental_count: i64,

    /// Minutes to add
    #[serde(default)]
    pub incremental_minutes_spent: i64,

    /// Cohort the progress is recorded under
    #[serde(default)]
    pub cohort: String,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpdate {
    /// Requirement to update
    pub requirement_id: RequirementId,

    /// Increment to apply
    pub delta: ProgressDelta,
}

impl ProgressUpdateRequest {
    /// Parse a JSON request body.
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| {
            ProgressError::InvalidInput(format!("unable to unmarshal request body: {}", e))
        })
    }

    /// Check required fields for an update made by `username`.
    ///
    /// With `reject_negative` set, negative increments are refused as well.
    pub fn validate(&self, username: &Username, reject_negative: bool) -> Result<ValidatedUpdate> {
        if username.is_empty() {
            return Err(ProgressError::InvalidInput("username is required".to_string()));
        }
        if self.requirement_id.is_empty() {
            return Err(ProgressError::InvalidInput("requirementId is required".to_string()));
        }
        let cohort = Cohort::parse(&self.cohort);
        if cohort.is_empty() {
            return Err(ProgressError::InvalidInput("cohort is required".to_string()));
        }
        if reject_negative && self.incremental_count < 0 {
            return Err(ProgressError::InvalidInput(
                "incrementalCount must not be negative".to_string(),
            ));
        }
        if reject_negative && self.incremental_minutes_spent < 0 {
            return Err(ProgressError::InvalidInput(
                "incrementalMinutesSpent must not be negative".to_string(),
            ));
        }

        Ok(ValidatedUpdate {
            requirement_id: RequirementId::new(self.requirement_id.clone()),
            delta: ProgressDelta {
                cohort,
                count: self.incremental_count,
                minutes: self.incremental_minutes_spent,
            },
        })
    }
}
