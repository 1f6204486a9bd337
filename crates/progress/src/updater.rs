//! Progress update orchestration.
//!
//! An update runs through the stages of [`UpdateStage`]: the request is
//! validated, the requirement and then the user are resolved, the delta is
//! aggregated and recorded, and the progress record plus timeline entry are
//! committed together. Any stage can fail; failures are logged with the
//! stage they happened in and returned to the caller.
//!
//! Under [`ConcurrencyMode::Optimistic`] the commit carries the user version
//! that was read. When another writer got there first the store reports a
//! conflict, and the user is re-read and the delta re-applied on fresh state.
//! [`ConcurrencyMode::LastWriteWins`] commits without the check, which can
//! lose a concurrent increment.

use std::sync::Arc;

use chrono::Utc;
use dojo_core::{Requirement, TimelineEntry, Time, User, Username};
use dojo_storage::{ProgressCommit, RequirementCatalog, StorageError, UserStore};
use tracing::{debug, info, warn};

use crate::aggregator::ProgressAggregator;
use crate::error::{ProgressError, Result};
use crate::recorder::TimelineRecorder;
use crate::request::{ProgressUpdateRequest, ValidatedUpdate};

/// Source of the logical timestamp of an update.
pub type Clock = Arc<dyn Fn() -> Time + Send + Sync>;

/// Stages of a progress update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStage {
    /// Checking required fields
    Validating,
    /// Looking up the requirement in the catalog
    ResolvingRequirement,
    /// Loading the user
    ResolvingUser,
    /// Merging the delta into progress
    Aggregating,
    /// Building the timeline entry
    Recording,
    /// Committing progress and entry
    Persisting,
    /// Update committed
    Done,
}

impl std::fmt::Display for UpdateStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Validating => "validating",
            Self::ResolvingRequirement => "resolving_requirement",
            Self::ResolvingUser => "resolving_user",
            Self::Aggregating => "aggregating",
            Self::Recording => "recording",
            Self::Persisting => "persisting",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// How commits treat concurrent writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcurrencyMode {
    /// Commit without a version check
    LastWriteWins,
    /// Commit against the version read; retry on conflict
    Optimistic {
        /// Extra attempts after the first conflicting commit
        max_retries: u32,
    },
}

impl Default for ConcurrencyMode {
    fn default() -> Self {
        Self::Optimistic { max_retries: 3 }
    }
}

/// Update orchestration settings.
#[derive(Debug, Clone, Default)]
pub struct UpdaterConfig {
    /// Refuse negative increments as invalid input
    pub reject_negative_increments: bool,

    /// Commit behavior under concurrent writers
    pub concurrency: ConcurrencyMode,
}

/// Applies progress updates against the injected stores.
pub struct ProgressUpdater<U: UserStore, C: RequirementCatalog> {
    users: Arc<U>,
    catalog: Arc<C>,
    config: UpdaterConfig,
    clock: Clock,
    aggregator: ProgressAggregator,
    recorder: TimelineRecorder,
}

impl<U: UserStore, C: RequirementCatalog> ProgressUpdater<U, C> {
    /// Create an updater with default settings and the system clock.
    pub fn new(users: Arc<U>, catalog: Arc<C>) -> Self {
        Self {
            users,
            catalog,
            config: UpdaterConfig::default(),
            clock: Arc::new(Utc::now),
            aggregator: ProgressAggregator,
            recorder: TimelineRecorder,
        }
    }

    /// Set configuration.
    pub fn with_config(mut self, config: UpdaterConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: impl Fn() -> Time + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    /// Apply a JSON request body on behalf of `username`.
    pub async fn update_json(&self, username: &Username, body: &str) -> Result<User> {
        if username.is_empty() {
            let err = ProgressError::InvalidInput("username is required".to_string());
            return Err(failed(username, UpdateStage::Validating, err));
        }
        let request = ProgressUpdateRequest::from_json(body)
            .map_err(|err| failed(username, UpdateStage::Validating, err))?;
        self.update(username, &request).await
    }

    /// Apply an update on behalf of `username` and return the updated user.
    pub async fn update(&self, username: &Username, request: &ProgressUpdateRequest) -> Result<User> {
        debug!(user = %username, stage = %UpdateStage::Validating, "progress update");
        let update = request
            .validate(username, self.config.reject_negative_increments)
            .map_err(|err| failed(username, UpdateStage::Validating, err))?;

        debug!(
            user = %username,
            requirement = %update.requirement_id,
            stage = %UpdateStage::ResolvingRequirement,
            "progress update"
        );
        let requirement = self
            .catalog
            .get_requirement(&update.requirement_id)
            .await
            .map_err(|err| failed(username, UpdateStage::ResolvingRequirement, err.into()))?;

        let mut conflicts = 0u32;
        loop {
            match self.attempt(username, &requirement, &update).await {
                Ok(user) => return Ok(user),
                Err(Attempt::Conflict(err)) if conflicts < self.max_retries() => {
                    conflicts += 1;
                    warn!(
                        user = %username,
                        requirement = %update.requirement_id,
                        attempt = conflicts,
                        error = %err,
                        "concurrent progress update, retrying"
                    );
                }
                Err(Attempt::Conflict(err)) => {
                    return Err(failed(username, UpdateStage::Persisting, err.into()));
                }
                Err(Attempt::Failed(stage, err)) => return Err(failed(username, stage, err)),
            }
        }
    }

    /// One read-aggregate-record-commit cycle.
    async fn attempt(
        &self,
        username: &Username,
        requirement: &Requirement,
        update: &ValidatedUpdate,
    ) -> std::result::Result<User, Attempt> {
        debug!(user = %username, stage = %UpdateStage::ResolvingUser, "progress update");
        let user = self
            .users
            .get_user(username)
            .await
            .map_err(|err| Attempt::Failed(UpdateStage::ResolvingUser, err.into()))?;

        let now = (self.clock)();

        debug!(user = %username, stage = %UpdateStage::Aggregating, "progress update");
        let existing = user.progress_on(&update.requirement_id).cloned();
        let aggregation = self
            .aggregator
            .apply(existing, &update.requirement_id, &update.delta, now);

        debug!(user = %username, stage = %UpdateStage::Recording, "progress update");
        let entry = self.recorder.record(
            username,
            requirement,
            &update.delta,
            aggregation.previous_count,
            now,
        );
        debug_assert_eq!(entry.new_count, aggregation.new_count);

        debug!(user = %username, stage = %UpdateStage::Persisting, "progress update");
        let commit = ProgressCommit {
            progress: aggregation.progress,
            entry,
            expected_version: match self.config.concurrency {
                ConcurrencyMode::LastWriteWins => None,
                ConcurrencyMode::Optimistic { .. } => Some(user.version),
            },
        };
        let updated = match self.users.commit_progress(username, commit).await {
            Ok(updated) => updated,
            Err(err @ StorageError::Conflict { .. }) => return Err(Attempt::Conflict(err)),
            Err(err) => return Err(Attempt::Failed(UpdateStage::Persisting, err.into())),
        };

        info!(
            user = %username,
            requirement = %update.requirement_id,
            cohort = %update.delta.cohort,
            previous = aggregation.previous_count,
            new = aggregation.new_count,
            stage = %UpdateStage::Done,
            "progress updated"
        );
        Ok(updated)
    }

    fn max_retries(&self) -> u32 {
        match self.config.concurrency {
            ConcurrencyMode::LastWriteWins => 0,
            ConcurrencyMode::Optimistic { max_retries } => max_retries,
        }
    }

    /// A user's timeline ordered by creation time.
    pub async fn timeline(&self, username: &Username) -> Result<Vec<TimelineEntry>> {
        self.users.get_user(username).await?;
        Ok(self.users.list_timeline(username).await?)
    }
}

/// Outcome of a failed attempt.
enum Attempt {
    Conflict(StorageError),
    Failed(UpdateStage, ProgressError),
}

fn failed(username: &Username, stage: UpdateStage, err: ProgressError) -> ProgressError {
    warn!(user = %username, stage = %stage, error = %err, "progress update failed");
    err
}
