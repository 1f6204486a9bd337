//! Store trait abstractions.

use async_trait::async_trait;
use dojo_core::{Requirement, RequirementId, RequirementProgress, TimelineEntry, User, Username};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// The stored user changed since it was read
    #[error("Version conflict: expected {expected}, found {found}")]
    Conflict {
        /// Version the writer read
        expected: u64,
        /// Version currently stored
        found: u64,
    },

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl StorageError {
    /// Whether this error reports a missing record.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// A progress update ready to be committed.
#[derive(Debug, Clone)]
pub struct ProgressCommit {
    /// New state of `user.progress[progress.requirement_id]`
    pub progress: RequirementProgress,

    /// Entry appended to the user's timeline
    pub entry: TimelineEntry,

    /// Version the caller read; `None` skips the check (last write wins)
    pub expected_version: Option<u64>,
}

/// Read access to curriculum requirements.
#[async_trait]
pub trait RequirementCatalog: Send + Sync {
    /// Load a requirement. Missing requirements are `StorageError::NotFound`.
    async fn get_requirement(&self, id: &RequirementId) -> Result<Requirement>;

    /// List all requirements.
    async fn list_requirements(&self) -> Result<Vec<Requirement>>;

    /// Save a requirement (create or replace).
    async fn save_requirement(&self, requirement: &Requirement) -> Result<()>;
}

/// User records and their timelines.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Load a user. Missing users are `StorageError::NotFound`.
    async fn get_user(&self, username: &Username) -> Result<User>;

    /// Save a user (create or replace).
    async fn save_user(&self, user: &User) -> Result<()>;

    /// Store the progress record and append the timeline entry as one unit.
    ///
    /// Either both records are written or neither is. Returns the updated
    /// user, whose `version` has been bumped.
    async fn commit_progress(&self, username: &Username, commit: ProgressCommit) -> Result<User>;

    /// List a user's timeline ordered by creation time.
    async fn list_timeline(&self, username: &Username) -> Result<Vec<TimelineEntry>>;
}

/// Check the optimistic concurrency token of a commit.
pub(crate) fn check_version(commit: &ProgressCommit, user: &User) -> Result<()> {
    match commit.expected_version {
        Some(expected) if expected != user.version => Err(StorageError::Conflict {
            expected,
            found: user.version,
        }),
        _ => Ok(()),
    }
}

/// Reject entries filed under a different user than the commit target.
pub(crate) fn check_owner(commit: &ProgressCommit, username: &Username) -> Result<()> {
    if &commit.entry.owner != username {
        return Err(StorageError::Other(format!(
            "timeline entry owned by {} cannot be committed for {}",
            commit.entry.owner, username
        )));
    }
    Ok(())
}

/// Order entries by creation time, then by id.
pub(crate) fn sort_timeline(entries: &mut [TimelineEntry]) {
    entries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}
