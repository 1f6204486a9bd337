//! In-memory storage implementation.
//!
//! Everything lives behind one lock, so a progress commit mutates the user
//! and appends the timeline entry without any reader observing half of it.

use std::collections::HashMap;

use async_trait::async_trait;
use dojo_core::{Requirement, RequirementId, TimelineEntry, User, Username};
use tokio::sync::RwLock;
use tracing::debug;

use super::trait_::{check_owner, check_version, sort_timeline};
use super::{ProgressCommit, RequirementCatalog, Result, StorageError, UserStore};

#[derive(Default)]
struct State {
    users: HashMap<Username, User>,
    requirements: HashMap<RequirementId, Requirement>,
    timeline: HashMap<Username, Vec<TimelineEntry>>,
}

/// Process-local storage backend.
#[derive(Default)]
pub struct MemoryStorage {
    state: RwLock<State>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RequirementCatalog for MemoryStorage {
    async fn get_requirement(&self, id: &RequirementId) -> Result<Requirement> {
        self.state
            .read()
            .await
            .requirements
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("requirement {}", id)))
    }

    async fn list_requirements(&self) -> Result<Vec<Requirement>> {
        Ok(self.state.read().await.requirements.values().cloned().collect())
    }

    async fn save_requirement(&self, requirement: &Requirement) -> Result<()> {
        self.state
            .write()
            .await
            .requirements
            .insert(requirement.id.clone(), requirement.clone());
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStorage {
    async fn get_user(&self, username: &Username) -> Result<User> {
        self.state
            .read()
            .await
            .users
            .get(username)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("user {}", username)))
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        self.state
            .write()
            .await
            .users
            .insert(user.username.clone(), user.clone());
        Ok(())
    }

    async fn commit_progress(&self, username: &Username, commit: ProgressCommit) -> Result<User> {
        check_owner(&commit, username)?;

        let mut state = self.state.write().await;
        let State { users, timeline, .. } = &mut *state;

        let user = users
            .get_mut(username)
            .ok_or_else(|| StorageError::NotFound(format!("user {}", username)))?;
        check_version(&commit, user)?;

        user.apply_progress(commit.progress);
        timeline.entry(username.clone()).or_default().push(commit.entry);

        debug!(user = %username, version = user.version, "committed progress");
        Ok(user.clone())
    }

    async fn list_timeline(&self, username: &Username) -> Result<Vec<TimelineEntry>> {
        let mut entries = self
            .state
            .read()
            .await
            .timeline
            .get(username)
            .cloned()
            .unwrap_or_default();
        sort_timeline(&mut entries);
        Ok(entries)
    }
}
