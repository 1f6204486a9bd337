//! JSON file storage implementation.
//!
//! Stores data as JSON files under a root directory:
//!
//! ```text
//! <root>/users/<username>.json
//! <root>/requirements/<requirement-id>.json
//! <root>/timeline/<username>/<entry-id>.json
//! ```
//!
//! Every file is written to a temporary sibling and renamed into place. A
//! progress commit publishes the timeline entry first and the user second;
//! if the user write fails the entry file is removed again, so no entry is
//! left without its progress update. User and timeline reads share a lock
//! with commits and never observe a commit half-way.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dojo_core::{Requirement, RequirementId, TimelineEntry, User, Username};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::trait_::{check_owner, check_version, sort_timeline};
use super::{ProgressCommit, RequirementCatalog, Result, StorageError, UserStore};

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
    user_lock: RwLock<()>,
}

impl JsonStorage {
    /// Create storage rooted at `root`, creating the directory layout.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(root.join("users")).await?;
        fs::create_dir_all(root.join("requirements")).await?;
        fs::create_dir_all(root.join("timeline")).await?;

        Ok(Self {
            root,
            user_lock: RwLock::new(()),
        })
    }

    /// Root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn user_path(&self, username: &Username) -> PathBuf {
        self.root
            .join("users")
            .join(format!("{}.json", file_stem(username.as_str())))
    }

    fn requirement_path(&self, id: &RequirementId) -> PathBuf {
        self.root
            .join("requirements")
            .join(format!("{}.json", file_stem(id.as_str())))
    }

    fn timeline_dir(&self, username: &Username) -> PathBuf {
        self.root.join("timeline").join(file_stem(username.as_str()))
    }

    fn entry_path(&self, entry: &TimelineEntry) -> PathBuf {
        self.timeline_dir(&entry.owner).join(format!("{}.json", entry.id))
    }

    /// Read a user file. Callers hold `user_lock`.
    async fn load_user(&self, username: &Username) -> Result<User> {
        read_json(&self.user_path(username))
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("user {}", username)))
    }
}

#[async_trait]
impl RequirementCatalog for JsonStorage {
    async fn get_requirement(&self, id: &RequirementId) -> Result<Requirement> {
        read_json(&self.requirement_path(id))
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("requirement {}", id)))
    }

    async fn list_requirements(&self) -> Result<Vec<Requirement>> {
        list_dir(&self.root.join("requirements")).await
    }

    async fn save_requirement(&self, requirement: &Requirement) -> Result<()> {
        write_json(&self.requirement_path(&requirement.id), requirement).await
    }
}

#[async_trait]
impl UserStore for JsonStorage {
    async fn get_user(&self, username: &Username) -> Result<User> {
        let _guard = self.user_lock.read().await;
        self.load_user(username).await
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        let _guard = self.user_lock.write().await;
        write_json(&self.user_path(&user.username), user).await
    }

    async fn commit_progress(&self, username: &Username, commit: ProgressCommit) -> Result<User> {
        check_owner(&commit, username)?;

        let _guard = self.user_lock.write().await;

        let mut user = self.load_user(username).await?;
        check_version(&commit, &user)?;
        user.apply_progress(commit.progress);

        fs::create_dir_all(self.timeline_dir(username)).await?;
        let entry_path = self.entry_path(&commit.entry);
        write_json(&entry_path, &commit.entry).await?;

        if let Err(err) = write_json(&self.user_path(username), &user).await {
            if let Err(cleanup) = fs::remove_file(&entry_path).await {
                warn!(
                    path = %entry_path.display(),
                    error = %cleanup,
                    "failed to remove timeline entry after user write failure"
                );
            }
            return Err(err);
        }

        debug!(user = %username, version = user.version, "committed progress");
        Ok(user)
    }

    async fn list_timeline(&self, username: &Username) -> Result<Vec<TimelineEntry>> {
        let _guard = self.user_lock.read().await;
        let dir = self.timeline_dir(username);
        if !fs::try_exists(&dir).await? {
            return Ok(Vec::new());
        }
        let mut entries = list_dir(&dir).await?;
        sort_timeline(&mut entries);
        Ok(entries)
    }
}

/// Map an identifier onto a file-system safe stem.
fn file_stem(raw: &str) -> String {
    let mut stem = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' => stem.push(byte as char),
            _ => stem.push_str(&format!("%{:02X}", byte)),
        }
    }
    stem
}

async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json.as_bytes()).await?;
    if let Err(err) = fs::rename(&tmp, path).await {
        if let Err(cleanup) = fs::remove_file(&tmp).await {
            warn!(
                path = %tmp.display(),
                error = %cleanup,
                "failed to remove temporary file after rename failure"
            );
        }
        return Err(err.into());
    }
    Ok(())
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        if entry.path().extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        if let Some(item) = read_json(&entry.path()).await? {
            items.push(item);
        }
    }
    Ok(items)
}
