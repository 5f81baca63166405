// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence and blob collaborators.
//!
//! The workflow and query layers only talk to the traits in this module. Two backends ship with
//! the crate: [`MemoryStore`] for tests and demos, and [`FolderStore`] which keeps JSON records
//! and photo blobs in a directory.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::model::{
    BuildingId, Floor, FloorId, Issue, IssueId, Photo, PhotoId, PhotoPhase, ProjectId,
};

pub mod folder;
pub mod memory;
mod records;

pub use folder::{FolderStore, WriteDurability};
pub use memory::MemoryStore;
pub use records::{BlobMetaRecord, FloorRecord, IssueRecord, PhotoRecord};

/// Upper bound for signed photo URLs.
pub const MAX_SIGNED_URL_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[async_trait]
pub trait IssueRepository: Send + Sync {
    /// Inserts or replaces the issue.
    async fn save(&self, issue: &Issue) -> Result<(), StoreError>;

    async fn find_by_id(&self, issue_id: &IssueId) -> Result<Option<Issue>, StoreError>;

    /// Issues of a project, newest first, optionally restricted to one floor.
    async fn find_by_project(
        &self,
        project_id: &ProjectId,
        floor_id: Option<&FloorId>,
    ) -> Result<Vec<Issue>, StoreError>;

    /// Only used to roll back a failed creation.
    async fn delete(&self, issue_id: &IssueId) -> Result<(), StoreError>;
}

#[async_trait]
pub trait PhotoRepository: Send + Sync {
    /// Appends a photo record. Photos are never updated.
    async fn save(&self, photo: &Photo) -> Result<(), StoreError>;

    async fn find_by_id(&self, photo_id: &PhotoId) -> Result<Option<Photo>, StoreError>;

    async fn find_by_issue(&self, issue_id: &IssueId) -> Result<Vec<Photo>, StoreError>;

    async fn count_by_phase(&self, issue_id: &IssueId, phase: PhotoPhase)
        -> Result<usize, StoreError>;

    /// Only used to roll back a failed creation.
    async fn delete_by_issue(&self, issue_id: &IssueId) -> Result<(), StoreError>;
}

#[async_trait]
pub trait FloorRepository: Send + Sync {
    /// Floors of a building in ascending floor-number order.
    async fn find_by_building(&self, building_id: &BuildingId) -> Result<Vec<Floor>, StoreError>;

    async fn find_by_id(&self, floor_id: &FloorId) -> Result<Option<Floor>, StoreError>;
}

#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Stores `bytes` under `key` and returns the key.
    async fn upload(&self, key: &str, bytes: &[u8], content_type: &str)
        -> Result<String, StoreError>;

    /// Returns a time-limited URL for `key`. `ttl` is clamped to [`MAX_SIGNED_URL_TTL`].
    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String, StoreError>;

    /// Only used to roll back a failed creation.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error at {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("json error at {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid blob key '{key}': {reason}")]
    InvalidKey { key: String, reason: &'static str },
    #[error("refusing to follow symlink at {}", path.display())]
    SymlinkRefused { path: PathBuf },
    #[error("corrupt record at {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },
    #[error("blob not found: {key}")]
    BlobNotFound { key: String },
    #[error("storage backend unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Validates a blob key: a relative, `/`-separated path of non-empty, non-dot segments.
pub(crate) fn validate_blob_key(key: &str) -> Result<(), StoreError> {
    let invalid = |reason| StoreError::InvalidKey {
        key: key.to_owned(),
        reason,
    };
    if key.is_empty() {
        return Err(invalid("key is empty"));
    }
    if key.starts_with('/') || key.contains('\\') {
        return Err(invalid("key must be a relative forward-slash path"));
    }
    for segment in key.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(invalid("key has an empty or dot segment"));
        }
    }
    Ok(())
}

pub(crate) fn clamp_signed_url_ttl(ttl: Duration) -> Duration {
    ttl.min(MAX_SIGNED_URL_TTL)
}
