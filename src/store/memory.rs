// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{
    clamp_signed_url_ttl, validate_blob_key, FloorRepository, IssueRepository, PhotoRepository,
    PhotoStorage, StoreError,
};
use crate::model::{
    BuildingId, Floor, FloorId, Issue, IssueId, Photo, PhotoId, PhotoPhase, ProjectId,
};

#[derive(Debug, Default)]
struct MemoryState {
    issues: BTreeMap<IssueId, Issue>,
    photos: Vec<Photo>,
    floors: Vec<Floor>,
    blobs: BTreeMap<String, StoredBlob>,
}

#[derive(Debug, Clone)]
struct StoredBlob {
    bytes: Vec<u8>,
    content_type: String,
}

/// Keeps every collaborator's state in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_floors(floors: impl IntoIterator<Item = Floor>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                floors: floors.into_iter().collect(),
                ..MemoryState::default()
            }),
        }
    }

    pub async fn blob(&self, key: &str) -> Option<(Vec<u8>, String)> {
        let state = self.state.lock().await;
        state
            .blobs
            .get(key)
            .map(|blob| (blob.bytes.clone(), blob.content_type.clone()))
    }

    pub async fn blob_count(&self) -> usize {
        self.state.lock().await.blobs.len()
    }
}

#[async_trait]
impl IssueRepository for MemoryStore {
    async fn save(&self, issue: &Issue) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.issues.insert(issue.issue_id().clone(), issue.clone());
        Ok(())
    }

    async fn find_by_id(&self, issue_id: &IssueId) -> Result<Option<Issue>, StoreError> {
        Ok(self.state.lock().await.issues.get(issue_id).cloned())
    }

    async fn find_by_project(
        &self,
        project_id: &ProjectId,
        floor_id: Option<&FloorId>,
    ) -> Result<Vec<Issue>, StoreError> {
        let state = self.state.lock().await;
        let mut issues = state
            .issues
            .values()
            .filter(|issue| issue.project_id() == project_id)
            .filter(|issue| floor_id.map_or(true, |floor_id| issue.floor_id() == floor_id))
            .cloned()
            .collect::<Vec<_>>();
        sort_newest_first(&mut issues);
        Ok(issues)
    }

    async fn delete(&self, issue_id: &IssueId) -> Result<(), StoreError> {
        self.state.lock().await.issues.remove(issue_id);
        Ok(())
    }
}

#[async_trait]
impl PhotoRepository for MemoryStore {
    async fn save(&self, photo: &Photo) -> Result<(), StoreError> {
        self.state.lock().await.photos.push(photo.clone());
        Ok(())
    }

    async fn find_by_id(&self, photo_id: &PhotoId) -> Result<Option<Photo>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .photos
            .iter()
            .find(|photo| photo.photo_id() == photo_id)
            .cloned())
    }

    async fn find_by_issue(&self, issue_id: &IssueId) -> Result<Vec<Photo>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .photos
            .iter()
            .filter(|photo| photo.issue_id() == issue_id)
            .cloned()
            .collect())
    }

    async fn count_by_phase(
        &self,
        issue_id: &IssueId,
        phase: PhotoPhase,
    ) -> Result<usize, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .photos
            .iter()
            .filter(|photo| photo.issue_id() == issue_id && photo.phase() == phase)
            .count())
    }

    async fn delete_by_issue(&self, issue_id: &IssueId) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.photos.retain(|photo| photo.issue_id() != issue_id);
        Ok(())
    }
}

#[async_trait]
impl FloorRepository for MemoryStore {
    async fn find_by_building(&self, building_id: &BuildingId) -> Result<Vec<Floor>, StoreError> {
        let state = self.state.lock().await;
        let mut floors = state
            .floors
            .iter()
            .filter(|floor| floor.building_id() == building_id)
            .cloned()
            .collect::<Vec<_>>();
        floors.sort_by_key(Floor::floor_number);
        Ok(floors)
    }

    async fn find_by_id(&self, floor_id: &FloorId) -> Result<Option<Floor>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .floors
            .iter()
            .find(|floor| floor.floor_id() == floor_id)
            .cloned())
    }
}

#[async_trait]
impl PhotoStorage for MemoryStore {
    async fn upload(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StoreError> {
        validate_blob_key(key)?;
        let mut state = self.state.lock().await;
        state.blobs.insert(
            key.to_owned(),
            StoredBlob {
                bytes: bytes.to_vec(),
                content_type: content_type.to_owned(),
            },
        );
        Ok(key.to_owned())
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String, StoreError> {
        validate_blob_key(key)?;
        if !self.state.lock().await.blobs.contains_key(key) {
            return Err(StoreError::BlobNotFound {
                key: key.to_owned(),
            });
        }
        let expires = Utc::now().timestamp() + clamp_signed_url_ttl(ttl).as_secs() as i64;
        Ok(format!("memory://{key}?expires={expires}"))
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.state.lock().await.blobs.remove(key);
        Ok(())
    }
}

pub(crate) fn sort_newest_first(issues: &mut [Issue]) {
    issues.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| a.issue_id().cmp(b.issue_id()))
    });
}
