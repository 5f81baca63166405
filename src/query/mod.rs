// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only queries over issues, photos and floors.
//!
//! Queries never go through the workflow; they project stored state for the HTTP surface and
//! the viewer's marker overlay.

use std::sync::Arc;
use std::time::Duration;

use crate::model::{BuildingId, Floor, FloorId, Issue, IssueId, Photo, PhotoId, ProjectId};
use crate::store::{FloorRepository, IssueRepository, PhotoRepository, PhotoStorage, StoreError};

/// An issue with its photos, newest photo first.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueDetail {
    pub issue: Issue,
    pub photos: Vec<Photo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUrl {
    pub photo: Photo,
    pub url: String,
}

#[derive(Clone)]
pub struct IssueQueries {
    issues: Arc<dyn IssueRepository>,
    photos: Arc<dyn PhotoRepository>,
    floors: Arc<dyn FloorRepository>,
    storage: Arc<dyn PhotoStorage>,
}

impl std::fmt::Debug for IssueQueries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssueQueries").finish_non_exhaustive()
    }
}

impl IssueQueries {
    pub fn new(
        issues: Arc<dyn IssueRepository>,
        photos: Arc<dyn PhotoRepository>,
        floors: Arc<dyn FloorRepository>,
        storage: Arc<dyn PhotoStorage>,
    ) -> Self {
        Self {
            issues,
            photos,
            floors,
            storage,
        }
    }

    /// Issues of a project, newest first.
    pub async fn list_issues(
        &self,
        project_id: &ProjectId,
        floor_id: Option<&FloorId>,
    ) -> Result<Vec<Issue>, StoreError> {
        self.issues.find_by_project(project_id, floor_id).await
    }

    /// `None` when the issue does not exist or belongs to another project.
    pub async fn issue_detail(
        &self,
        project_id: &ProjectId,
        issue_id: &IssueId,
    ) -> Result<Option<IssueDetail>, StoreError> {
        let Some(issue) = self.issues.find_by_id(issue_id).await? else {
            return Ok(None);
        };
        if issue.project_id() != project_id {
            return Ok(None);
        }

        let mut photos = self.photos.find_by_issue(issue_id).await?;
        photos.sort_by(|a, b| {
            b.uploaded_at()
                .cmp(&a.uploaded_at())
                .then_with(|| a.photo_id().cmp(b.photo_id()))
        });
        Ok(Some(IssueDetail { issue, photos }))
    }

    /// A time-limited URL for a photo; `None` when the photo is unknown.
    pub async fn photo_url(
        &self,
        photo_id: &PhotoId,
        ttl: Duration,
    ) -> Result<Option<PhotoUrl>, StoreError> {
        let Some(photo) = self.photos.find_by_id(photo_id).await? else {
            return Ok(None);
        };
        let url = self.storage.signed_url(photo.storage_key(), ttl).await?;
        Ok(Some(PhotoUrl { photo, url }))
    }

    /// Floors of a building in ascending floor-number order.
    pub async fn list_floors(&self, building_id: &BuildingId) -> Result<Vec<Floor>, StoreError> {
        self.floors.find_by_building(building_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::Duration as ChronoDuration;

    use super::IssueQueries;
    use crate::model::fixtures::{new_issue, t0, three_floors};
    use crate::model::{BuildingId, Issue, IssueId, Photo, PhotoId, PhotoPhase, ProjectId};
    use crate::store::{IssueRepository, MemoryStore, PhotoRepository, PhotoStorage};

    fn queries(store: &Arc<MemoryStore>) -> IssueQueries {
        IssueQueries::new(store.clone(), store.clone(), store.clone(), store.clone())
    }

    #[tokio::test]
    async fn detail_orders_photos_newest_first_and_hides_other_projects() {
        let store = Arc::new(MemoryStore::new());
        let issue = Issue::open(new_issue("i-1"), t0()).unwrap();
        IssueRepository::save(&*store, &issue).await.unwrap();
        for (id, minutes) in [("ph-a", 1), ("ph-b", 30), ("ph-c", 10)] {
            let photo = Photo::new(
                PhotoId::new(id).unwrap(),
                issue.issue_id().clone(),
                format!("k/{id}.jpg"),
                PhotoPhase::Before,
                t0() + ChronoDuration::minutes(minutes),
            )
            .unwrap();
            PhotoRepository::save(&*store, &photo).await.unwrap();
        }

        let queries = queries(&store);
        let detail = queries
            .issue_detail(issue.project_id(), issue.issue_id())
            .await
            .unwrap()
            .expect("detail");
        let order = detail
            .photos
            .iter()
            .map(|p| p.photo_id().as_str())
            .collect::<Vec<_>>();
        assert_eq!(order, ["ph-b", "ph-c", "ph-a"]);

        let other = ProjectId::new("proj-9").unwrap();
        assert!(queries
            .issue_detail(&other, issue.issue_id())
            .await
            .unwrap()
            .is_none());
        assert!(queries
            .issue_detail(issue.project_id(), &IssueId::new("missing").unwrap())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn photo_url_signs_the_stored_key() {
        let store = Arc::new(MemoryStore::new());
        store.upload("k/ph-1.jpg", b"jpg", "image/jpeg").await.unwrap();
        let photo = Photo::new(
            PhotoId::new("ph-1").unwrap(),
            IssueId::new("i-1").unwrap(),
            "k/ph-1.jpg",
            PhotoPhase::After,
            t0(),
        )
        .unwrap();
        PhotoRepository::save(&*store, &photo).await.unwrap();

        let queries = queries(&store);
        let signed = queries
            .photo_url(photo.photo_id(), Duration::from_secs(3600))
            .await
            .unwrap()
            .expect("url");
        assert!(signed.url.starts_with("memory://k/ph-1.jpg?expires="));
        assert_eq!(signed.photo, photo);

        let missing = queries
            .photo_url(&PhotoId::new("nope").unwrap(), Duration::from_secs(60))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn floors_are_listed_per_building() {
        let store = Arc::new(MemoryStore::with_floors(three_floors()));
        let queries = queries(&store);
        let floors = queries
            .list_floors(&BuildingId::new("bldg-1").unwrap())
            .await
            .unwrap();
        assert_eq!(floors.len(), 3);
        assert!(queries
            .list_floors(&BuildingId::new("bldg-x").unwrap())
            .await
            .unwrap()
            .is_empty());
    }
}
