// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Directory-backed store.
//!
//! Layout under the root:
//!
//! ```text
//! floors.json                 building floor catalog (read-only for the tracker)
//! issues/<issue-id>.json      one record per issue
//! photos/<photo-id>.json      one record per photo
//! blobs/<key>                 photo bytes, keyed by blob key
//! blob-meta/<key>.json        content type and size of the matching blob
//! ```
//!
//! Every write goes through a temp file plus atomic rename, so readers never observe partial
//! records.

use std::fs;
use std::io;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::memory::sort_newest_first;
use super::records::{BlobMetaRecord, FloorRecord, IssueRecord, PhotoRecord};
use super::{
    clamp_signed_url_ttl, validate_blob_key, FloorRepository, IssueRepository, PhotoRepository,
    PhotoStorage, StoreError,
};
use crate::model::{
    BuildingId, Floor, FloorId, Issue, IssueId, Photo, PhotoId, PhotoPhase, ProjectId,
};

const FLOORS_FILENAME: &str = "floors.json";
const ISSUES_DIR: &str = "issues";
const PHOTOS_DIR: &str = "photos";
const BLOBS_DIR: &str = "blobs";
const BLOB_META_DIR: &str = "blob-meta";
const TEMP_FILE_PREFIX: &str = ".punchlist.tmp.";

/// How hard the folder store tries to get records and photo blobs onto disk.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Temp file plus atomic rename, no fsync. A crash may lose the latest writes but never
    /// leaves a half-written record behind.
    #[default]
    BestEffort,

    /// Also syncs the temp file before the rename and the parent directory after it (on Unix).
    Durable,
}

#[derive(Debug, Clone)]
pub struct FolderStore {
    root: PathBuf,
    durability: WriteDurability,
    public_base_url: Option<String>,
}

impl FolderStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            durability: WriteDurability::default(),
            public_base_url: None,
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    /// Base URL that blob keys are appended to when signing URLs. Without it, signed URLs
    /// point at the blob file on disk.
    pub fn with_public_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.public_base_url = Some(base_url.trim_end_matches('/').to_owned());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn floors_path(&self) -> PathBuf {
        self.root.join(FLOORS_FILENAME)
    }

    /// Replaces the floor catalog.
    pub fn save_floors(&self, floors: &[Floor]) -> Result<(), StoreError> {
        let records = floors.iter().map(FloorRecord::from).collect::<Vec<_>>();
        self.write_json(Path::new(FLOORS_FILENAME), &records)
    }

    /// Content type recorded when `key` was uploaded, or `None` if nothing is stored under it.
    pub fn blob_content_type(&self, key: &str) -> Result<Option<String>, StoreError> {
        let meta: Option<BlobMetaRecord> = self.read_json(&Self::blob_meta_relative_path(key)?)?;
        Ok(meta.map(|meta| meta.content_type))
    }

    fn issue_relative_path(issue_id: &IssueId) -> PathBuf {
        Path::new(ISSUES_DIR).join(format!("{}.json", encode_file_segment(issue_id.as_str())))
    }

    fn photo_relative_path(photo_id: &PhotoId) -> PathBuf {
        Path::new(PHOTOS_DIR).join(format!("{}.json", encode_file_segment(photo_id.as_str())))
    }

    fn blob_relative_path(key: &str) -> Result<PathBuf, StoreError> {
        Self::keyed_path(BLOBS_DIR, key, "")
    }

    fn blob_meta_relative_path(key: &str) -> Result<PathBuf, StoreError> {
        Self::keyed_path(BLOB_META_DIR, key, ".json")
    }

    fn keyed_path(dir: &str, key: &str, suffix: &str) -> Result<PathBuf, StoreError> {
        validate_blob_key(key)?;
        let mut path = PathBuf::from(dir);
        let mut segments = key.split('/').peekable();
        while let Some(segment) = segments.next() {
            let mut encoded = encode_file_segment(segment);
            if segments.peek().is_none() {
                encoded.push_str(suffix);
            }
            path.push(encoded);
        }
        Ok(path)
    }

    fn write_json<T: Serialize>(&self, relative: &Path, value: &T) -> Result<(), StoreError> {
        let path = self.root.join(relative);
        let mut contents = serde_json::to_vec_pretty(value)
            .map_err(|source| StoreError::Json { path, source })?;
        contents.push(b'\n');
        write_atomic(&self.root, relative, &contents, self.durability)
    }

    fn read_json<T: DeserializeOwned>(&self, relative: &Path) -> Result<Option<T>, StoreError> {
        let path = self.root.join(relative);
        let Some(bytes) = read_regular_file(&path)? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Json { path, source })
    }

    fn read_all_json<T: DeserializeOwned>(
        &self,
        dir: &str,
    ) -> Result<Vec<(PathBuf, T)>, StoreError> {
        let dir_path = self.root.join(dir);
        let entries = match fs::read_dir(&dir_path) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(io_at(&dir_path)(source)),
        };

        let mut out = Vec::new();
        for entry in entries {
            let entry = entry.map_err(io_at(&dir_path))?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(TEMP_FILE_PREFIX) || !name.ends_with(".json") {
                continue;
            }
            let relative = Path::new(dir).join(name.as_ref());
            if let Some(value) = self.read_json(&relative)? {
                out.push((self.root.join(relative), value));
            }
        }
        Ok(out)
    }

    fn load_issues(&self) -> Result<Vec<Issue>, StoreError> {
        self.read_all_json::<IssueRecord>(ISSUES_DIR)?
            .into_iter()
            .map(|(path, record)| {
                record
                    .into_issue()
                    .map_err(|reason| StoreError::Corrupt { path, reason })
            })
            .collect()
    }

    fn load_photos(&self) -> Result<Vec<Photo>, StoreError> {
        self.read_all_json::<PhotoRecord>(PHOTOS_DIR)?
            .into_iter()
            .map(|(path, record)| {
                record
                    .into_photo()
                    .map_err(|reason| StoreError::Corrupt { path, reason })
            })
            .collect()
    }

    fn load_floors(&self) -> Result<Vec<Floor>, StoreError> {
        let path = self.floors_path();
        let records: Vec<FloorRecord> = self
            .read_json(Path::new(FLOORS_FILENAME))?
            .unwrap_or_default();
        records
            .into_iter()
            .map(|record| {
                record.into_floor().map_err(|reason| StoreError::Corrupt {
                    path: path.clone(),
                    reason,
                })
            })
            .collect()
    }

    fn remove_relative(&self, relative: &Path) -> Result<(), StoreError> {
        let path = self.root.join(relative);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

#[async_trait]
impl IssueRepository for FolderStore {
    async fn save(&self, issue: &Issue) -> Result<(), StoreError> {
        let record = IssueRecord::from(issue);
        self.write_json(&Self::issue_relative_path(issue.issue_id()), &record)
    }

    async fn find_by_id(&self, issue_id: &IssueId) -> Result<Option<Issue>, StoreError> {
        let relative = Self::issue_relative_path(issue_id);
        let Some(record) = self.read_json::<IssueRecord>(&relative)? else {
            return Ok(None);
        };
        record
            .into_issue()
            .map(Some)
            .map_err(|reason| StoreError::Corrupt {
                path: self.root.join(relative),
                reason,
            })
    }

    async fn find_by_project(
        &self,
        project_id: &ProjectId,
        floor_id: Option<&FloorId>,
    ) -> Result<Vec<Issue>, StoreError> {
        let mut issues = self
            .load_issues()?
            .into_iter()
            .filter(|issue| issue.project_id() == project_id)
            .filter(|issue| floor_id.map_or(true, |floor_id| issue.floor_id() == floor_id))
            .collect::<Vec<_>>();
        sort_newest_first(&mut issues);
        Ok(issues)
    }

    async fn delete(&self, issue_id: &IssueId) -> Result<(), StoreError> {
        self.remove_relative(&Self::issue_relative_path(issue_id))
    }
}

#[async_trait]
impl PhotoRepository for FolderStore {
    async fn save(&self, photo: &Photo) -> Result<(), StoreError> {
        let record = PhotoRecord::from(photo);
        self.write_json(&Self::photo_relative_path(photo.photo_id()), &record)
    }

    async fn find_by_id(&self, photo_id: &PhotoId) -> Result<Option<Photo>, StoreError> {
        let relative = Self::photo_relative_path(photo_id);
        let Some(record) = self.read_json::<PhotoRecord>(&relative)? else {
            return Ok(None);
        };
        record
            .into_photo()
            .map(Some)
            .map_err(|reason| StoreError::Corrupt {
                path: self.root.join(relative),
                reason,
            })
    }

    async fn find_by_issue(&self, issue_id: &IssueId) -> Result<Vec<Photo>, StoreError> {
        Ok(self
            .load_photos()?
            .into_iter()
            .filter(|photo| photo.issue_id() == issue_id)
            .collect())
    }

    async fn count_by_phase(
        &self,
        issue_id: &IssueId,
        phase: PhotoPhase,
    ) -> Result<usize, StoreError> {
        Ok(self
            .load_photos()?
            .iter()
            .filter(|photo| photo.issue_id() == issue_id && photo.phase() == phase)
            .count())
    }

    async fn delete_by_issue(&self, issue_id: &IssueId) -> Result<(), StoreError> {
        for photo in self.find_by_issue(issue_id).await? {
            self.remove_relative(&Self::photo_relative_path(photo.photo_id()))?;
        }
        Ok(())
    }
}

#[async_trait]
impl FloorRepository for FolderStore {
    async fn find_by_building(&self, building_id: &BuildingId) -> Result<Vec<Floor>, StoreError> {
        let mut floors = self
            .load_floors()?
            .into_iter()
            .filter(|floor| floor.building_id() == building_id)
            .collect::<Vec<_>>();
        floors.sort_by_key(Floor::floor_number);
        Ok(floors)
    }

    async fn find_by_id(&self, floor_id: &FloorId) -> Result<Option<Floor>, StoreError> {
        Ok(self
            .load_floors()?
            .into_iter()
            .find(|floor| floor.floor_id() == floor_id))
    }
}

#[async_trait]
impl PhotoStorage for FolderStore {
    async fn upload(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StoreError> {
        let relative = Self::blob_relative_path(key)?;
        write_atomic(&self.root, &relative, bytes, self.durability)?;
        let meta = BlobMetaRecord {
            content_type: content_type.to_owned(),
            size: bytes.len() as u64,
        };
        self.write_json(&Self::blob_meta_relative_path(key)?, &meta)?;
        tracing::debug!(key, content_type, size = bytes.len(), "stored photo blob");
        Ok(key.to_owned())
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String, StoreError> {
        let relative = Self::blob_relative_path(key)?;
        let path = self.root.join(&relative);
        if regular_file_len(&path)?.is_none() {
            return Err(StoreError::BlobNotFound {
                key: key.to_owned(),
            });
        }

        let expires = Utc::now().timestamp() + clamp_signed_url_ttl(ttl).as_secs() as i64;
        Ok(match &self.public_base_url {
            Some(base_url) => format!("{base_url}/{key}?expires={expires}"),
            None => format!("file://{}?expires={expires}", path.display()),
        })
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.remove_relative(&Self::blob_relative_path(key)?)?;
        self.remove_relative(&Self::blob_meta_relative_path(key)?)
    }
}

// Extracted filesystem helpers for `FolderStore`.
include!("folder/helpers.rs");
