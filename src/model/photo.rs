// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::{IssueId, ModelError, PhotoId, ProjectId};

/// Whether a photo documents the defect (`Before`) or its repair (`After`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PhotoPhase {
    Before,
    After,
}

impl PhotoPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Before => "BEFORE",
            Self::After => "AFTER",
        }
    }
}

impl fmt::Display for PhotoPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid photo phase '{value}' (expected BEFORE or AFTER)")]
pub struct ParsePhotoPhaseError {
    value: String,
}

impl FromStr for PhotoPhase {
    type Err = ParsePhotoPhaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BEFORE" => Ok(Self::Before),
            "AFTER" => Ok(Self::After),
            _ => Err(ParsePhotoPhaseError {
                value: s.to_owned(),
            }),
        }
    }
}

/// Photographic evidence attached to an issue. Append-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    photo_id: PhotoId,
    issue_id: IssueId,
    storage_key: String,
    phase: PhotoPhase,
    uploaded_at: DateTime<Utc>,
}

impl Photo {
    pub fn new(
        photo_id: PhotoId,
        issue_id: IssueId,
        storage_key: impl Into<String>,
        phase: PhotoPhase,
        uploaded_at: DateTime<Utc>,
    ) -> Result<Self, ModelError> {
        let storage_key = storage_key.into();
        if storage_key.trim().is_empty() {
            return Err(ModelError::EmptyField {
                field: "storageKey",
            });
        }
        Ok(Self {
            photo_id,
            issue_id,
            storage_key,
            phase,
            uploaded_at,
        })
    }

    pub fn photo_id(&self) -> &PhotoId {
        &self.photo_id
    }

    pub fn issue_id(&self) -> &IssueId {
        &self.issue_id
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn phase(&self) -> PhotoPhase {
        self.phase
    }

    pub fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }
}

/// Builds the blob key `projects/{project}/issues/{issue}/photos/{photo}.{ext}`.
///
/// `ext` is the lower-cased extension of `file_name`, or `bin` when there is none.
pub fn photo_storage_key(
    project_id: &ProjectId,
    issue_id: &IssueId,
    photo_id: &PhotoId,
    file_name: &str,
) -> String {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "bin".to_owned());
    format!("projects/{project_id}/issues/{issue_id}/photos/{photo_id}.{ext}")
}
