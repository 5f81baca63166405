// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Issue workflow commands.
//!
//! The workflow is the single place where photo evidence gates lifecycle changes. It composes
//! the [`Issue`] state machine with the photo collaborators: creating an issue requires at least
//! one BEFORE photo, any status change requires one, and moving to DONE also requires an AFTER
//! photo.

use std::sync::Arc;

use chrono::Utc;

use crate::model::{
    photo_storage_key, FloorId, InvalidStatusTransition, Issue, IssueId, IssuePriority,
    IssueStatus, Location, ModelError, NewIssue, Photo, PhotoId, PhotoPhase, ProjectId,
};
use crate::store::{IssueRepository, PhotoRepository, PhotoStorage, StoreError};

/// An uploaded image attached to a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIssue {
    pub project_id: ProjectId,
    pub floor_id: FloorId,
    pub title: String,
    pub description: String,
    pub issue_type: Option<String>,
    pub priority: IssuePriority,
    pub reported_by: Option<String>,
    pub location: Location,
    /// Stored as BEFORE photos together with the issue.
    pub photos: Vec<PhotoUpload>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStatus {
    pub project_id: ProjectId,
    pub issue_id: IssueId,
    pub status: IssueStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddPhoto {
    pub project_id: ProjectId,
    pub issue_id: IssueId,
    pub phase: PhotoPhase,
    pub photo: PhotoUpload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangePriority {
    pub project_id: ProjectId,
    pub issue_id: IssueId,
    pub priority: IssuePriority,
}

/// Evidence the workflow requires but could not find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MissingEvidence {
    #[error("missing evidence: at least one BEFORE photo is required")]
    BeforePhoto,
    #[error("missing evidence: at least one AFTER photo is required to mark the issue DONE")]
    AfterPhoto,
}

#[derive(Debug, thiserror::Error)]
pub enum OpError {
    #[error(transparent)]
    Validation(#[from] ModelError),
    #[error("photo '{file_name}' is empty")]
    EmptyPhoto { file_name: String },
    #[error(transparent)]
    Transition(#[from] InvalidStatusTransition),
    #[error(transparent)]
    Evidence(#[from] MissingEvidence),
    #[error("issue not found: {issue_id}")]
    IssueNotFound { issue_id: IssueId },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpErrorKind {
    Validation,
    Transition,
    Evidence,
    NotFound,
    Store,
}

impl OpError {
    pub fn kind(&self) -> OpErrorKind {
        match self {
            Self::Validation(_) | Self::EmptyPhoto { .. } => OpErrorKind::Validation,
            Self::Transition(_) => OpErrorKind::Transition,
            Self::Evidence(_) => OpErrorKind::Evidence,
            Self::IssueNotFound { .. } => OpErrorKind::NotFound,
            Self::Store(_) => OpErrorKind::Store,
        }
    }
}

/// Applies issue commands against the persistence and blob collaborators.
#[derive(Clone)]
pub struct IssueWorkflow {
    issues: Arc<dyn IssueRepository>,
    photos: Arc<dyn PhotoRepository>,
    storage: Arc<dyn PhotoStorage>,
}

impl std::fmt::Debug for IssueWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssueWorkflow").finish_non_exhaustive()
    }
}

// Extracted command implementations for `IssueWorkflow`.
include!("ops_impl.rs");
