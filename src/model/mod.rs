// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core domain model.
//!
//! Issues are anchored to a model element or a world position and move through a small
//! lifecycle. Photos and floors are separate aggregates referenced by id.

#[cfg(test)]
pub(crate) mod fixtures;
pub mod floor;
pub mod ids;
pub mod issue;
pub mod location;
pub mod photo;

pub use floor::Floor;
pub use ids::{BuildingId, FloorId, Id, IdError, IdKind, IssueId, PhotoId, ProjectId};
pub use issue::{
    InvalidStatusTransition, Issue, IssuePriority, IssueStatus, NewIssue, ParseIssuePriorityError,
    ParseIssueStatusError,
};
pub use location::{Location, LocationKind, ParseLocationKindError, WorldPosition};
pub use photo::{photo_storage_key, ParsePhotoPhaseError, Photo, PhotoPhase};

/// Structural validation failures of model values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("coordinate {axis} must be a finite number")]
    NonFiniteCoordinate { axis: &'static str },
    #[error("updatedAt must not precede createdAt")]
    UpdatedBeforeCreated,
    #[error(transparent)]
    Id(#[from] IdError),
}
