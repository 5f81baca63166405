// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Floor, Issue, Photo};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldPositionDto {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueDto {
    pub issue_id: String,
    pub project_id: String,
    pub floor_id: String,
    pub title: String,
    pub description: String,
    pub issue_type: Option<String>,
    pub priority: String,
    pub status: String,
    pub reported_by: Option<String>,
    pub location_type: String,
    pub db_id: Option<String>,
    pub world_position: Option<WorldPositionDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Issue> for IssueDto {
    fn from(issue: &Issue) -> Self {
        let location = issue.location();
        Self {
            issue_id: issue.issue_id().to_string(),
            project_id: issue.project_id().to_string(),
            floor_id: issue.floor_id().to_string(),
            title: issue.title().to_owned(),
            description: issue.description().to_owned(),
            issue_type: issue.issue_type().map(str::to_owned),
            priority: issue.priority().as_str().to_owned(),
            status: issue.status().as_str().to_owned(),
            reported_by: issue.reported_by().map(str::to_owned),
            location_type: location.kind().as_str().to_owned(),
            db_id: location.db_id().map(str::to_owned),
            world_position: location.position().map(|p| WorldPositionDto {
                x: p.x(),
                y: p.y(),
                z: p.z(),
            }),
            created_at: issue.created_at(),
            updated_at: issue.updated_at(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoDto {
    pub photo_id: String,
    pub issue_id: String,
    pub storage_key: String,
    pub photo_phase: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<&Photo> for PhotoDto {
    fn from(photo: &Photo) -> Self {
        Self {
            photo_id: photo.photo_id().to_string(),
            issue_id: photo.issue_id().to_string(),
            storage_key: photo.storage_key().to_owned(),
            photo_phase: photo.phase().as_str().to_owned(),
            uploaded_at: photo.uploaded_at(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorDto {
    pub floor_id: String,
    pub building_id: String,
    pub name: String,
    pub floor_number: i32,
}

impl From<&Floor> for FloorDto {
    fn from(floor: &Floor) -> Self {
        Self {
            floor_id: floor.floor_id().to_string(),
            building_id: floor.building_id().to_string(),
            name: floor.name().to_owned(),
            floor_number: floor.floor_number(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListIssuesQuery {
    pub floor_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListIssuesResponse {
    pub issues: Vec<IssueDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueDetailResponse {
    #[serde(flatten)]
    pub issue: IssueDto,
    pub photos: Vec<PhotoDto>,
}

/// An image in a JSON body: base64 bytes, optionally as a `data:` URL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoPayload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssueRequest {
    pub floor_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub issue_type: Option<String>,
    pub priority: Option<String>,
    pub reported_by: Option<String>,
    /// `dbId` or `worldPosition`.
    pub location_type: Option<String>,
    pub db_id: Option<String>,
    pub world_position_x: Option<f64>,
    pub world_position_y: Option<f64>,
    pub world_position_z: Option<f64>,
    #[serde(default)]
    pub photos: Vec<PhotoPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssueResponse {
    pub issue_id: String,
    pub issue: IssueDto,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePriorityRequest {
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPhotoRequest {
    pub photo_phase: Option<String>,
    #[serde(flatten)]
    pub photo: PhotoPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPhotoResponse {
    pub photo_id: String,
    pub blob_key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoUrlQuery {
    pub expiration_minutes: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoUrlResponse {
    pub url: String,
    pub expires_in_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListFloorsResponse {
    pub floors: Vec<FloorDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerTokenResponse {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
}
