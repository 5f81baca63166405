// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! On-disk record shapes. Kept separate from the model so the model stays serde-free.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    BuildingId, Floor, FloorId, Issue, IssueId, IssuePriority, IssueStatus, Location,
    LocationKind, NewIssue, Photo, PhotoId, PhotoPhase, ProjectId,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub issue_id: String,
    pub project_id: String,
    pub floor_id: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,
    pub priority: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_by: Option<String>,
    pub status: String,
    pub location_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world_position_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world_position_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world_position_z: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Issue> for IssueRecord {
    fn from(issue: &Issue) -> Self {
        let location = issue.location();
        let position = location.position();
        Self {
            issue_id: issue.issue_id().to_string(),
            project_id: issue.project_id().to_string(),
            floor_id: issue.floor_id().to_string(),
            title: issue.title().to_owned(),
            description: issue.description().to_owned(),
            issue_type: issue.issue_type().map(str::to_owned),
            priority: issue.priority().as_str().to_owned(),
            reported_by: issue.reported_by().map(str::to_owned),
            status: issue.status().as_str().to_owned(),
            location_type: location.kind().as_str().to_owned(),
            db_id: location.db_id().map(str::to_owned),
            world_position_x: position.map(|p| p.x()),
            world_position_y: position.map(|p| p.y()),
            world_position_z: position.map(|p| p.z()),
            created_at: issue.created_at(),
            updated_at: issue.updated_at(),
        }
    }
}

impl IssueRecord {
    pub fn into_issue(self) -> Result<Issue, String> {
        let location = match self.location_type.parse::<LocationKind>() {
            Ok(LocationKind::DbId) => {
                Location::element(self.db_id.unwrap_or_default()).map_err(|e| e.to_string())?
            }
            Ok(LocationKind::WorldPosition) => {
                match (self.world_position_x, self.world_position_y, self.world_position_z) {
                    (Some(x), Some(y), Some(z)) => {
                        Location::world_position(x, y, z).map_err(|e| e.to_string())?
                    }
                    _ => return Err("world position is missing a coordinate".to_owned()),
                }
            }
            Err(err) => return Err(err.to_string()),
        };

        let new = NewIssue {
            issue_id: IssueId::new(self.issue_id).map_err(|e| e.to_string())?,
            project_id: ProjectId::new(self.project_id).map_err(|e| e.to_string())?,
            floor_id: FloorId::new(self.floor_id).map_err(|e| e.to_string())?,
            title: self.title,
            description: self.description,
            issue_type: self.issue_type,
            priority: self
                .priority
                .parse::<IssuePriority>()
                .map_err(|e| e.to_string())?,
            reported_by: self.reported_by,
            location,
        };
        let status = self
            .status
            .parse::<IssueStatus>()
            .map_err(|e| e.to_string())?;
        Issue::restore(new, status, self.created_at, self.updated_at).map_err(|e| e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub photo_id: String,
    pub issue_id: String,
    pub storage_key: String,
    pub phase: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<&Photo> for PhotoRecord {
    fn from(photo: &Photo) -> Self {
        Self {
            photo_id: photo.photo_id().to_string(),
            issue_id: photo.issue_id().to_string(),
            storage_key: photo.storage_key().to_owned(),
            phase: photo.phase().as_str().to_owned(),
            uploaded_at: photo.uploaded_at(),
        }
    }
}

impl PhotoRecord {
    pub fn into_photo(self) -> Result<Photo, String> {
        Photo::new(
            PhotoId::new(self.photo_id).map_err(|e| e.to_string())?,
            IssueId::new(self.issue_id).map_err(|e| e.to_string())?,
            self.storage_key,
            self.phase.parse::<PhotoPhase>().map_err(|e| e.to_string())?,
            self.uploaded_at,
        )
        .map_err(|e| e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorRecord {
    pub floor_id: String,
    pub building_id: String,
    pub name: String,
    pub floor_number: i32,
}

impl From<&Floor> for FloorRecord {
    fn from(floor: &Floor) -> Self {
        Self {
            floor_id: floor.floor_id().to_string(),
            building_id: floor.building_id().to_string(),
            name: floor.name().to_owned(),
            floor_number: floor.floor_number(),
        }
    }
}

impl FloorRecord {
    pub fn into_floor(self) -> Result<Floor, String> {
        Floor::new(
            FloorId::new(self.floor_id).map_err(|e| e.to_string())?,
            BuildingId::new(self.building_id).map_err(|e| e.to_string())?,
            self.name,
            self.floor_number,
        )
        .map_err(|e| e.to_string())
    }
}

/// Sidecar kept next to a stored photo blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobMetaRecord {
    pub content_type: String,
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::IssueRecord;
    use crate::model::fixtures::{new_issue, t0};
    use crate::model::{Issue, Location, NewIssue};

    #[test]
    fn world_position_issue_survives_json() {
        let issue = Issue::open(
            NewIssue {
                location: Location::world_position(10.5, 20.5, 30.5).unwrap(),
                ..new_issue("i-wp")
            },
            t0(),
        )
        .unwrap();

        let json = serde_json::to_string(&IssueRecord::from(&issue)).unwrap();
        assert!(json.contains("\"location_type\":\"worldPosition\""));
        assert!(!json.contains("db_id"));

        let record: IssueRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record.into_issue().unwrap(), issue);
    }

    #[test]
    fn record_with_missing_coordinate_is_rejected() {
        let issue = Issue::open(new_issue("i-1"), t0()).unwrap();
        let mut record = IssueRecord::from(&issue);
        record.location_type = "worldPosition".to_owned();
        record.world_position_x = Some(1.0);
        assert!(record.into_issue().is_err());
    }
}
