// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use base64::Engine;

use crate::model::{
    BuildingId, FloorId, Id, IdKind, IssueId, IssuePriority, IssueStatus, Location, LocationKind,
    PhotoId, PhotoPhase, ProjectId,
};
use crate::ops::{
    AddPhoto, ChangePriority, CreateIssue, IssueWorkflow, OpError, PhotoUpload, UpdateStatus,
};
use crate::query::IssueQueries;
use crate::store::{
    FloorRepository, IssueRepository, PhotoRepository, PhotoStorage, MAX_SIGNED_URL_TTL,
};
use crate::viewer::CachedTokenProvider;

use super::types::*;
use super::ApiError;

const DEFAULT_PHOTO_URL_TTL: Duration = Duration::from_secs(60 * 60);
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    workflow: IssueWorkflow,
    queries: IssueQueries,
    tokens: Option<Arc<CachedTokenProvider>>,
    photo_url_ttl: Duration,
}

impl AppState {
    pub fn new(workflow: IssueWorkflow, queries: IssueQueries) -> Self {
        Self {
            workflow,
            queries,
            tokens: None,
            photo_url_ttl: DEFAULT_PHOTO_URL_TTL,
        }
    }

    /// Wires workflow and queries to one store implementing every collaborator.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: IssueRepository + PhotoRepository + FloorRepository + PhotoStorage + 'static,
    {
        let workflow = IssueWorkflow::new(store.clone(), store.clone(), store.clone());
        let queries = IssueQueries::new(store.clone(), store.clone(), store.clone(), store);
        Self::new(workflow, queries)
    }

    pub fn with_token_provider(mut self, tokens: Arc<CachedTokenProvider>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Lifetime of photo URLs when the request does not ask for one.
    pub fn with_photo_url_ttl(mut self, ttl: Duration) -> Self {
        self.photo_url_ttl = ttl;
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/projects/{project}/issues", get(list_issues).post(create_issue))
        .route("/api/projects/{project}/issues/{issue}", get(get_issue))
        .route("/api/projects/{project}/issues/{issue}/status", patch(update_status))
        .route("/api/projects/{project}/issues/{issue}/priority", patch(update_priority))
        .route("/api/projects/{project}/issues/{issue}/photos", post(add_photo))
        .route("/api/photos/{photo}/url", get(photo_url))
        .route("/api/buildings/{building}/floors", get(list_floors))
        .route("/api/viewer/token", get(viewer_token))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

async fn list_issues(
    State(state): State<AppState>,
    Path(project): Path<String>,
    Query(query): Query<ListIssuesQuery>,
) -> Result<Json<ListIssuesResponse>, ApiError> {
    let project_id: ProjectId = parse_id(&project)?;
    let floor_id: Option<FloorId> = match query.floor_id.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(parse_id(raw)?),
        _ => None,
    };

    let issues = state
        .queries
        .list_issues(&project_id, floor_id.as_ref())
        .await?;
    Ok(Json(ListIssuesResponse {
        issues: issues.iter().map(IssueDto::from).collect(),
    }))
}

async fn create_issue(
    State(state): State<AppState>,
    Path(project): Path<String>,
    body: Result<Json<CreateIssueRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateIssueResponse>), ApiError> {
    let Json(body) = body?;
    let project_id: ProjectId = parse_id(&project)?;

    let (Some(floor_id), Some(title), Some(description)) = (
        non_blank(body.floor_id),
        non_blank(body.title),
        non_blank(body.description),
    ) else {
        return Err(ApiError::BadRequest(
            "missing required fields: floorId, title, description".to_owned(),
        ));
    };
    let floor_id: FloorId = parse_id(&floor_id)?;

    let location = parse_location(
        body.location_type.as_deref(),
        body.db_id,
        [body.world_position_x, body.world_position_y, body.world_position_z],
    )?;
    let priority = match non_blank(body.priority) {
        Some(raw) => raw
            .parse::<IssuePriority>()
            .map_err(|err| ApiError::BadRequest(err.to_string()))?,
        None => IssuePriority::default(),
    };
    let photos = body
        .photos
        .into_iter()
        .enumerate()
        .map(|(index, payload)| decode_photo(payload, index))
        .collect::<Result<Vec<_>, _>>()?;

    let issue = state
        .workflow
        .create_issue(CreateIssue {
            project_id,
            floor_id,
            title,
            description,
            issue_type: non_blank(body.issue_type),
            priority,
            reported_by: non_blank(body.reported_by),
            location,
            photos,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateIssueResponse {
            issue_id: issue.issue_id().to_string(),
            issue: IssueDto::from(&issue),
        }),
    ))
}

async fn get_issue(
    State(state): State<AppState>,
    Path((project, issue)): Path<(String, String)>,
) -> Result<Json<IssueDetailResponse>, ApiError> {
    let project_id: ProjectId = parse_id(&project)?;
    let issue_id: IssueId = parse_id(&issue)?;

    let detail = state
        .queries
        .issue_detail(&project_id, &issue_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("issue not found: {issue_id}")))?;
    Ok(Json(IssueDetailResponse {
        issue: IssueDto::from(&detail.issue),
        photos: detail.photos.iter().map(PhotoDto::from).collect(),
    }))
}

async fn update_status(
    State(state): State<AppState>,
    Path((project, issue)): Path<(String, String)>,
    body: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<IssueDto>, ApiError> {
    let Json(body) = body?;
    let project_id: ProjectId = parse_id(&project)?;
    let issue_id: IssueId = parse_id(&issue)?;
    let raw = non_blank(body.status)
        .ok_or_else(|| ApiError::BadRequest("missing required field: status".to_owned()))?;
    let status = raw.parse::<IssueStatus>().map_err(|_| {
        ApiError::BadRequest(format!(
            "invalid status '{raw}'; expected one of OPEN, IN_PROGRESS, DONE"
        ))
    })?;

    let issue = state
        .workflow
        .update_status(UpdateStatus {
            project_id,
            issue_id,
            status,
        })
        .await?;
    Ok(Json(IssueDto::from(&issue)))
}

async fn update_priority(
    State(state): State<AppState>,
    Path((project, issue)): Path<(String, String)>,
    body: Result<Json<UpdatePriorityRequest>, JsonRejection>,
) -> Result<Json<IssueDto>, ApiError> {
    let Json(body) = body?;
    let project_id: ProjectId = parse_id(&project)?;
    let issue_id: IssueId = parse_id(&issue)?;
    let priority = non_blank(body.priority)
        .ok_or_else(|| ApiError::BadRequest("missing required field: priority".to_owned()))?
        .parse::<IssuePriority>()
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;

    let issue = state
        .workflow
        .change_priority(ChangePriority {
            project_id,
            issue_id,
            priority,
        })
        .await?;
    Ok(Json(IssueDto::from(&issue)))
}

async fn add_photo(
    State(state): State<AppState>,
    Path((project, issue)): Path<(String, String)>,
    body: Result<Json<AddPhotoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AddPhotoResponse>), ApiError> {
    let Json(body) = body?;
    let project_id: ProjectId = parse_id(&project)?;
    let issue_id: IssueId = parse_id(&issue)?;
    let phase = non_blank(body.photo_phase)
        .ok_or_else(|| ApiError::BadRequest("missing required field: photoPhase".to_owned()))?
        .parse::<PhotoPhase>()
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;
    let photo = decode_photo(body.photo, 0)?;

    let photo = state
        .workflow
        .add_photo(AddPhoto {
            project_id,
            issue_id,
            phase,
            photo,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(AddPhotoResponse {
            photo_id: photo.photo_id().to_string(),
            blob_key: photo.storage_key().to_owned(),
        }),
    ))
}

async fn photo_url(
    State(state): State<AppState>,
    Path(photo): Path<String>,
    Query(query): Query<PhotoUrlQuery>,
) -> Result<Json<PhotoUrlResponse>, ApiError> {
    let photo_id: PhotoId = parse_id(&photo)?;
    let ttl = match query.expiration_minutes {
        Some(0) => {
            return Err(ApiError::BadRequest(
                "expirationMinutes must be positive".to_owned(),
            ))
        }
        Some(minutes) => Duration::from_secs(minutes.saturating_mul(60)),
        None => state.photo_url_ttl,
    }
    .min(MAX_SIGNED_URL_TTL);

    let resolved = state
        .queries
        .photo_url(&photo_id, ttl)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("photo not found: {photo_id}")))?;
    Ok(Json(PhotoUrlResponse {
        url: resolved.url,
        expires_in_seconds: ttl.as_secs(),
    }))
}

async fn list_floors(
    State(state): State<AppState>,
    Path(building): Path<String>,
) -> Result<Json<ListFloorsResponse>, ApiError> {
    let building_id: BuildingId = parse_id(&building)?;
    let floors = state.queries.list_floors(&building_id).await?;
    Ok(Json(ListFloorsResponse {
        floors: floors.iter().map(FloorDto::from).collect(),
    }))
}

async fn viewer_token(
    State(state): State<AppState>,
) -> Result<Json<ViewerTokenResponse>, ApiError> {
    let Some(tokens) = state.tokens.as_ref() else {
        return Err(ApiError::Token(crate::viewer::TokenError {
            reason: "no token source configured".to_owned(),
        }));
    };
    let token = tokens.token().await?;
    Ok(Json(ViewerTokenResponse {
        access_token: token.access_token,
        expires_at: token.expires_at,
    }))
}

fn parse_id<K: IdKind>(raw: &str) -> Result<Id<K>, ApiError> {
    Id::new(raw).map_err(|err| ApiError::BadRequest(err.to_string()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn parse_location(
    location_type: Option<&str>,
    db_id: Option<String>,
    world_position: [Option<f64>; 3],
) -> Result<Location, ApiError> {
    let kind = location_type
        .ok_or_else(|| ApiError::BadRequest("missing required field: locationType".to_owned()))?
        .parse::<LocationKind>()
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;

    let location = match kind {
        LocationKind::DbId => {
            let db_id = non_blank(db_id)
                .ok_or_else(|| ApiError::BadRequest("dbId location requires dbId".to_owned()))?;
            Location::element(db_id)
        }
        LocationKind::WorldPosition => {
            let [Some(x), Some(y), Some(z)] = world_position else {
                return Err(ApiError::BadRequest(
                    "worldPosition requires worldPositionX/Y/Z".to_owned(),
                ));
            };
            Location::world_position(x, y, z)
        }
    };
    location.map_err(|err| ApiError::Op(OpError::Validation(err)))
}

fn decode_photo(payload: PhotoPayload, index: usize) -> Result<PhotoUpload, ApiError> {
    let data = payload
        .data
        .ok_or_else(|| ApiError::BadRequest(format!("photo {index} has no data")))?;
    let encoded = data
        .split_once(";base64,")
        .map_or(data.as_str(), |(_, encoded)| encoded);
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|err| ApiError::BadRequest(format!("photo {index} is not valid base64: {err}")))?;

    Ok(PhotoUpload {
        file_name: non_blank(payload.file_name).unwrap_or_else(|| format!("photo-{index}.bin")),
        content_type: non_blank(payload.content_type)
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_owned()),
        bytes,
    })
}

#[cfg(test)]
mod tests;
