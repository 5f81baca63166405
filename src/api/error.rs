// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::types::ErrorBody;
use crate::ops::{OpError, OpErrorKind};
use crate::store::StoreError;
use crate::viewer::TokenError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or missing request fields.
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    /// Body that could not be read or decoded into the request type.
    #[error("{}", .0.body_text())]
    Body(#[from] JsonRejection),
    #[error(transparent)]
    Op(#[from] OpError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Body(JsonRejection::BytesRejection(rejection)) => rejection.status(),
            Self::Body(_) => StatusCode::BAD_REQUEST,
            Self::Op(err) => match err.kind() {
                OpErrorKind::Validation | OpErrorKind::Transition | OpErrorKind::Evidence => {
                    StatusCode::BAD_REQUEST
                }
                OpErrorKind::NotFound => StatusCode::NOT_FOUND,
                OpErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Token(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Machine-readable error kind for the `details` field.
    pub fn details(&self) -> &'static str {
        match self {
            Self::BadRequest(_) | Self::Body(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Op(err) => match err.kind() {
                OpErrorKind::Validation => "validation",
                OpErrorKind::Transition => "invalid_status_transition",
                OpErrorKind::Evidence => "missing_evidence",
                OpErrorKind::NotFound => "not_found",
                OpErrorKind::Store => "store",
            },
            Self::Store(_) => "store",
            Self::Token(_) => "viewer_token_unavailable",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }
        let body = ErrorBody {
            error: self.to_string(),
            details: self.details().to_owned(),
        };
        (status, Json(body)).into_response()
    }
}
