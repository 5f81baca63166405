// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Access tokens for the rendering engine.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("viewer token unavailable: {reason}")]
pub struct TokenError {
    pub reason: String,
}

/// Where fresh tokens come from.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch(&self) -> Result<ViewerToken, TokenError>;
}

/// Serves one configured token, re-stamped with a fixed lifetime on every fetch.
#[derive(Debug, Clone)]
pub struct StaticTokenSource {
    token: String,
    lifetime: Duration,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>, lifetime: Duration) -> Self {
        Self {
            token: token.into(),
            lifetime,
        }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn fetch(&self) -> Result<ViewerToken, TokenError> {
        if self.token.trim().is_empty() {
            return Err(TokenError {
                reason: "no viewer token configured".to_owned(),
            });
        }
        Ok(ViewerToken {
            access_token: self.token.clone(),
            expires_at: Utc::now() + self.lifetime,
        })
    }
}

/// Reuses a token until shortly before it expires. Concurrent callers share one refresh.
pub struct CachedTokenProvider {
    source: Arc<dyn TokenSource>,
    refresh_margin: Duration,
    cached: Mutex<Option<ViewerToken>>,
}

impl std::fmt::Debug for CachedTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedTokenProvider")
            .field("refresh_margin", &self.refresh_margin)
            .finish_non_exhaustive()
    }
}

impl CachedTokenProvider {
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        Self {
            source,
            refresh_margin: Duration::seconds(60),
            cached: Mutex::new(None),
        }
    }

    pub async fn token(&self) -> Result<ViewerToken, TokenError> {
        self.token_at(Utc::now()).await
    }

    pub async fn token_at(&self, now: DateTime<Utc>) -> Result<ViewerToken, TokenError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if now + self.refresh_margin < token.expires_at {
                return Ok(token.clone());
            }
        }
        let fresh = self.source.fetch().await?;
        tracing::debug!(expires_at = %fresh.expires_at, "viewer token refreshed");
        *cached = Some(fresh.clone());
        Ok(fresh)
    }
}
