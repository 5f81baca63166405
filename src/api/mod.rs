// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! HTTP surface.
//!
//! A JSON API over the issue workflow and queries. Handlers only translate between wire shapes
//! and commands; evidence and lifecycle rules are enforced by [`crate::ops::IssueWorkflow`].

mod error;
mod server;
pub mod types;

pub use error::ApiError;
pub use server::{router, AppState};
