// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Punchlist: construction-site issue tracking.
//!
//! Issues are anchored to a model element or a world position, carry BEFORE/AFTER photo
//! evidence, and move through a small lifecycle gated on that evidence. The `viewer` module
//! holds the engine-independent interaction core used to place and select issues in a 3D model.

pub mod api;
pub mod config;
pub mod model;
pub mod ops;
pub mod query;
pub mod store;
pub mod viewer;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::ops::{CreateIssue, PhotoUpload};
    use crate::query::IssueQueries;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn one_memory_store_backs_commands_and_queries() {
        let store = Arc::new(MemoryStore::new());
        let workflow =
            crate::ops::IssueWorkflow::new(store.clone(), store.clone(), store.clone());
        let queries = IssueQueries::new(store.clone(), store.clone(), store.clone(), store);

        let issue = workflow
            .create_issue(CreateIssue {
                project_id: "proj-1".parse().unwrap(),
                floor_id: "floor-1".parse().unwrap(),
                title: "Missing handrail".to_owned(),
                description: "Stair 2 between 1F and 2F".to_owned(),
                issue_type: None,
                priority: Default::default(),
                reported_by: None,
                location: crate::model::Location::element("812").unwrap(),
                photos: vec![PhotoUpload {
                    file_name: "stair.jpg".to_owned(),
                    content_type: "image/jpeg".to_owned(),
                    bytes: vec![0xff, 0xd8],
                }],
            })
            .await
            .unwrap();

        let detail = queries
            .issue_detail(issue.project_id(), issue.issue_id())
            .await
            .unwrap()
            .expect("created issue is visible to queries");
        assert_eq!(detail.photos.len(), 1);
    }
}
