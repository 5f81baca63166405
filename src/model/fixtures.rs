// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::{DateTime, TimeZone, Utc};

use super::ids::{BuildingId, FloorId, IssueId, ProjectId};
use super::issue::{IssuePriority, NewIssue};
use super::location::Location;
use super::Floor;

pub(crate) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 8, 30, 0)
        .single()
        .expect("fixture timestamp")
}

pub(crate) fn new_issue(issue_id: &str) -> NewIssue {
    NewIssue {
        issue_id: IssueId::new(issue_id).expect("issue id"),
        project_id: ProjectId::new("proj-1").expect("project id"),
        floor_id: FloorId::new("floor-2").expect("floor id"),
        title: "Cracked drywall".to_owned(),
        description: "Hairline crack next to the stairwell door".to_owned(),
        issue_type: Some("finishing".to_owned()),
        priority: IssuePriority::default(),
        reported_by: None,
        location: Location::element("4711").expect("location"),
    }
}

/// One building with floors "1F" (#1), "Second" (#2) and "Level 3" (#3).
pub(crate) fn three_floors() -> Vec<Floor> {
    let building = BuildingId::new("bldg-1").expect("building id");
    [("floor-1", "1F", 1), ("floor-2", "Second", 2), ("floor-3", "Level 3", 3)]
        .into_iter()
        .map(|(id, name, number)| {
            Floor::new(FloorId::new(id).expect("floor id"), building.clone(), name, number)
                .expect("floor")
        })
        .collect()
}
