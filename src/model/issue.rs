// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::{FloorId, IssueId, Location, ModelError, ProjectId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IssueStatus {
    Open,
    InProgress,
    Done,
}

impl IssueStatus {
    pub const ALL: [Self; 3] = [Self::Open, Self::InProgress, Self::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid status '{value}' (expected OPEN, IN_PROGRESS or DONE)")]
pub struct ParseIssueStatusError {
    value: String,
}

impl FromStr for IssueStatus {
    type Err = ParseIssueStatusError;

    /// Accepts the canonical wire names plus case and separator variants
    /// (`Open`, `InProgress`, `in-progress`, `in progress`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match folded.as_str() {
            "open" => Ok(Self::Open),
            "inprogress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(ParseIssueStatusError {
                value: s.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IssuePriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl IssuePriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for IssuePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid priority '{value}' (expected LOW, MEDIUM, HIGH or CRITICAL)")]
pub struct ParseIssuePriorityError {
    value: String,
}

impl FromStr for IssuePriority {
    type Err = ParseIssuePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            "CRITICAL" => Ok(Self::Critical),
            _ => Err(ParseIssuePriorityError {
                value: s.to_owned(),
            }),
        }
    }
}

/// A requested status edge that the lifecycle does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid status transition: {current} -> {requested}")]
pub struct InvalidStatusTransition {
    pub current: IssueStatus,
    pub requested: IssueStatus,
}

/// Everything needed to open a new issue.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIssue {
    pub issue_id: IssueId,
    pub project_id: ProjectId,
    pub floor_id: FloorId,
    pub title: String,
    pub description: String,
    pub issue_type: Option<String>,
    pub priority: IssuePriority,
    pub reported_by: Option<String>,
    pub location: Location,
}

/// The issue aggregate.
///
/// Lifecycle operations never mutate in place: each returns a new snapshot whose status and
/// `updated_at` changed while every other field is carried over.
///
/// ```text
/// OPEN --start_work--> IN_PROGRESS --complete--> DONE
///  ^                      |  ^                     |
///  +------reject_work-----+  +--reopen_after_completion
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    issue_id: IssueId,
    project_id: ProjectId,
    floor_id: FloorId,
    title: String,
    description: String,
    issue_type: Option<String>,
    priority: IssuePriority,
    reported_by: Option<String>,
    status: IssueStatus,
    location: Location,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Issue {
    /// Opens a new issue in `OPEN` state.
    pub fn open(new: NewIssue, now: DateTime<Utc>) -> Result<Self, ModelError> {
        Self::restore(new, IssueStatus::Open, now, now)
    }

    /// Rebuilds an issue from persisted state.
    pub fn restore(
        new: NewIssue,
        status: IssueStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, ModelError> {
        let NewIssue {
            issue_id,
            project_id,
            floor_id,
            title,
            description,
            issue_type,
            priority,
            reported_by,
            location,
        } = new;

        let title = require_text("title", title)?;
        let description = require_text("description", description)?;
        if updated_at < created_at {
            return Err(ModelError::UpdatedBeforeCreated);
        }

        Ok(Self {
            issue_id,
            project_id,
            floor_id,
            title,
            description,
            issue_type: issue_type.filter(|t| !t.trim().is_empty()),
            priority,
            reported_by: reported_by.filter(|r| !r.trim().is_empty()),
            status,
            location,
            created_at,
            updated_at,
        })
    }

    pub fn issue_id(&self) -> &IssueId {
        &self.issue_id
    }

    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    pub fn floor_id(&self) -> &FloorId {
        &self.floor_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn issue_type(&self) -> Option<&str> {
        self.issue_type.as_deref()
    }

    pub fn priority(&self) -> IssuePriority {
        self.priority
    }

    pub fn reported_by(&self) -> Option<&str> {
        self.reported_by.as_deref()
    }

    pub fn status(&self) -> IssueStatus {
        self.status
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_open(&self) -> bool {
        self.status == IssueStatus::Open
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == IssueStatus::InProgress
    }

    pub fn is_done(&self) -> bool {
        self.status == IssueStatus::Done
    }

    /// OPEN -> IN_PROGRESS.
    pub fn start_work(&self) -> Result<Self, InvalidStatusTransition> {
        self.step(IssueStatus::Open, IssueStatus::InProgress, Utc::now())
    }

    /// IN_PROGRESS -> DONE.
    pub fn complete(&self) -> Result<Self, InvalidStatusTransition> {
        self.step(IssueStatus::InProgress, IssueStatus::Done, Utc::now())
    }

    /// IN_PROGRESS -> OPEN.
    pub fn reject_work(&self) -> Result<Self, InvalidStatusTransition> {
        self.step(IssueStatus::InProgress, IssueStatus::Open, Utc::now())
    }

    /// DONE -> IN_PROGRESS.
    pub fn reopen_after_completion(&self) -> Result<Self, InvalidStatusTransition> {
        self.step(IssueStatus::Done, IssueStatus::InProgress, Utc::now())
    }

    /// Dispatches a requested target status to the matching lifecycle operation.
    pub fn transition_to(&self, target: IssueStatus) -> Result<Self, InvalidStatusTransition> {
        self.transition_at(target, Utc::now())
    }

    pub fn change_priority(&self, priority: IssuePriority) -> Self {
        self.change_priority_at(priority, Utc::now())
    }

    fn transition_at(
        &self,
        target: IssueStatus,
        now: DateTime<Utc>,
    ) -> Result<Self, InvalidStatusTransition> {
        let from = match (self.status, target) {
            (IssueStatus::Open, IssueStatus::InProgress)
            | (IssueStatus::InProgress, IssueStatus::Done)
            | (IssueStatus::InProgress, IssueStatus::Open)
            | (IssueStatus::Done, IssueStatus::InProgress) => self.status,
            _ => {
                return Err(InvalidStatusTransition {
                    current: self.status,
                    requested: target,
                })
            }
        };
        self.step(from, target, now)
    }

    fn step(
        &self,
        from: IssueStatus,
        to: IssueStatus,
        now: DateTime<Utc>,
    ) -> Result<Self, InvalidStatusTransition> {
        if self.status != from {
            return Err(InvalidStatusTransition {
                current: self.status,
                requested: to,
            });
        }
        let mut next = self.clone();
        next.status = to;
        next.updated_at = now.max(self.updated_at);
        Ok(next)
    }

    fn change_priority_at(&self, priority: IssuePriority, now: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        next.priority = priority;
        next.updated_at = now.max(self.updated_at);
        next
    }
}

fn require_text(field: &'static str, value: String) -> Result<String, ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::EmptyField { field });
    }
    Ok(value)
}
