// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Command handlers for `IssueWorkflow`.
/// Keeps `ops::mod` focused on command and error types.
impl IssueWorkflow {
    pub fn new(
        issues: Arc<dyn IssueRepository>,
        photos: Arc<dyn PhotoRepository>,
        storage: Arc<dyn PhotoStorage>,
    ) -> Self {
        Self {
            issues,
            photos,
            storage,
        }
    }

    /// Creates an issue together with its BEFORE photos.
    ///
    /// Structural checks run first, then the evidence check, then persistence. If any upload or
    /// photo record fails after the issue was saved, everything written so far is removed again.
    pub async fn create_issue(&self, cmd: CreateIssue) -> Result<Issue, OpError> {
        let CreateIssue {
            project_id,
            floor_id,
            title,
            description,
            issue_type,
            priority,
            reported_by,
            location,
            photos,
        } = cmd;

        let issue = Issue::open(
            NewIssue {
                issue_id: IssueId::generate(),
                project_id,
                floor_id,
                title,
                description,
                issue_type,
                priority,
                reported_by,
                location,
            },
            Utc::now(),
        )?;

        if photos.is_empty() {
            return Err(MissingEvidence::BeforePhoto.into());
        }
        check_photo_payloads(&photos)?;

        self.issues.save(&issue).await?;

        let mut uploaded_keys = Vec::with_capacity(photos.len());
        for upload in &photos {
            if let Err(err) = self
                .store_photo(&issue, PhotoPhase::Before, upload, &mut uploaded_keys)
                .await
            {
                self.roll_back_creation(issue.issue_id(), &uploaded_keys).await;
                return Err(err);
            }
        }

        tracing::info!(
            issue_id = %issue.issue_id(),
            project_id = %issue.project_id(),
            location_type = %issue.location().kind(),
            photos = photos.len(),
            "issue created"
        );
        Ok(issue)
    }

    /// Moves an issue to `cmd.status`, gated on photo evidence.
    pub async fn update_status(&self, cmd: UpdateStatus) -> Result<Issue, OpError> {
        let issue = self.load_issue(&cmd.project_id, &cmd.issue_id).await?;

        let before = self
            .photos
            .count_by_phase(issue.issue_id(), PhotoPhase::Before)
            .await?;
        if before == 0 {
            return Err(MissingEvidence::BeforePhoto.into());
        }
        if cmd.status == IssueStatus::Done {
            let after = self
                .photos
                .count_by_phase(issue.issue_id(), PhotoPhase::After)
                .await?;
            if after == 0 {
                return Err(MissingEvidence::AfterPhoto.into());
            }
        }

        let next = issue.transition_to(cmd.status)?;
        self.issues.save(&next).await?;

        tracing::info!(
            issue_id = %next.issue_id(),
            from = %issue.status(),
            to = %next.status(),
            "issue status changed"
        );
        Ok(next)
    }

    /// Attaches a photo to an existing issue.
    pub async fn add_photo(&self, cmd: AddPhoto) -> Result<Photo, OpError> {
        let issue = self.load_issue(&cmd.project_id, &cmd.issue_id).await?;
        check_photo_payloads(std::slice::from_ref(&cmd.photo))?;

        let mut uploaded_keys = Vec::with_capacity(1);
        match self
            .store_photo(&issue, cmd.phase, &cmd.photo, &mut uploaded_keys)
            .await
        {
            Ok(photo) => Ok(photo),
            Err(err) => {
                for key in &uploaded_keys {
                    if let Err(remove_err) = self.storage.remove(key).await {
                        tracing::warn!(
                            key = %key,
                            error = %remove_err,
                            "failed to remove orphaned photo blob"
                        );
                    }
                }
                Err(err)
            }
        }
    }

    pub async fn change_priority(&self, cmd: ChangePriority) -> Result<Issue, OpError> {
        let issue = self.load_issue(&cmd.project_id, &cmd.issue_id).await?;
        let next = issue.change_priority(cmd.priority);
        self.issues.save(&next).await?;
        tracing::debug!(
            issue_id = %next.issue_id(),
            priority = %next.priority(),
            "issue priority changed"
        );
        Ok(next)
    }

    /// Loads an issue, treating an issue of another project as missing.
    async fn load_issue(
        &self,
        project_id: &ProjectId,
        issue_id: &IssueId,
    ) -> Result<Issue, OpError> {
        match self.issues.find_by_id(issue_id).await? {
            Some(issue) if issue.project_id() == project_id => Ok(issue),
            Some(issue) => {
                tracing::debug!(
                    issue_id = %issue_id,
                    requested_project = %project_id,
                    actual_project = %issue.project_id(),
                    "issue belongs to another project"
                );
                Err(OpError::IssueNotFound {
                    issue_id: issue_id.clone(),
                })
            }
            None => Err(OpError::IssueNotFound {
                issue_id: issue_id.clone(),
            }),
        }
    }

    async fn store_photo(
        &self,
        issue: &Issue,
        phase: PhotoPhase,
        upload: &PhotoUpload,
        uploaded_keys: &mut Vec<String>,
    ) -> Result<Photo, OpError> {
        let photo_id = PhotoId::generate();
        let key = photo_storage_key(
            issue.project_id(),
            issue.issue_id(),
            &photo_id,
            &upload.file_name,
        );

        let stored_key = self
            .storage
            .upload(&key, &upload.bytes, &upload.content_type)
            .await?;
        uploaded_keys.push(stored_key.clone());

        let photo = Photo::new(photo_id, issue.issue_id().clone(), stored_key, phase, Utc::now())?;
        self.photos.save(&photo).await?;
        Ok(photo)
    }

    async fn roll_back_creation(&self, issue_id: &IssueId, uploaded_keys: &[String]) {
        tracing::warn!(issue_id = %issue_id, "rolling back issue creation");
        for key in uploaded_keys {
            if let Err(err) = self.storage.remove(key).await {
                tracing::warn!(key = %key, error = %err, "rollback: failed to remove photo blob");
            }
        }
        if let Err(err) = self.photos.delete_by_issue(issue_id).await {
            tracing::warn!(
                issue_id = %issue_id,
                error = %err,
                "rollback: failed to remove photo records"
            );
        }
        if let Err(err) = self.issues.delete(issue_id).await {
            tracing::warn!(issue_id = %issue_id, error = %err, "rollback: failed to remove issue");
        }
    }
}

fn check_photo_payloads(photos: &[PhotoUpload]) -> Result<(), OpError> {
    match photos.iter().find(|photo| photo.bytes.is_empty()) {
        Some(empty) => Err(OpError::EmptyPhoto {
            file_name: empty.file_name.clone(),
        }),
        None => Ok(()),
    }
}
