//! Public share access: token validation and capped downloads.
//!
//! Share state is derived from the row and the clock on every call.
//! Checks run in a fixed order (existence, revoked, expired, exhausted,
//! password) so a dead link never reveals whether it is password protected.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use filehub_auth::password::PasswordHasher;
use filehub_core::error::{AppError, DenialReason};
use filehub_database::repositories::{FileRepository, ShareRepository};
use filehub_entity::file::File;
use filehub_entity::share::{PublicShareView, Share, ShareState};

use crate::file::{DownloadService, FileDownload};

/// A share that passed validation, with its file.
#[derive(Debug, Clone)]
pub struct ValidatedShare {
    /// The share row as read.
    pub share: Share,
    /// The live shared file.
    pub file: File,
}

/// Serves anonymous visitors holding a share token.
#[derive(Debug, Clone)]
pub struct AccessService {
    share_repo: Arc<ShareRepository>,
    file_repo: Arc<FileRepository>,
    hasher: Arc<PasswordHasher>,
    downloads: Arc<DownloadService>,
}

impl AccessService {
    /// Creates a new access service.
    pub fn new(
        share_repo: Arc<ShareRepository>,
        file_repo: Arc<FileRepository>,
        hasher: Arc<PasswordHasher>,
        downloads: Arc<DownloadService>,
    ) -> Self {
        Self {
            share_repo,
            file_repo,
            hasher,
            downloads,
        }
    }

    /// Check a token and optional password.
    pub async fn validate(
        &self,
        token: &str,
        password: Option<&str>,
    ) -> Result<ValidatedShare, AppError> {
        let share = self
            .share_repo
            .find_by_token(token)
            .await?
            .ok_or_else(|| AppError::denied(DenialReason::NotFound))?;
        let file = self
            .file_repo
            .find_by_id(share.file_id)
            .await?
            .filter(|f| !f.is_deleted)
            .ok_or_else(|| AppError::denied(DenialReason::NotFound))?;

        deny_unless_active(&share)?;

        if let Some(hash) = share.password_hash.as_deref() {
            let supplied = password
                .filter(|p| !p.is_empty())
                .ok_or_else(|| AppError::denied(DenialReason::PasswordRequired))?;
            if !self.hasher.verify_password(supplied, hash)? {
                return Err(AppError::denied(DenialReason::PasswordIncorrect));
            }
        }

        Ok(ValidatedShare { share, file })
    }

    /// What a visitor may see about a valid share.
    pub async fn view(&self, token: &str, password: Option<&str>) -> Result<PublicShareView, AppError> {
        let ValidatedShare { share, file } = self.validate(token, password).await?;
        Ok(PublicShareView {
            share_id: share.id,
            file_name: file.name,
            mime_type: file.mime_type,
            size_bytes: file.size_bytes,
            expires_at: share.expires_at,
            remaining_downloads: share.remaining_downloads(),
        })
    }

    /// Count one download against the share's cap.
    ///
    /// The store checks the state and increments in one statement. When
    /// nothing was counted the share is re-read to report why.
    pub async fn record_download(&self, share_id: Uuid) -> Result<Share, AppError> {
        if let Some(share) = self.share_repo.try_increment_download(share_id).await? {
            return Ok(share);
        }

        let share = self
            .share_repo
            .find_by_id(share_id)
            .await?
            .ok_or_else(|| AppError::denied(DenialReason::NotFound))?;
        deny_unless_active(&share)?;
        Err(AppError::conflict(
            "Download could not be recorded; retry the request",
        ))
    }

    /// Validate, count, then open the bytes.
    ///
    /// A counted download whose bytes cannot be opened is given back.
    pub async fn download(
        &self,
        token: &str,
        password: Option<&str>,
    ) -> Result<FileDownload, AppError> {
        let ValidatedShare { share, file } = self.validate(token, password).await?;
        let counted = self.record_download(share.id).await?;

        let body = match self.downloads.open(&file).await {
            Ok(body) => body,
            Err(e) => {
                if let Err(restore) = self.share_repo.decrement_download(share.id).await {
                    warn!(
                        share_id = %share.id,
                        error = %restore,
                        "Failed to give back a download that was not served"
                    );
                }
                return Err(e);
            }
        };

        info!(
            share_id = %share.id,
            file_id = %file.id,
            download_count = counted.download_count,
            max_downloads = ?counted.max_downloads,
            "Share download served"
        );
        Ok(FileDownload { file, body })
    }
}

/// Map a non-active share state to its denial.
fn deny_unless_active(share: &Share) -> Result<(), AppError> {
    let reason = match share.state_at(Utc::now()) {
        ShareState::Active => return Ok(()),
        ShareState::Revoked => DenialReason::Revoked,
        ShareState::Expired => DenialReason::Expired,
        ShareState::Exhausted => DenialReason::Exhausted,
    };
    Err(AppError::denied(reason))
}
