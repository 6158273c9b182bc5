//! Share management for owners: create, list, revoke.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use filehub_auth::password::PasswordHasher;
use filehub_core::error::AppError;
use filehub_database::repositories::{FileRepository, ShareRepository, UserRepository};
use filehub_database::{DatabasePool, commit};
use filehub_entity::share::{CreateShare, Share, ShareLink};

use super::link::LinkService;
use crate::context::RequestContext;

/// Request to share one file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateShareRequest {
    /// The live file to share.
    pub file_id: Uuid,
    /// Optional password visitors must supply.
    pub password: Option<String>,
    /// When the link stops working. A past instant yields an already expired link.
    pub expires_at: Option<DateTime<Utc>>,
    /// Download cap (None = unlimited).
    pub max_downloads: Option<i64>,
}

/// Manages share creation, listing, and revocation.
#[derive(Debug, Clone)]
pub struct ShareService {
    db: DatabasePool,
    share_repo: Arc<ShareRepository>,
    file_repo: Arc<FileRepository>,
    user_repo: Arc<UserRepository>,
    links: Arc<LinkService>,
    hasher: Arc<PasswordHasher>,
    max_token_attempts: u32,
}

impl ShareService {
    /// Creates a new share service.
    pub fn new(
        db: DatabasePool,
        share_repo: Arc<ShareRepository>,
        file_repo: Arc<FileRepository>,
        user_repo: Arc<UserRepository>,
        links: Arc<LinkService>,
        hasher: Arc<PasswordHasher>,
        max_token_attempts: u32,
    ) -> Self {
        Self {
            db,
            share_repo,
            file_repo,
            user_repo,
            links,
            hasher,
            max_token_attempts,
        }
    }

    /// Create a share link for one of the caller's live files.
    ///
    /// Candidate tokens are checked against existing ones and redrawn on a
    /// collision, up to the configured number of attempts.
    pub async fn create_share(
        &self,
        ctx: &RequestContext,
        req: CreateShareRequest,
    ) -> Result<ShareLink, AppError> {
        if req.max_downloads.is_some_and(|max| max < 1) {
            return Err(AppError::validation("max_downloads must be at least 1"));
        }
        self.file_repo
            .find_live(req.file_id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;

        let password_hash = req
            .password
            .as_deref()
            .map(|password| self.hasher.hash_password(password))
            .transpose()?;

        let mut tx = self.db.begin().await?;
        if !self.user_repo.touch(&mut tx, ctx.user_id).await? {
            return Err(AppError::not_found("User not found"));
        }

        for attempt in 1..=self.max_token_attempts {
            let token = self.links.generate_token();
            if self.share_repo.token_exists(&mut tx, &token).await? {
                warn!(user_id = %ctx.user_id, attempt, "Share token collision; drawing again");
                continue;
            }

            let share = self
                .share_repo
                .create(
                    &mut tx,
                    &CreateShare {
                        file_id: req.file_id,
                        owner_id: ctx.user_id,
                        token,
                        password_hash,
                        expires_at: req.expires_at,
                        max_downloads: req.max_downloads,
                    },
                )
                .await?;
            commit(tx).await?;

            info!(
                user_id = %ctx.user_id,
                share_id = %share.id,
                file_id = %share.file_id,
                password_protected = share.is_password_protected(),
                max_downloads = ?share.max_downloads,
                "Share created"
            );
            return Ok(self.link(share));
        }

        Err(AppError::token_generation_failed(format!(
            "No unused share token found after {} attempts",
            self.max_token_attempts
        )))
    }

    /// Every share the caller created, newest first.
    pub async fn list_shares(&self, ctx: &RequestContext) -> Result<Vec<ShareLink>, AppError> {
        let shares = self.share_repo.find_by_owner(ctx.user_id).await?;
        Ok(shares.into_iter().map(|share| self.link(share)).collect())
    }

    /// Switch a share off. Revoking an already revoked share succeeds.
    pub async fn revoke(&self, ctx: &RequestContext, share_id: Uuid) -> Result<Share, AppError> {
        let share = self
            .share_repo
            .deactivate(share_id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Share not found"))?;

        info!(user_id = %ctx.user_id, share_id = %share_id, "Share revoked");
        Ok(share)
    }

    fn link(&self, share: Share) -> ShareLink {
        ShareLink {
            url: self.links.public_url(&share.token),
            is_password_protected: share.is_password_protected(),
            share,
        }
    }
}
