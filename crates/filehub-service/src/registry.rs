//! Construction of the full service graph from configuration.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use filehub_auth::password::PasswordHasher;
use filehub_core::config::AppConfig;
use filehub_core::result::AppResult;
use filehub_core::traits::StorageBackend;
use filehub_database::DatabasePool;
use filehub_database::repositories::{
    FileRepository, FolderRepository, ShareRepository, UserRepository,
};

use crate::annotation::{AnnotationDispatcher, MlSidecarAnnotator};
use crate::file::{DownloadService, DuplicateIndex, FileService, UploadService};
use crate::folder::{FolderService, TreeService};
use crate::maintenance::{Maintenance, OrphanSweeper, QuotaAuditor, TrashPurger};
use crate::quota::QuotaLedger;
use crate::share::{AccessService, LinkService, RandomTokenGenerator, ShareService};

/// Every service, wired once at startup and shared behind `Arc`s.
#[derive(Debug, Clone)]
pub struct Services {
    /// Per-user storage counters.
    pub ledger: Arc<QuotaLedger>,
    /// Trash, purge, rename, move, versions.
    pub files: Arc<FileService>,
    /// New files and new versions.
    pub uploads: Arc<UploadService>,
    /// Owner downloads and byte access for shares.
    pub downloads: Arc<DownloadService>,
    /// Duplicate groups and bulk deletion.
    pub duplicates: Arc<DuplicateIndex>,
    /// Folder structure changes.
    pub folders: Arc<FolderService>,
    /// Folder listings and breadcrumbs.
    pub tree: Arc<TreeService>,
    /// Owner-side share management.
    pub shares: Arc<ShareService>,
    /// Anonymous share access.
    pub access: Arc<AccessService>,
    /// Maintenance jobs.
    pub maintenance: Arc<Maintenance>,
}

impl Services {
    /// Build the service graph over an open database and the selected backend.
    pub fn build(
        db: &DatabasePool,
        storage: Arc<dyn StorageBackend>,
        config: &AppConfig,
    ) -> AppResult<Self> {
        let user_repo = Arc::new(UserRepository::new(db));
        let folder_repo = Arc::new(FolderRepository::new(db));
        let file_repo = Arc::new(FileRepository::new(db));
        let share_repo = Arc::new(ShareRepository::new(db));

        let hasher = Arc::new(PasswordHasher::new());
        let ledger = Arc::new(QuotaLedger::new(user_repo.clone()));

        let annotations = if config.annotation.enabled {
            let sidecar = MlSidecarAnnotator::new(&config.annotation)?;
            info!(base_url = %config.annotation.base_url, "ML annotation enabled");
            AnnotationDispatcher::new(
                Arc::new(sidecar),
                file_repo.clone(),
                Duration::from_secs(config.annotation.timeout_seconds),
            )
        } else {
            AnnotationDispatcher::disabled(file_repo.clone())
        };

        let files = Arc::new(FileService::new(
            db.clone(),
            file_repo.clone(),
            folder_repo.clone(),
            ledger.clone(),
            storage.clone(),
        ));
        let uploads = Arc::new(UploadService::new(
            db.clone(),
            file_repo.clone(),
            folder_repo.clone(),
            ledger.clone(),
            storage.clone(),
            Arc::new(annotations),
            config.storage.max_upload_size_bytes,
        ));
        let downloads = Arc::new(DownloadService::new(
            file_repo.clone(),
            storage.clone(),
            Duration::from_secs(config.storage.signed_url_ttl_seconds),
        ));
        let duplicates = Arc::new(DuplicateIndex::new(file_repo.clone(), files.clone()));

        let folders = Arc::new(FolderService::new(
            db.clone(),
            folder_repo.clone(),
            file_repo.clone(),
            user_repo.clone(),
            files.clone(),
        ));
        let tree = Arc::new(TreeService::new(folder_repo.clone(), file_repo.clone()));

        let links = Arc::new(LinkService::new(
            Arc::new(RandomTokenGenerator::new(config.share.token_bytes)),
            &config.share.public_base_url,
        ));
        let shares = Arc::new(ShareService::new(
            db.clone(),
            share_repo.clone(),
            file_repo.clone(),
            user_repo.clone(),
            links,
            hasher.clone(),
            config.share.max_token_attempts,
        ));
        let access = Arc::new(AccessService::new(
            share_repo,
            file_repo.clone(),
            hasher,
            downloads.clone(),
        ));

        let maintenance = Arc::new(Maintenance::new(
            OrphanSweeper::new(
                user_repo.clone(),
                file_repo.clone(),
                storage,
                chrono::Duration::minutes(config.worker.orphan_grace_minutes),
            ),
            TrashPurger::new(
                file_repo,
                files.clone(),
                chrono::Duration::days(config.worker.trash_retention_days),
            ),
            QuotaAuditor::new(user_repo),
        ));

        Ok(Self {
            ledger,
            files,
            uploads,
            downloads,
            duplicates,
            folders,
            tree,
            shares,
            access,
            maintenance,
        })
    }
}
