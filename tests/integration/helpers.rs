//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use bytes::Bytes;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use filehub_api::AppState;
use filehub_auth::{JwtDecoder, JwtEncoder};
use filehub_core::config::{
    AnnotationConfig, AppConfig, AuthConfig, DatabaseConfig, LocalStorageConfig, LoggingConfig,
    ServerConfig, ShareConfig, StorageConfig, WorkerConfig,
};
use filehub_core::traits::StorageBackend;
use filehub_database::DatabasePool;
use filehub_database::repositories::UserRepository;
use filehub_entity::file::File;
use filehub_entity::user::{User, UserRole};
use filehub_service::file::UploadParams;
use filehub_service::{RequestContext, Services};
use filehub_worker::JobRunner;

/// Quota given to test users unless a test asks for another.
pub const DEFAULT_QUOTA: i64 = 10 * 1024 * 1024;

const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Database pool for direct queries
    pub db: DatabasePool,
    /// The local backend under the temp dir
    pub storage: Arc<dyn StorageBackend>,
    /// The service graph behind the router
    pub services: Services,
    /// Maintenance runner behind the admin route
    pub jobs: Arc<JobRunner>,
    /// Application config
    pub config: AppConfig,
    /// Keeps the database file and stored bytes alive for the test
    _dir: TempDir,
}

impl TestApp {
    /// Create a new test application over a fresh database and storage root
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test application after adjusting the default test config
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut config = test_config(&dir);
        adjust(&mut config);

        let db = DatabasePool::connect(&config.database)
            .await
            .expect("Failed to connect to test database");
        filehub_database::migration::run_migrations(&db)
            .await
            .expect("Failed to run migrations");

        let storage = filehub_storage::build_backend(&config.storage)
            .await
            .expect("Failed to init storage");
        let services =
            Services::build(&db, Arc::clone(&storage), &config).expect("Failed to build services");
        let jobs = Arc::new(JobRunner::new(Arc::clone(&services.maintenance)));

        let state = AppState {
            config: Arc::new(config.clone()),
            db: db.clone(),
            storage: Arc::clone(&storage),
            jwt_decoder: Arc::new(JwtDecoder::new(&config.auth)),
            services: services.clone(),
            jobs: Arc::clone(&jobs),
        };
        let router = filehub_api::build_app(state);

        Self {
            router,
            db,
            storage,
            services,
            jobs,
            config,
            _dir: dir,
        }
    }

    /// Create a member with the given quota
    pub async fn create_user(&self, username: &str, quota_bytes: i64) -> User {
        self.create_user_with_role(username, UserRole::Member, quota_bytes)
            .await
    }

    /// Create a user with a role and quota
    pub async fn create_user_with_role(
        &self,
        username: &str,
        role: UserRole,
        quota_bytes: i64,
    ) -> User {
        UserRepository::new(&self.db)
            .create(username, role, quota_bytes)
            .await
            .expect("Failed to create test user")
    }

    /// Re-read a user row
    pub async fn user(&self, id: Uuid) -> User {
        UserRepository::new(&self.db)
            .find_by_id(id)
            .await
            .expect("Failed to read user")
            .expect("User vanished")
    }

    /// Request context for a user
    pub fn ctx(&self, user: &User) -> RequestContext {
        RequestContext::new(user.id, user.role)
    }

    /// Signed access token for a user
    pub fn token(&self, user: &User) -> String {
        JwtEncoder::new(&self.config.auth)
            .issue(user.id, user.role, chrono::Duration::minutes(5))
            .expect("Failed to issue token")
    }

    /// Upload `content` as `name` through the service layer
    pub async fn upload(
        &self,
        user: &User,
        folder_id: Option<Uuid>,
        name: &str,
        content: &[u8],
    ) -> File {
        self.services
            .uploads
            .upload(
                &self.ctx(user),
                UploadParams {
                    folder_id,
                    file_name: name.to_string(),
                    content_type: None,
                    data: Bytes::copy_from_slice(content),
                },
            )
            .await
            .expect("Upload failed")
    }

    /// Sum of live file sizes for a user, read straight from the table
    pub async fn live_bytes(&self, user_id: Uuid) -> i64 {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(size_bytes), 0) FROM files WHERE owner_id = $1 AND is_deleted = 0",
        )
        .bind(user_id)
        .fetch_one(self.db.pool())
        .await
        .expect("Failed to sum file sizes")
    }

    /// Make a JSON request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body = body
            .map(|b| serde_json::to_vec(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        self.send(req.body(Body::from(body)).expect("Failed to build request"))
            .await
    }

    /// Upload a file through the multipart route
    pub async fn request_upload(
        &self,
        path: &str,
        file_name: &str,
        content: &[u8],
        folder_id: Option<Uuid>,
        token: &str,
    ) -> TestResponse {
        let boundary = "filehub-test-boundary";
        let mut body = Vec::new();
        if let Some(folder_id) = folder_id {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"folderId\"\r\n\r\n{folder_id}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let req = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(body))
            .expect("Failed to build request");

        self.send(req).await
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let raw = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let body: Value = serde_json::from_slice(&raw).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            raw,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body (`Null` for non-JSON bodies)
    pub body: Value,
    /// The raw body bytes
    pub raw: Bytes,
}

impl TestResponse {
    /// The `data` member of a success envelope
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The machine code of an error body
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

fn test_config(dir: &TempDir) -> AppConfig {
    let root = dir.path();
    AppConfig {
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: format!("sqlite://{}?mode=rwc", root.join("filehub.db").display()),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_seconds: 5,
            idle_timeout_seconds: 60,
            busy_timeout_seconds: 10,
        },
        auth: AuthConfig {
            jwt_secret: TEST_SECRET.to_string(),
            jwt_issuer: None,
        },
        storage: StorageConfig {
            local: LocalStorageConfig {
                root_path: root.join("storage").display().to_string(),
            },
            ..StorageConfig::default()
        },
        share: ShareConfig::default(),
        annotation: AnnotationConfig::default(),
        worker: WorkerConfig {
            enabled: false,
            ..WorkerConfig::default()
        },
        logging: LoggingConfig::default(),
    }
}
