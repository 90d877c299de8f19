//! Test helpers: build AppState and router with in-process collaborators.
//!
//! No external services are needed: content lives in memory, videos go to an
//! in-memory object store, thumbnails to a temp directory, and ffprobe/ffmpeg are
//! replaced by [`FakeToolkit`].

#![allow(dead_code)]

pub mod fakes;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use bytes::Bytes;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use futures::TryStreamExt;
use object_store::memory::InMemory;
use object_store::ObjectStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tubely_api::auth::{AccessClaims, JwtIdentityValidator};
use tubely_api::setup::routes;
use tubely_api::state::{AppDependencies, AppState};
use tubely_core::{Config, ContentRecord, ProbeResult, ServiceConfig, StorageBackend, ThumbnailNaming};
use tubely_db::InMemoryContentRepository;
use tubely_storage::{LocalStorage, S3Storage, Storage};
use uuid::Uuid;

pub use fakes::{FailingStorage, FakeToolkit, Stall, StallingStorage};

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-at-least-32-characters";
pub const ASSETS_BASE_URL: &str = "http://localhost:8091/assets";
pub const CDN_DOMAIN: &str = "cdn.example.com";

/// Test application: server plus handles on every collaborator.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub contents: InMemoryContentRepository,
    pub video_storage: Arc<dyn Storage>,
    pub video_objects: Arc<InMemory>,
    pub toolkit: Arc<FakeToolkit>,
    pub assets_dir: TempDir,
    pub scratch_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Insert a fresh content record owned by `owner`.
    pub async fn seed_content(&self, owner: Uuid) -> ContentRecord {
        let record = ContentRecord::new(owner, "boots");
        self.contents.insert(record.clone()).await;
        record
    }

    pub async fn stored(&self, id: Uuid) -> ContentRecord {
        use tubely_db::ContentRepository;
        self.contents
            .get(id)
            .await
            .expect("content lookup")
            .expect("content exists")
    }

    /// Keys of every object in the video store.
    pub async fn published_video_keys(&self) -> Vec<String> {
        self.video_objects
            .list(None)
            .map_ok(|meta| meta.location.to_string())
            .try_collect()
            .await
            .expect("list video objects")
    }

    /// Files currently in the scratch directory.
    pub fn scratch_entries(&self) -> Vec<PathBuf> {
        dir_entries(self.scratch_dir.path())
    }

    /// Files currently in the served assets directory.
    pub fn asset_entries(&self) -> Vec<PathBuf> {
        dir_entries(self.assets_dir.path())
    }
}

fn dir_entries(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("dir entry").path())
        .collect()
}

/// Knobs for the collaborators behind the router.
pub struct TestAppOptions {
    pub probe: Result<ProbeResult, String>,
    pub remux_fails: bool,
    pub video_publish_fails: bool,
    pub stall: Option<Stall>,
    pub upload_timeout_secs: u64,
    pub thumbnail_naming: ThumbnailNaming,
    pub max_thumbnail_size_bytes: u64,
    pub max_video_size_bytes: u64,
}

impl Default for TestAppOptions {
    fn default() -> Self {
        Self {
            probe: Ok(ProbeResult {
                width: 1920,
                height: 1080,
            }),
            remux_fails: false,
            video_publish_fails: false,
            stall: None,
            upload_timeout_secs: 30,
            thumbnail_naming: ThumbnailNaming::Random,
            max_thumbnail_size_bytes: 1024 * 1024,
            max_video_size_bytes: 4 * 1024 * 1024,
        }
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(TestAppOptions::default()).await
}

pub async fn setup_test_app_with(options: TestAppOptions) -> TestApp {
    let assets_dir = tempfile::tempdir().expect("Failed to create assets directory");
    let scratch_dir = tempfile::tempdir().expect("Failed to create scratch directory");

    let config = create_test_config(assets_dir.path(), scratch_dir.path(), &options);

    let contents = InMemoryContentRepository::new();
    let toolkit = Arc::new(FakeToolkit::new(
        options.probe.clone(),
        options.remux_fails,
        options.stall,
    ));

    let video_objects = Arc::new(InMemory::new());
    let video_storage: Arc<dyn Storage> = if options.video_publish_fails {
        Arc::new(FailingStorage)
    } else if options.stall == Some(Stall::Publish) {
        Arc::new(StallingStorage)
    } else {
        Arc::new(S3Storage::with_store(
            video_objects.clone(),
            "tubely-test".to_string(),
            "us-east-2".to_string(),
            None,
            Some(CDN_DOMAIN.to_string()),
        ))
    };
    let thumbnail_storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(assets_dir.path(), ASSETS_BASE_URL.to_string())
            .await
            .expect("Failed to create local storage"),
    );

    let deps = AppDependencies {
        identity: Arc::new(JwtIdentityValidator::new(TEST_JWT_SECRET)),
        contents: Arc::new(contents.clone()),
        toolkit: toolkit.clone(),
        video_storage: video_storage.clone(),
        thumbnail_storage,
    };
    let state = Arc::new(AppState::new(&config, deps));
    let app = routes::setup_routes(&config, state.clone()).expect("Failed to setup routes");

    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        state,
        contents,
        video_storage,
        video_objects,
        toolkit,
        assets_dir,
        scratch_dir,
    }
}

fn create_test_config(assets: &Path, scratch: &Path, options: &TestAppOptions) -> Config {
    Config::new(ServiceConfig {
        environment: "test".to_string(),
        host: "127.0.0.1".to_string(),
        server_port: 8091,
        public_host: "localhost".to_string(),
        cors_origins: vec!["*".to_string()],
        jwt_secret: TEST_JWT_SECRET.to_string(),
        database_url: "postgres://unused/tubely".to_string(),
        db_max_connections: 1,
        db_timeout_seconds: 1,
        video_storage_backend: StorageBackend::S3,
        s3_bucket: Some("tubely-test".to_string()),
        s3_region: Some("us-east-2".to_string()),
        s3_endpoint: None,
        s3_cf_distribution: Some(CDN_DOMAIN.to_string()),
        assets_root: assets.to_path_buf(),
        assets_base_url: Some(ASSETS_BASE_URL.to_string()),
        scratch_dir: scratch.to_path_buf(),
        ffmpeg_path: "ffmpeg".to_string(),
        ffprobe_path: "ffprobe".to_string(),
        max_thumbnail_size_bytes: options.max_thumbnail_size_bytes,
        max_video_size_bytes: options.max_video_size_bytes,
        thumbnail_naming: options.thumbnail_naming,
        upload_timeout_secs: options.upload_timeout_secs,
    })
}

/// Sign an access token for `user` with the test secret.
pub fn mint_token(user: Uuid) -> String {
    let now = Utc::now().timestamp();
    let claims = AccessClaims {
        sub: user.to_string(),
        exp: now + 3600,
        iat: now,
        iss: Some("tubely-access".to_string()),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("Failed to sign token")
}

pub fn bearer(user: Uuid) -> String {
    format!("Bearer {}", mint_token(user))
}

/// Single-file multipart form.
pub fn file_form(field: &str, file_name: &str, mime_type: &str, data: &[u8]) -> MultipartForm {
    let part = Part::bytes(Bytes::copy_from_slice(data))
        .file_name(file_name.to_string())
        .mime_type(mime_type.to_string());
    MultipartForm::new().add_part(field.to_string(), part)
}

/// Bytes standing in for an MP4 file; the fake toolkit never parses them.
pub fn fake_mp4(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
