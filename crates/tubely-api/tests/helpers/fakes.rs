use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::TempPath;
use tokio::io::AsyncRead;
use tubely_core::{ProbeResult, StorageBackend};
use tubely_processing::{MediaToolkit, ProcessingError, ProcessingResult};
use tubely_storage::{Storage, StorageError, StorageResult};

/// Pipeline step that never completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stall {
    Probe,
    Remux,
    Publish,
}

/// Stand-in for ffprobe/ffmpeg.
///
/// Probing returns a fixed result. Remuxing copies the staged file next to itself,
/// the way the real remux writes into the scratch directory.
pub struct FakeToolkit {
    probe: Mutex<Result<ProbeResult, String>>,
    remux_fails: bool,
    stall: Option<Stall>,
    probe_calls: AtomicUsize,
    remux_calls: AtomicUsize,
}

impl FakeToolkit {
    pub fn new(
        probe: Result<ProbeResult, String>,
        remux_fails: bool,
        stall: Option<Stall>,
    ) -> Self {
        Self {
            probe: Mutex::new(probe),
            remux_fails,
            stall,
            probe_calls: AtomicUsize::new(0),
            remux_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_probe(&self, probe: Result<ProbeResult, String>) {
        *self.probe.lock().unwrap() = probe;
    }

    pub fn probe_calls(&self) -> usize {
        self.probe_calls.load(Ordering::SeqCst)
    }

    pub fn remux_calls(&self) -> usize {
        self.remux_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaToolkit for FakeToolkit {
    async fn probe(&self, path: &Path) -> ProcessingResult<ProbeResult> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        assert!(path.exists(), "probe must run on a staged file");
        if self.stall == Some(Stall::Probe) {
            std::future::pending::<()>().await;
        }
        self.probe
            .lock()
            .unwrap()
            .clone()
            .map_err(ProcessingError::Probe)
    }

    async fn fast_start(&self, path: &Path) -> ProcessingResult<TempPath> {
        self.remux_calls.fetch_add(1, Ordering::SeqCst);
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let output = tempfile::Builder::new()
            .prefix("fake-faststart-")
            .suffix(".mp4")
            .tempfile_in(dir)?
            .into_temp_path();

        if self.stall == Some(Stall::Remux) {
            std::future::pending::<()>().await;
        }
        if self.remux_fails {
            return Err(ProcessingError::Remux("moov atom not found".to_string()));
        }

        tokio::fs::copy(path, &output).await?;
        Ok(output)
    }
}

/// Object store that rejects every write.
pub struct FailingStorage;

#[async_trait]
impl Storage for FailingStorage {
    async fn upload_with_key(
        &self,
        _storage_key: &str,
        _data: Bytes,
        _content_type: &str,
    ) -> StorageResult<String> {
        Err(StorageError::UploadFailed("bucket unavailable".to_string()))
    }

    async fn upload_stream(
        &self,
        _storage_key: &str,
        _content_type: &str,
        _content_length: Option<u64>,
        _reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<String> {
        Err(StorageError::UploadFailed("bucket unavailable".to_string()))
    }

    async fn exists(&self, _storage_key: &str) -> StorageResult<bool> {
        Ok(false)
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!("https://unavailable.example.com/{}", storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

/// Object store whose writes never complete.
pub struct StallingStorage;

#[async_trait]
impl Storage for StallingStorage {
    async fn upload_with_key(
        &self,
        _storage_key: &str,
        _data: Bytes,
        _content_type: &str,
    ) -> StorageResult<String> {
        std::future::pending().await
    }

    async fn upload_stream(
        &self,
        _storage_key: &str,
        _content_type: &str,
        _content_length: Option<u64>,
        _reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<String> {
        std::future::pending().await
    }

    async fn exists(&self, _storage_key: &str) -> StorageResult<bool> {
        Ok(false)
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!("https://stalled.example.com/{}", storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
