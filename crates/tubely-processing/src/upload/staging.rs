use crate::error::{ProcessingError, ProcessingResult};
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

/// An upload copied to scratch storage.
///
/// The file is removed when the asset is dropped, on every exit path of the
/// pipeline run that owns it.
#[derive(Debug)]
pub struct StagedAsset {
    path: TempPath,
    size_bytes: u64,
}

impl StagedAsset {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }
}

/// Streams uploads into uniquely named files under a scratch directory.
#[derive(Debug, Clone)]
pub struct TempStager {
    scratch_dir: PathBuf,
}

impl TempStager {
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Copy `stream` to a new scratch file, failing once more than `size_limit`
    /// bytes arrive. Only one chunk is held in memory at a time.
    #[tracing::instrument(skip(self, stream), fields(scratch_dir = %self.scratch_dir.display()))]
    pub async fn stage<S, E>(
        &self,
        stream: S,
        size_limit: u64,
        extension: &str,
    ) -> ProcessingResult<StagedAsset>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Into<ProcessingError>,
    {
        let start = std::time::Instant::now();

        let (file, path) = tempfile::Builder::new()
            .prefix("tubely-upload-")
            .suffix(&format!(".{}", extension))
            .tempfile_in(&self.scratch_dir)?
            .into_parts();
        let mut file = tokio::fs::File::from_std(file);

        futures::pin_mut!(stream);
        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(Into::<ProcessingError>::into)?;
            written += chunk.len() as u64;
            if written > size_limit {
                tracing::debug!(size_limit, "Upload exceeded size limit while staging");
                return Err(ProcessingError::PayloadTooLarge { limit: size_limit });
            }
            file.write_all(&chunk).await?;
        }

        if written == 0 {
            return Err(ProcessingError::EmptyPayload);
        }
        file.flush().await?;
        drop(file);

        tracing::debug!(
            path = %path.display(),
            size_bytes = written,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload staged"
        );

        Ok(StagedAsset {
            path,
            size_bytes: written,
        })
    }
}

/// Collect a small upload into memory, failing once more than `size_limit` bytes arrive.
pub async fn buffer_capped<S, E>(stream: S, size_limit: u64) -> ProcessingResult<Bytes>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<ProcessingError>,
{
    futures::pin_mut!(stream);
    let mut buffer = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(Into::<ProcessingError>::into)?;
        if buffer.len() as u64 + chunk.len() as u64 > size_limit {
            return Err(ProcessingError::PayloadTooLarge { limit: size_limit });
        }
        buffer.extend_from_slice(&chunk);
    }

    if buffer.is_empty() {
        return Err(ProcessingError::EmptyPayload);
    }
    Ok(buffer.freeze())
}
