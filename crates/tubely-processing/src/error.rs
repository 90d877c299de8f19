use thiserror::Error;
use tubely_core::AppError;

/// Failures of the processing stages
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("payload exceeds limit of {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    #[error("uploaded file is empty")]
    EmptyPayload,

    #[error("failed to read upload stream: {0}")]
    Stream(String),

    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Probe(String),

    #[error("{0}")]
    Remux(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ProcessingResult<T> = Result<T, ProcessingError>;

impl From<ProcessingError> for AppError {
    fn from(err: ProcessingError) -> Self {
        match err {
            ProcessingError::PayloadTooLarge { limit } => AppError::PayloadTooLarge(format!(
                "File exceeds maximum size of {} bytes",
                limit
            )),
            ProcessingError::EmptyPayload => {
                AppError::InvalidInput("Uploaded file is empty".to_string())
            }
            ProcessingError::Stream(msg) => {
                AppError::InvalidInput(format!("Failed to read upload: {}", msg))
            }
            ProcessingError::Spawn { tool: "ffprobe", source } => {
                AppError::Probe(format!("failed to run ffprobe: {}", source))
            }
            ProcessingError::Spawn { tool, source } => {
                AppError::Remux(format!("failed to run {}: {}", tool, source))
            }
            ProcessingError::Probe(msg) => AppError::Probe(msg),
            ProcessingError::Remux(msg) => AppError::Remux(msg),
            ProcessingError::Io(e) => AppError::Io(e.to_string()),
        }
    }
}
