//! Application error types.

use std::fmt;
use std::time::Duration;

use crate::maps::MapError;
use crate::pipeline::PipelineError;
use crate::resource_cache::FetchError;

/// Errors that can occur during application lifecycle.
#[derive(Debug)]
pub enum AppError {
    /// Failed to create the Tokio runtime.
    RuntimeCreation(String),

    /// Failed to create the HTTP fetcher.
    Fetcher(FetchError),

    /// Source maps were rejected by the pipeline.
    Pipeline(PipelineError),

    /// Cached maps could not be loaded.
    Maps(MapError),

    /// No frame was produced in time.
    Timeout(Duration),

    /// Configuration error.
    Config(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::RuntimeCreation(msg) => {
                write!(f, "Failed to create Tokio runtime: {}", msg)
            }
            AppError::Fetcher(e) => write!(f, "Failed to create map fetcher: {}", e),
            AppError::Pipeline(e) => write!(f, "Source maps rejected: {}", e),
            AppError::Maps(e) => write!(f, "Failed to load maps: {}", e),
            AppError::Timeout(d) => {
                write!(f, "No frame produced within {} seconds", d.as_secs())
            }
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Fetcher(e) => Some(e),
            AppError::Pipeline(e) => Some(e),
            AppError::Maps(e) => Some(e),
            AppError::RuntimeCreation(_) | AppError::Timeout(_) | AppError::Config(_) => None,
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(e: PipelineError) -> Self {
        AppError::Pipeline(e)
    }
}

impl From<MapError> for AppError {
    fn from(e: MapError) -> Self {
        AppError::Maps(e)
    }
}

impl From<FetchError> for AppError {
    fn from(e: FetchError) -> Self {
        AppError::Fetcher(e)
    }
}
