//! CLI error handling with user-friendly messages.

use std::fmt;
use std::process;

use grayline::app::AppError;
use grayline::config::ConfigFileError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// The engine failed to start or produce a frame
    App(AppError),
    /// A `--time` argument that is not RFC 3339
    InvalidTime(String),
    /// Failed to write an output image
    FileWrite {
        path: String,
        error: image::ImageError,
    },
    /// Failed to create an output directory
    Directory {
        path: String,
        error: std::io::Error,
    },
    /// Failed to install the Ctrl-C handler
    Signal(String),
    /// Some map downloads failed
    FetchFailed(usize),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::App(AppError::Timeout(_)) => {
                eprintln!();
                eprintln!("No frame was produced. Common causes:");
                eprintln!("  1. The map server is unreachable (check cache.root_uri)");
                eprintln!("  2. No map of the configured size and style exists there");
                eprintln!("  3. The cache directory is not writable");
            }
            CliError::InvalidTime(_) => {
                eprintln!();
                eprintln!("Use RFC 3339, e.g. 2024-06-20T16:13:20Z");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::App(e) => write!(f, "{}", e),
            CliError::InvalidTime(value) => write!(f, "Invalid time '{}'", value),
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path, error)
            }
            CliError::Directory { path, error } => {
                write!(f, "Failed to create directory '{}': {}", path, error)
            }
            CliError::Signal(msg) => write!(f, "Failed to install signal handler: {}", msg),
            CliError::FetchFailed(count) => write!(f, "{} map download(s) failed", count),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::App(e) => Some(e),
            CliError::FileWrite { error, .. } => Some(error),
            CliError::Directory { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        CliError::App(e)
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}
