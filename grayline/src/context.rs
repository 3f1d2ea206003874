//! Shared engine context.
//!
//! Everything the engine components need from their host: the runtime that
//! background work is spawned on and the directory cached files live under.
//! Passed explicitly to constructors instead of living in process globals.

use std::path::{Path, PathBuf};

use tokio::runtime::Handle;

/// Runtime handle and paths shared by the pipeline and the resource cache.
#[derive(Debug, Clone)]
pub struct EngineContext {
    runtime: Handle,
    cache_root: PathBuf,
}

impl EngineContext {
    /// Create a context for a runtime and cache root directory.
    pub fn new(runtime: Handle, cache_root: impl Into<PathBuf>) -> Self {
        Self {
            runtime,
            cache_root: cache_root.into(),
        }
    }

    /// Create a context on the runtime the caller is running in.
    ///
    /// Returns `None` outside a tokio runtime.
    pub fn current(cache_root: impl Into<PathBuf>) -> Option<Self> {
        Handle::try_current()
            .ok()
            .map(|runtime| Self::new(runtime, cache_root))
    }

    /// Handle used to spawn background work.
    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }

    /// Root directory of the resource cache.
    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }
}
