//! TTL-based cache of remote files.
//!
//! Each registered item maps a numeric key to a file name under the cache
//! directory. [`ResourceCache::fetch_all`] schedules a background download
//! for every item whose file is missing or older than the TTL, and
//! [`ResourceCache::poll_completed`] collects the results on the caller's
//! thread, broadcasting one [`FetchCompletion`] per finished download.
//!
//! Downloads use conditional GETs: when a stale file exists its mtime is sent
//! as `If-Modified-Since`, and a `304` response only refreshes the mtime.
//! Network and filesystem failures are reported as [`STATUS_FETCH_FAILED`].
//!
//! # Example
//!
//! ```ignore
//! let cache = ResourceCache::new(&ctx, config, Arc::new(ReqwestFetcher::new()?));
//! cache.register_item(MAP_DAY_KEY, "map-D-660x330-Terrain.bmp");
//! let mut completions = cache.subscribe();
//!
//! cache.fetch_all();
//! while cache.poll_completed() {
//!     std::thread::sleep(Duration::from_millis(50));
//! }
//! ```

mod fetcher;
mod store;

pub use fetcher::{http_date, FetchError, FetchResponse, ReqwestFetcher, ResourceFetcher};

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, info, warn};

use crate::context::EngineContext;

/// Identifier of a cached item.
pub type CacheKey = u32;

/// HTTP status code, or [`STATUS_FETCH_FAILED`].
pub type HttpStatus = u16;

/// Status reported when a fetch failed before an HTTP status was received,
/// or the response could not be stored.
pub const STATUS_FETCH_FAILED: HttpStatus = 599;

/// Status of a successful download.
pub const STATUS_OK: HttpStatus = 200;

/// Status of a conditional GET whose file was still current.
pub const STATUS_NOT_MODIFIED: HttpStatus = 304;

/// Default time a cached file stays fresh.
pub const DEFAULT_TTL: Duration = Duration::from_secs(6 * 3600);

const COMPLETION_CHANNEL_CAPACITY: usize = 64;

/// Builds the remote URL of an item from the root URI and its file name.
pub type UrlStrategy = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;

/// URL strategy that appends the file name to the root URI.
pub fn append_file_name(root_uri: &str, file_name: &str) -> String {
    format!("{}{}", root_uri, file_name)
}

/// A registered item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheEntry {
    pub key: CacheKey,
    /// File name relative to the cache directory.
    pub local_file_name: String,
}

impl CacheEntry {
    pub fn new(key: CacheKey, local_file_name: impl Into<String>) -> Self {
        Self {
            key,
            local_file_name: local_file_name.into(),
        }
    }
}

/// Notification sent for every finished fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchCompletion {
    pub key: CacheKey,
    pub status: HttpStatus,
}

impl FetchCompletion {
    /// Returns true if the local file is usable after this fetch.
    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK || self.status == STATUS_NOT_MODIFIED
    }
}

/// Cache configuration.
#[derive(Clone)]
pub struct ResourceCacheConfig {
    /// Base URI of the remote files.
    pub root_uri: String,
    /// Root directory for all caches.
    pub cache_root: PathBuf,
    /// Directory of this cache, relative to `cache_root`.
    pub sub_directory: PathBuf,
    /// How long a downloaded file stays fresh.
    pub ttl: Duration,
    /// Remote URL construction.
    pub url_strategy: UrlStrategy,
}

impl ResourceCacheConfig {
    /// Configuration with the default TTL and URL strategy.
    pub fn new(root_uri: impl Into<String>, cache_root: impl Into<PathBuf>) -> Self {
        Self {
            root_uri: root_uri.into(),
            cache_root: cache_root.into(),
            sub_directory: PathBuf::new(),
            ttl: DEFAULT_TTL,
            url_strategy: Arc::new(append_file_name),
        }
    }

    /// Take the cache root from an engine context.
    pub fn for_context(ctx: &EngineContext, root_uri: impl Into<String>) -> Self {
        Self::new(root_uri, ctx.cache_root())
    }

    /// Set the sub-directory.
    pub fn with_sub_directory(mut self, sub_directory: impl Into<PathBuf>) -> Self {
        self.sub_directory = sub_directory.into();
        self
    }

    /// Set the TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the URL strategy.
    pub fn with_url_strategy(mut self, strategy: UrlStrategy) -> Self {
        self.url_strategy = strategy;
        self
    }

    /// Directory the cached files are written to.
    pub fn directory(&self) -> PathBuf {
        self.cache_root.join(&self.sub_directory)
    }
}

impl fmt::Debug for ResourceCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceCacheConfig")
            .field("root_uri", &self.root_uri)
            .field("cache_root", &self.cache_root)
            .field("sub_directory", &self.sub_directory)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct CacheRecord {
    last_status: Option<HttpStatus>,
    pending: Option<oneshot::Receiver<HttpStatus>>,
}

#[derive(Default)]
struct CacheState {
    items: HashMap<CacheKey, String>,
    records: HashMap<CacheKey, CacheRecord>,
}

struct FetchJob {
    key: CacheKey,
    file_name: String,
    url: String,
    path: PathBuf,
    if_modified_since: Option<SystemTime>,
}

/// TTL fetch cache.
///
/// The item and record maps share one mutex, which is only held for
/// bookkeeping and never across filesystem or network I/O.
pub struct ResourceCache {
    runtime: Handle,
    config: ResourceCacheConfig,
    directory: PathBuf,
    fetcher: Arc<dyn ResourceFetcher>,
    state: Mutex<CacheState>,
    completions: broadcast::Sender<FetchCompletion>,
}

impl ResourceCache {
    /// Create a cache, creating its directory if needed.
    ///
    /// A directory that cannot be created is logged here once; fetches then
    /// report [`STATUS_FETCH_FAILED`].
    pub fn new(
        ctx: &EngineContext,
        config: ResourceCacheConfig,
        fetcher: Arc<dyn ResourceFetcher>,
    ) -> Self {
        let directory = config.directory();
        if let Err(e) = std::fs::create_dir_all(&directory) {
            warn!(
                directory = %directory.display(),
                error = %e,
                "Failed to create cache directory"
            );
        }

        let (completions, _) = broadcast::channel(COMPLETION_CHANNEL_CAPACITY);
        Self {
            runtime: ctx.runtime().clone(),
            config,
            directory,
            fetcher,
            state: Mutex::new(CacheState::default()),
            completions,
        }
    }

    /// Create a cache and register an initial catalog.
    pub fn with_catalog(
        ctx: &EngineContext,
        config: ResourceCacheConfig,
        fetcher: Arc<dyn ResourceFetcher>,
        catalog: impl IntoIterator<Item = CacheEntry>,
    ) -> Self {
        let cache = Self::new(ctx, config, fetcher);
        for entry in catalog {
            cache.register_item(entry.key, entry.local_file_name);
        }
        cache
    }

    /// The cache configuration.
    pub fn config(&self) -> &ResourceCacheConfig {
        &self.config
    }

    /// Directory the cached files live in.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Register or replace an item. The last registration for a key wins.
    pub fn register_item(&self, key: CacheKey, local_file_name: impl Into<String>) {
        let local_file_name = local_file_name.into();
        debug!(key, file = %local_file_name, "Registered cache item");
        self.state.lock().items.insert(key, local_file_name);
    }

    /// All registered items, ordered by key.
    pub fn entries(&self) -> Vec<CacheEntry> {
        let state = self.state.lock();
        let mut entries: Vec<_> = state
            .items
            .iter()
            .map(|(&key, name)| CacheEntry::new(key, name.clone()))
            .collect();
        entries.sort_by_key(|e| e.key);
        entries
    }

    /// Local path of an item's file, whether or not it exists yet.
    pub fn local_path(&self, key: CacheKey) -> Option<PathBuf> {
        let state = self.state.lock();
        state.items.get(&key).map(|name| self.directory.join(name))
    }

    /// Status of the most recent completed fetch for an item.
    pub fn last_status(&self, key: CacheKey) -> Option<HttpStatus> {
        self.state
            .lock()
            .records
            .get(&key)
            .and_then(|r| r.last_status)
    }

    /// Number of fetches still outstanding.
    pub fn pending_count(&self) -> usize {
        self.state
            .lock()
            .records
            .values()
            .filter(|r| r.pending.is_some())
            .count()
    }

    /// Returns true if the item's file exists and is within the TTL.
    pub fn is_fresh(&self, key: CacheKey) -> bool {
        self.local_path(key)
            .and_then(|path| store::modified_time(&path))
            .is_some_and(|mtime| store::is_within_ttl(mtime, self.config.ttl))
    }

    /// Subscribe to fetch completions.
    ///
    /// Completions are sent from [`Self::poll_completed`], on the thread
    /// that polls.
    pub fn subscribe(&self) -> broadcast::Receiver<FetchCompletion> {
        self.completions.subscribe()
    }

    /// Schedule a fetch for every item that is missing or stale.
    ///
    /// Items with a fetch still outstanding are skipped. Returns true if at
    /// least one fetch was scheduled.
    pub fn fetch_all(&self) -> bool {
        let candidates: Vec<(CacheKey, String)> = {
            let state = self.state.lock();
            state
                .items
                .iter()
                .filter(|(key, _)| !Self::is_pending(&state, **key))
                .map(|(&key, name)| (key, name.clone()))
                .collect()
        };

        let jobs: Vec<FetchJob> = candidates
            .into_iter()
            .filter_map(|(key, file_name)| self.plan_fetch(key, file_name))
            .collect();

        if jobs.is_empty() {
            debug!("All cached items are fresh");
            return false;
        }

        let mut scheduled = 0usize;
        let mut state = self.state.lock();
        for job in jobs {
            // Re-check: another caller may have scheduled it or re-registered the key
            let still_registered = state.items.get(&job.key) == Some(&job.file_name);
            if !still_registered || Self::is_pending(&state, job.key) {
                continue;
            }
            let rx = self.spawn_fetch(job.key, job.url, job.path, job.if_modified_since);
            state.records.entry(job.key).or_default().pending = Some(rx);
            scheduled += 1;
        }
        drop(state);

        if scheduled > 0 {
            info!(scheduled, "Scheduled cache fetches");
        }
        scheduled > 0
    }

    /// Collect finished fetches without blocking.
    ///
    /// Broadcasts one [`FetchCompletion`] per finished fetch and records its
    /// status. Returns true if fetches remain outstanding.
    pub fn poll_completed(&self) -> bool {
        let mut finished = Vec::new();
        let remaining = {
            let mut state = self.state.lock();
            for (&key, record) in state.records.iter_mut() {
                let Some(rx) = record.pending.as_mut() else {
                    continue;
                };
                let status = match rx.try_recv() {
                    Ok(status) => status,
                    Err(TryRecvError::Empty) => continue,
                    Err(TryRecvError::Closed) => STATUS_FETCH_FAILED,
                };
                record.pending = None;
                record.last_status = Some(status);
                finished.push(FetchCompletion { key, status });
            }
            state.records.values().filter(|r| r.pending.is_some()).count()
        };

        finished.sort_by_key(|c| c.key);
        for completion in finished {
            if completion.is_success() {
                debug!(key = completion.key, status = completion.status, "Fetch completed");
            } else {
                warn!(key = completion.key, status = completion.status, "Fetch failed");
            }
            // No subscribers is fine
            let _ = self.completions.send(completion);
        }

        remaining > 0
    }

    fn is_pending(state: &CacheState, key: CacheKey) -> bool {
        state
            .records
            .get(&key)
            .is_some_and(|r| r.pending.is_some())
    }

    fn plan_fetch(&self, key: CacheKey, file_name: String) -> Option<FetchJob> {
        let path = self.directory.join(&file_name);
        let mtime = store::modified_time(&path);
        if let Some(mtime) = mtime {
            if store::is_within_ttl(mtime, self.config.ttl) {
                return None;
            }
        }

        let url = (self.config.url_strategy)(&self.config.root_uri, &file_name);
        Some(FetchJob {
            key,
            file_name,
            url,
            path,
            if_modified_since: mtime,
        })
    }

    fn spawn_fetch(
        &self,
        key: CacheKey,
        url: String,
        path: PathBuf,
        if_modified_since: Option<SystemTime>,
    ) -> oneshot::Receiver<HttpStatus> {
        let (tx, rx) = oneshot::channel();
        let fetcher = Arc::clone(&self.fetcher);
        debug!(key, url = %url, conditional = if_modified_since.is_some(), "Fetching");

        self.runtime.spawn_blocking(move || {
            let status = fetch_to_file(fetcher.as_ref(), &url, &path, if_modified_since);
            let _ = tx.send(status);
        });
        rx
    }
}

/// Perform one fetch and apply its response to the local file.
fn fetch_to_file(
    fetcher: &dyn ResourceFetcher,
    url: &str,
    path: &Path,
    if_modified_since: Option<SystemTime>,
) -> HttpStatus {
    let response = match fetcher.fetch(url, if_modified_since) {
        Ok(response) => response,
        Err(e) => {
            warn!(url, error = %e, "Fetch request failed");
            return STATUS_FETCH_FAILED;
        }
    };

    match response.status {
        STATUS_OK => match store::write_atomic(path, &response.body) {
            Ok(()) => STATUS_OK,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to write cached file");
                STATUS_FETCH_FAILED
            }
        },
        STATUS_NOT_MODIFIED => match store::touch(path) {
            Ok(()) => STATUS_NOT_MODIFIED,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to refresh cached file");
                STATUS_FETCH_FAILED
            }
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Instant;
    use tempfile::TempDir;

    /// Records requests and answers from a fixed table.
    #[derive(Default)]
    pub struct MockFetcher {
        pub responses: Mutex<HashMap<String, Result<FetchResponse, FetchError>>>,
        pub requests: Mutex<Vec<(String, Option<SystemTime>)>>,
        pub gate: Option<Arc<AtomicBool>>,
    }

    impl MockFetcher {
        fn respond(self, url: &str, response: Result<FetchResponse, FetchError>) -> Self {
            self.responses.lock().insert(url.to_string(), response);
            self
        }

        fn request_count(&self) -> usize {
            self.requests.lock().len()
        }
    }

    impl ResourceFetcher for MockFetcher {
        fn fetch(&self, url: &str, since: Option<SystemTime>) -> Result<FetchResponse, FetchError> {
            self.requests.lock().push((url.to_string(), since));
            if let Some(gate) = &self.gate {
                while !gate.load(Ordering::Acquire) {
                    std::thread::sleep(Duration::from_millis(2));
                }
            }
            self.responses
                .lock()
                .get(url)
                .cloned()
                .unwrap_or_else(|| Ok(FetchResponse::status(404)))
        }
    }

    struct Harness {
        _rt: tokio::runtime::Runtime,
        dir: TempDir,
        ctx: EngineContext,
    }

    fn harness() -> Harness {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .build()
            .unwrap();
        let dir = TempDir::new().unwrap();
        let ctx = EngineContext::new(rt.handle().clone(), dir.path());
        Harness { _rt: rt, dir, ctx }
    }

    fn config(h: &Harness) -> ResourceCacheConfig {
        ResourceCacheConfig::for_context(&h.ctx, "http://maps.test/")
            .with_sub_directory("maps")
            .with_ttl(Duration::from_secs(3600))
    }

    fn drain(cache: &ResourceCache) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while cache.poll_completed() {
            assert!(Instant::now() < deadline, "fetches did not finish");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    fn backdate(path: &Path, secs: u64) {
        let old = SystemTime::now() - Duration::from_secs(secs);
        filetime::set_file_mtime(path, FileTime::from_system_time(old)).unwrap();
    }

    #[test]
    fn test_directory_created_at_construction() {
        let h = harness();
        let cache = ResourceCache::new(&h.ctx, config(&h), Arc::new(MockFetcher::default()));
        assert!(cache.directory().is_dir());
        assert_eq!(cache.directory(), h.dir.path().join("maps"));
    }

    #[test]
    fn test_register_last_wins() {
        let h = harness();
        let cache = ResourceCache::new(&h.ctx, config(&h), Arc::new(MockFetcher::default()));
        cache.register_item(1, "a.bmp");
        cache.register_item(1, "b.bmp");
        assert_eq!(cache.local_path(1), Some(h.dir.path().join("maps").join("b.bmp")));
        assert_eq!(cache.entries(), vec![CacheEntry::new(1, "b.bmp")]);
        assert!(cache.local_path(2).is_none());
    }

    #[test]
    fn test_missing_file_is_downloaded_and_announced() {
        let h = harness();
        let fetcher = Arc::new(MockFetcher::default().respond(
            "http://maps.test/day.bmp",
            Ok(FetchResponse::ok(b"DAY".to_vec())),
        ));
        let cache = ResourceCache::new(&h.ctx, config(&h), fetcher.clone());
        cache.register_item(1, "day.bmp");
        let mut completions = cache.subscribe();

        assert!(cache.fetch_all());
        drain(&cache);

        let path = cache.local_path(1).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"DAY");
        assert_eq!(cache.last_status(1), Some(STATUS_OK));
        assert_eq!(
            completions.try_recv().unwrap(),
            FetchCompletion { key: 1, status: 200 }
        );
        assert!(fetcher.requests.lock()[0].1.is_none(), "no If-Modified-Since for a missing file");
    }

    #[test]
    fn test_ttl_decides_what_is_fetched() {
        let h = harness();
        let fetcher = Arc::new(MockFetcher::default());
        let cache = ResourceCache::new(&h.ctx, config(&h), fetcher.clone());
        cache.register_item(1, "missing.bmp");
        cache.register_item(2, "fresh.bmp");
        cache.register_item(3, "stale.bmp");

        std::fs::write(cache.local_path(2).unwrap(), b"fresh").unwrap();
        let stale = cache.local_path(3).unwrap();
        std::fs::write(&stale, b"stale").unwrap();
        backdate(&stale, 2 * 3600);

        assert!(cache.fetch_all());
        drain(&cache);

        let mut urls: Vec<String> =
            fetcher.requests.lock().iter().map(|(u, _)| u.clone()).collect();
        urls.sort();
        assert_eq!(urls, vec!["http://maps.test/missing.bmp", "http://maps.test/stale.bmp"]);
        assert_eq!(cache.last_status(2), None);
    }

    #[test]
    fn test_all_fresh_schedules_nothing() {
        let h = harness();
        let fetcher = Arc::new(MockFetcher::default());
        let cache = ResourceCache::new(&h.ctx, config(&h), fetcher.clone());
        cache.register_item(1, "fresh.bmp");
        std::fs::write(cache.local_path(1).unwrap(), b"fresh").unwrap();

        assert!(!cache.fetch_all());
        assert!(!cache.poll_completed());
        assert_eq!(fetcher.request_count(), 0);
        assert!(cache.is_fresh(1));
    }

    #[test]
    fn test_not_modified_refreshes_mtime() {
        let h = harness();
        let fetcher = Arc::new(
            MockFetcher::default()
                .respond("http://maps.test/night.bmp", Ok(FetchResponse::status(304))),
        );
        let cache = ResourceCache::new(&h.ctx, config(&h), fetcher.clone());
        cache.register_item(2, "night.bmp");
        let path = cache.local_path(2).unwrap();
        std::fs::write(&path, b"NIGHT").unwrap();
        backdate(&path, 2 * 3600);
        assert!(!cache.is_fresh(2));

        assert!(cache.fetch_all());
        drain(&cache);

        assert_eq!(cache.last_status(2), Some(STATUS_NOT_MODIFIED));
        assert!(cache.is_fresh(2));
        assert_eq!(std::fs::read(&path).unwrap(), b"NIGHT");
        assert!(fetcher.requests.lock()[0].1.is_some(), "stale file sends If-Modified-Since");
    }

    #[test]
    fn test_at_most_one_outstanding_fetch_per_key() {
        let h = harness();
        let gate = Arc::new(AtomicBool::new(false));
        let fetcher = Arc::new(MockFetcher {
            gate: Some(gate.clone()),
            ..MockFetcher::default()
        });
        let cache = ResourceCache::new(&h.ctx, config(&h), fetcher.clone());
        cache.register_item(1, "day.bmp");

        assert!(cache.fetch_all());
        assert!(!cache.fetch_all(), "pending key must not be rescheduled");
        assert_eq!(cache.pending_count(), 1);
        assert!(cache.poll_completed());

        gate.store(true, Ordering::Release);
        drain(&cache);
        assert_eq!(cache.pending_count(), 0);
        assert_eq!(fetcher.request_count(), 1);
        assert_eq!(cache.last_status(1), Some(404));
    }

    #[test]
    fn test_transport_failure_reports_sentinel() {
        let h = harness();
        let fetcher = Arc::new(MockFetcher::default().respond(
            "http://maps.test/day.bmp",
            Err(FetchError::Request {
                url: "http://maps.test/day.bmp".to_string(),
                message: "connection refused".to_string(),
            }),
        ));
        let cache = ResourceCache::new(&h.ctx, config(&h), fetcher);
        cache.register_item(1, "day.bmp");
        let mut completions = cache.subscribe();

        assert!(cache.fetch_all());
        drain(&cache);

        assert_eq!(completions.try_recv().unwrap().status, STATUS_FETCH_FAILED);
        assert!(!cache.local_path(1).unwrap().exists());
    }

    #[test]
    fn test_unwritable_directory_reports_sentinel() {
        let h = harness();
        // A regular file where the cache directory should be
        let blocker = h.dir.path().join("maps");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let fetcher = Arc::new(MockFetcher::default().respond(
            "http://maps.test/day.bmp",
            Ok(FetchResponse::ok(b"DAY".to_vec())),
        ));
        let cache = ResourceCache::new(&h.ctx, config(&h), fetcher);
        cache.register_item(1, "day.bmp");

        assert!(cache.fetch_all());
        drain(&cache);
        assert_eq!(cache.last_status(1), Some(STATUS_FETCH_FAILED));
    }

    #[test]
    fn test_directory_removed_after_construction_is_not_recreated() {
        let h = harness();
        let fetcher = Arc::new(MockFetcher::default().respond(
            "http://maps.test/day.bmp",
            Ok(FetchResponse::ok(b"DAY".to_vec())),
        ));
        let cache = ResourceCache::new(&h.ctx, config(&h), fetcher);
        cache.register_item(1, "day.bmp");
        std::fs::remove_dir(cache.directory()).unwrap();

        assert!(cache.fetch_all());
        drain(&cache);
        assert_eq!(cache.last_status(1), Some(STATUS_FETCH_FAILED));
        assert!(!cache.directory().exists());
    }

    #[test]
    fn test_custom_url_strategy() {
        let h = harness();
        let fetcher = Arc::new(MockFetcher::default());
        let strategy: UrlStrategy = Arc::new(|root, file| format!("{}v2/{}?raw=1", root, file));
        let config = config(&h).with_url_strategy(strategy);
        let cache = ResourceCache::new(&h.ctx, config, fetcher.clone());
        cache.register_item(5, "x.bmp");

        cache.fetch_all();
        drain(&cache);
        assert_eq!(fetcher.requests.lock()[0].0, "http://maps.test/v2/x.bmp?raw=1");
    }

    #[test]
    fn test_with_catalog_registers_entries() {
        let h = harness();
        let cache = ResourceCache::with_catalog(
            &h.ctx,
            config(&h),
            Arc::new(MockFetcher::default()),
            vec![CacheEntry::new(2, "n.bmp"), CacheEntry::new(1, "d.bmp")],
        );
        let keys: Vec<_> = cache.entries().into_iter().map(|e| e.key).collect();
        assert_eq!(keys, vec![1, 2]);
    }
}
