//! Application bootstrap implementation.
//!
//! `GrayLineApp` wires the resource cache to the projection pipeline: map
//! downloads reported by the cache become new pipeline sources, and a timer
//! keeps the gray line following the sun.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::runtime::{Handle, Runtime};
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::oneshot::error::TryRecvError as LoadTryRecvError;
use tokio::sync::{broadcast, oneshot, watch};
use tracing::{debug, error, info, warn};

use super::config::AppConfig;
use super::error::AppError;
use crate::buffers::ImageBuffer;
use crate::context::EngineContext;
use crate::maps::{load_source_maps, MapError, MAP_DAY_KEY, MAP_NIGHT_KEY};
use crate::pipeline::{Frame, PipelineState, ProjectionPipeline};
use crate::resource_cache::{
    FetchCompletion, ReqwestFetcher, ResourceCache, ResourceFetcher, STATUS_OK,
};

/// Interval between ticks when the app drives itself.
pub const TICK_INTERVAL: Duration = Duration::from_millis(20);

/// Time allowed for background work to stop on shutdown.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

type MapLoad = Result<(ImageBuffer, ImageBuffer), MapError>;

/// The gray-line engine with its cache and pipeline.
///
/// The owner calls [`GrayLineApp::tick`] regularly from one thread; all
/// downloading, map decoding and pixel work happens on the runtime's
/// blocking pool.
///
/// # Example
///
/// ```ignore
/// use grayline::app::{AppConfig, GrayLineApp};
///
/// let mut app = GrayLineApp::start(config)?;
/// let frame = app.wait_for_frame(Duration::from_secs(60))?;
/// app.shutdown();
/// ```
pub struct GrayLineApp {
    config: AppConfig,
    handle: Handle,
    cache: ResourceCache,
    pipeline: ProjectionPipeline,
    completions: broadcast::Receiver<FetchCompletion>,
    /// Map decode running on the blocking pool.
    loading: Option<oneshot::Receiver<MapLoad>>,

    /// Sources have been handed to the pipeline at least once.
    sources_loaded: bool,
    /// A map changed on disk since the sources were last loaded.
    sources_stale: bool,
    last_fetch: Option<Instant>,
    last_refresh: Instant,

    /// Owned runtime when created via [`GrayLineApp::start`].
    ///
    /// Declared last so the pipeline and cache are dropped first.
    runtime: Option<Runtime>,
}

impl GrayLineApp {
    /// Start the application on its own runtime, fetching over HTTP.
    pub fn start(config: AppConfig) -> Result<Self, AppError> {
        let fetcher = Arc::new(ReqwestFetcher::new()?);
        Self::start_with_fetcher(config, fetcher)
    }

    /// Start the application on its own runtime with a custom fetcher.
    pub fn start_with_fetcher(
        config: AppConfig,
        fetcher: Arc<dyn ResourceFetcher>,
    ) -> Result<Self, AppError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .thread_name("grayline-worker")
            .enable_all()
            .build()
            .map_err(|e| AppError::RuntimeCreation(e.to_string()))?;

        let mut app = Self::start_on(runtime.handle().clone(), config, fetcher);
        app.runtime = Some(runtime);
        Ok(app)
    }

    /// Start the application on an existing runtime.
    pub fn start_on(runtime: Handle, config: AppConfig, fetcher: Arc<dyn ResourceFetcher>) -> Self {
        info!(
            station = %config.station,
            mode = %config.mode,
            map_size = %config.map_size,
            style = %config.map_style,
            cache = %config.cache_directory.display(),
            "Starting gray-line engine"
        );

        let ctx = EngineContext::new(runtime.clone(), config.cache_directory.clone());
        let cache =
            ResourceCache::with_catalog(&ctx, config.cache_config(), fetcher, config.catalog());
        let completions = cache.subscribe();

        let pipeline = ProjectionPipeline::new(&ctx, config.station, config.mode, config.viewport)
            .with_settings(config.grayline);

        Self {
            config,
            handle: runtime,
            cache,
            pipeline,
            completions,
            loading: None,
            sources_loaded: false,
            sources_stale: false,
            last_fetch: None,
            last_refresh: Instant::now(),
            runtime: None,
        }
    }

    /// The application configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The map cache.
    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    /// The projection pipeline.
    pub fn pipeline(&self) -> &ProjectionPipeline {
        &self.pipeline
    }

    /// Mutable access to the pipeline, for station, mode and viewport changes.
    pub fn pipeline_mut(&mut self) -> &mut ProjectionPipeline {
        &mut self.pipeline
    }

    /// The most recently published frame.
    pub fn latest_frame(&self) -> Option<Arc<Frame>> {
        self.pipeline.latest_frame()
    }

    /// Receiver notified with the generation of each new frame.
    pub fn subscribe_frames(&self) -> watch::Receiver<u64> {
        self.pipeline.subscribe_frames()
    }

    /// Returns true while cached maps are being decoded in the background.
    pub fn is_loading_maps(&self) -> bool {
        self.loading.is_some()
    }

    /// Advance the cache and pipeline without blocking.
    ///
    /// Schedules map fetches when due, collects finished downloads, starts a
    /// background reload when a map changed, hands finished reloads to the
    /// pipeline, requests a gray-line refresh when the refresh interval has
    /// passed, and polls the pipeline.
    pub fn tick(&mut self) -> Result<PipelineState, AppError> {
        let fetch_due = self
            .last_fetch
            .map_or(true, |t| t.elapsed() >= self.config.fetch_interval);
        if fetch_due {
            self.cache.fetch_all();
            self.last_fetch = Some(Instant::now());
        }

        self.cache.poll_completed();
        self.drain_completions();

        self.poll_loading()?;
        if !self.sources_loaded || self.sources_stale {
            self.start_reload();
        }

        if self.last_refresh.elapsed() >= self.config.refresh_interval {
            self.pipeline.request_refresh();
            self.last_refresh = Instant::now();
        }

        Ok(self.pipeline.poll())
    }

    /// Tick until a frame newer than the current one is published.
    pub fn wait_for_frame(&mut self, timeout: Duration) -> Result<Arc<Frame>, AppError> {
        let mut frames = self.subscribe_frames();
        frames.borrow_and_update();
        let deadline = Instant::now() + timeout;

        loop {
            self.tick()?;
            if frames.has_changed().unwrap_or(false) {
                frames.borrow_and_update();
                if let Some(frame) = self.latest_frame() {
                    return Ok(frame);
                }
            }
            if Instant::now() >= deadline {
                return Err(AppError::Timeout(timeout));
            }
            std::thread::sleep(TICK_INTERVAL);
        }
    }

    /// Stop background work and wait briefly for it to finish.
    pub fn shutdown(mut self) {
        info!("Shutting down gray-line engine");
        self.pipeline.shutdown();

        let deadline = Instant::now() + SHUTDOWN_TIMEOUT;
        while !self.pipeline.is_shut_down() && Instant::now() < deadline {
            self.pipeline.poll();
            std::thread::sleep(TICK_INTERVAL);
        }
        if !self.pipeline.is_shut_down() {
            warn!("Pipeline task still running at shutdown");
        }

        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_timeout(SHUTDOWN_TIMEOUT);
        }
    }

    fn drain_completions(&mut self) {
        loop {
            match self.completions.try_recv() {
                Ok(completion) => self.on_fetch_completed(completion),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Missed cache notifications; reloading maps");
                    self.sources_stale = true;
                }
            }
        }
    }

    fn on_fetch_completed(&mut self, completion: FetchCompletion) {
        let is_map = completion.key == MAP_DAY_KEY || completion.key == MAP_NIGHT_KEY;
        if !is_map {
            return;
        }
        // 304 leaves the file as it was
        if completion.status == STATUS_OK {
            debug!(key = completion.key, "Map updated");
            self.sources_stale = true;
        } else if !completion.is_success() {
            warn!(
                key = completion.key,
                status = completion.status,
                "Map download failed; keeping current maps"
            );
        }
    }

    fn start_reload(&mut self) {
        // Wait for both maps to settle, and for any decode in flight
        if self.cache.pending_count() > 0 || self.loading.is_some() {
            return;
        }

        let directory = self.cache.directory().to_path_buf();
        let size = self.config.map_size;
        let style = self.config.map_style;
        let (tx, rx) = oneshot::channel();
        self.handle.spawn_blocking(move || {
            let _ = tx.send(load_source_maps(&directory, size, style));
        });

        self.loading = Some(rx);
        // Maps updated while decoding mark the sources stale again
        self.sources_stale = false;
    }

    fn poll_loading(&mut self) -> Result<(), AppError> {
        let Some(rx) = self.loading.as_mut() else {
            return Ok(());
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(LoadTryRecvError::Empty) => return Ok(()),
            Err(LoadTryRecvError::Closed) => {
                error!("Map loading task ended without a result");
                self.loading = None;
                return Ok(());
            }
        };
        self.loading = None;

        match result {
            Ok((day, night)) => {
                self.pipeline.set_sources(day, night)?;
                self.sources_loaded = true;
                Ok(())
            }
            Err(MapError::Read { path, .. }) if !self.sources_loaded => {
                debug!(path = %path.display(), "Maps not cached yet");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to reload maps; keeping current maps");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffers::ImageBuffer;
    use crate::maps::{MapFile, MapStyle, MapVariant};
    use crate::projection::{BufferSize, ProjectionMode};
    use crate::resource_cache::{FetchError, FetchResponse};
    use image::Rgba;
    use parking_lot::Mutex;
    use std::io::Cursor;
    use std::path::PathBuf;
    use std::time::SystemTime;
    use tempfile::TempDir;

    const SIZE: BufferSize = BufferSize::new(32, 16);

    fn bmp_bytes(rgba: [u8; 4]) -> Vec<u8> {
        let img = ImageBuffer::from_pixel(SIZE.width, SIZE.height, Rgba(rgba));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Bmp).unwrap();
        out.into_inner()
    }

    /// Serves the day and night maps for [`SIZE`].
    struct MapServer {
        requests: Mutex<Vec<String>>,
    }

    impl ResourceFetcher for MapServer {
        fn fetch(
            &self,
            url: &str,
            _since: Option<SystemTime>,
        ) -> Result<FetchResponse, FetchError> {
            self.requests.lock().push(url.to_string());
            let day = MapFile::new(MapVariant::Day, SIZE, MapStyle::Terrain).file_name();
            if url.ends_with(&day) {
                Ok(FetchResponse::ok(bmp_bytes([240, 240, 240, 255])))
            } else {
                Ok(FetchResponse::ok(bmp_bytes([10, 10, 30, 255])))
            }
        }
    }

    fn config(dir: &TempDir) -> AppConfig {
        AppConfig::new(PathBuf::from(dir.path()), "http://maps.test/")
            .with_map_size(SIZE)
            .with_mode(ProjectionMode::StationMercator)
    }

    #[test]
    fn test_downloads_maps_and_publishes_frame() {
        let dir = TempDir::new().unwrap();
        let server = Arc::new(MapServer {
            requests: Mutex::new(Vec::new()),
        });
        let mut app = GrayLineApp::start_with_fetcher(config(&dir), server.clone()).unwrap();

        let frame = app.wait_for_frame(Duration::from_secs(20)).unwrap();
        assert_eq!(frame.size, SIZE);
        assert_eq!(frame.mode, ProjectionMode::StationMercator);
        assert_eq!(server.requests.lock().len(), 2);
        assert!(app.cache().is_fresh(MAP_DAY_KEY));
        assert!(app.cache().is_fresh(MAP_NIGHT_KEY));

        app.shutdown();
    }

    #[test]
    fn test_cached_maps_used_without_fetching() {
        let dir = TempDir::new().unwrap();
        let maps = dir.path().join("maps");
        std::fs::create_dir_all(&maps).unwrap();
        let colours = [
            (MapVariant::Day, [200, 200, 200, 255]),
            (MapVariant::Night, [5, 5, 5, 255]),
        ];
        for (variant, rgba) in colours {
            let file = MapFile::new(variant, SIZE, MapStyle::Terrain);
            std::fs::write(maps.join(file.file_name()), bmp_bytes(rgba)).unwrap();
        }

        let server = Arc::new(MapServer {
            requests: Mutex::new(Vec::new()),
        });
        let mut app = GrayLineApp::start_with_fetcher(config(&dir), server.clone()).unwrap();
        app.wait_for_frame(Duration::from_secs(20)).unwrap();

        assert!(server.requests.lock().is_empty(), "fresh maps must not be fetched");
        app.shutdown();
    }

    #[test]
    fn test_maps_decoded_off_the_ticking_thread() {
        let dir = TempDir::new().unwrap();
        let maps = dir.path().join("maps");
        std::fs::create_dir_all(&maps).unwrap();
        let colours = [
            (MapVariant::Day, [200, 200, 200, 255]),
            (MapVariant::Night, [5, 5, 5, 255]),
        ];
        for (variant, rgba) in colours {
            let file = MapFile::new(variant, SIZE, MapStyle::Terrain);
            std::fs::write(maps.join(file.file_name()), bmp_bytes(rgba)).unwrap();
        }

        let server = Arc::new(MapServer {
            requests: Mutex::new(Vec::new()),
        });
        let mut app = GrayLineApp::start_with_fetcher(config(&dir), server).unwrap();

        // The first tick only schedules the decode; sources arrive on a later tick
        app.tick().unwrap();
        assert!(app.is_loading_maps());
        assert!(app.pipeline().view_geometry().is_none());

        let frame = app.wait_for_frame(Duration::from_secs(20)).unwrap();
        assert!(!app.is_loading_maps());
        assert_eq!(frame.size, SIZE);
        app.shutdown();
    }

    #[test]
    fn test_failed_downloads_time_out_without_error() {
        struct Offline;
        impl ResourceFetcher for Offline {
            fn fetch(&self, url: &str, _: Option<SystemTime>) -> Result<FetchResponse, FetchError> {
                Err(FetchError::Request {
                    url: url.to_string(),
                    message: "offline".to_string(),
                })
            }
        }

        let dir = TempDir::new().unwrap();
        let mut app = GrayLineApp::start_with_fetcher(config(&dir), Arc::new(Offline)).unwrap();
        let err = app.wait_for_frame(Duration::from_millis(300)).unwrap_err();
        assert!(matches!(err, AppError::Timeout(_)));
        assert!(app.latest_frame().is_none());
        app.shutdown();
    }
}
