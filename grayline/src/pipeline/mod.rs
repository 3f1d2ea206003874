//! Cancellable projection and illumination pipeline.
//!
//! The pipeline owns the source and derived buffers and turns parameter
//! changes into background work. It never computes pixels on the caller's
//! thread: the presentation loop calls [`ProjectionPipeline::poll`] once per
//! tick, which collects finished tasks, publishes frames and starts the next
//! task when something changed.
//!
//! # Scheduling
//!
//! Each computation runs on the tokio blocking pool and fans its rows out on
//! rayon. Projection always precedes illumination for the same parameters.
//! Changing station, mode, viewport or sources while a task is running
//! raises that task's abort flag; its result is discarded when it returns
//! and the work restarts with the new parameters. Every task gets a fresh
//! flag.
//!
//! # Example
//!
//! ```ignore
//! let mode = ProjectionMode::StationAzimuthal;
//! let mut pipeline = ProjectionPipeline::new(&ctx, station, mode, viewport);
//! pipeline.set_sources(day, night)?;
//! let mut frames = pipeline.subscribe_frames();
//!
//! loop {
//!     pipeline.poll();
//!     if frames.has_changed().unwrap_or(false) {
//!         frames.borrow_and_update();
//!         upload(pipeline.latest_frame());
//!     }
//! }
//! ```

mod compute;
mod error;
mod frame;
mod state;

pub use compute::{derived_size, illuminate, project_maps};
pub use error::PipelineError;
pub use frame::Frame;
pub use state::PipelineState;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::sync::{oneshot, watch};
use tracing::{debug, error, info};

use crate::abort::AbortFlag;
use crate::buffers::{ImageBuffer, ProjectedMaps, SourceMaps};
use crate::context::EngineContext;
use crate::geo::GeoPosition;
use crate::illumination::{Composites, GrayLineSettings, Illuminator};
use crate::projection::{BufferSize, ProjectionMode, ViewGeometry};

/// Source of the current time for sun positions.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

struct ProjectionOutcome {
    maps: ProjectedMaps,
    completed: bool,
}

struct IlluminationOutcome {
    maps: ProjectedMaps,
    composites: Option<Composites>,
    sub_solar: GeoPosition,
    computed_at: DateTime<Utc>,
}

enum InFlight {
    Projection {
        abort: Arc<AbortFlag>,
        rx: oneshot::Receiver<ProjectionOutcome>,
    },
    Illumination {
        abort: Arc<AbortFlag>,
        rx: oneshot::Receiver<IlluminationOutcome>,
    },
}

impl InFlight {
    fn abort(&self) -> &AbortFlag {
        match self {
            InFlight::Projection { abort, .. } | InFlight::Illumination { abort, .. } => abort,
        }
    }
}

/// Drives projection and illumination as cancellable background work.
pub struct ProjectionPipeline {
    runtime: Handle,
    settings: GrayLineSettings,
    clock: Clock,

    station: GeoPosition,
    mode: ProjectionMode,
    viewport: BufferSize,

    sources: Option<Arc<SourceMaps>>,
    /// Derived buffers; `None` while lent to a running task.
    projected: Option<ProjectedMaps>,
    /// The derived buffers hold a completed projection for the current parameters.
    projection_current: bool,
    needs_illumination: bool,
    /// A task died; wait for new input before retrying.
    halted: bool,

    state: PipelineState,
    in_flight: Option<InFlight>,
    shutting_down: bool,

    generation: u64,
    latest: Option<Arc<Frame>>,
    frames_tx: watch::Sender<u64>,
}

impl ProjectionPipeline {
    /// Create an idle pipeline.
    ///
    /// Nothing is computed until sources are supplied with
    /// [`Self::set_sources`]. An empty `viewport` renders at the source
    /// resolution.
    pub fn new(
        ctx: &EngineContext,
        station: GeoPosition,
        mode: ProjectionMode,
        viewport: BufferSize,
    ) -> Self {
        let (frames_tx, _) = watch::channel(0);
        Self {
            runtime: ctx.runtime().clone(),
            settings: GrayLineSettings::default(),
            clock: Arc::new(Utc::now),
            station,
            mode,
            viewport,
            sources: None,
            projected: None,
            projection_current: false,
            needs_illumination: false,
            halted: false,
            state: PipelineState::Idle,
            in_flight: None,
            shutting_down: false,
            generation: 0,
            latest: None,
            frames_tx,
        }
    }

    /// Set the gray-line mask settings.
    pub fn with_settings(mut self, settings: GrayLineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Use a custom clock for sun positions.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// The station the views are centred on.
    pub fn station(&self) -> GeoPosition {
        self.station
    }

    /// The selected projection mode.
    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    /// The most recently published frame.
    pub fn latest_frame(&self) -> Option<Arc<Frame>> {
        self.latest.clone()
    }

    /// Receiver that changes to the frame generation each time a frame is
    /// published.
    pub fn subscribe_frames(&self) -> watch::Receiver<u64> {
        self.frames_tx.subscribe()
    }

    /// Geometry the next frame will be computed for, once sources are set.
    pub fn view_geometry(&self) -> Option<ViewGeometry> {
        let sources = self.sources.as_ref()?;
        let size = derived_size(self.viewport, sources.size());
        Some(ViewGeometry::new(self.mode, size, self.station))
    }

    /// Move the station. Restarts any running computation.
    pub fn set_station(&mut self, station: GeoPosition) {
        if station == self.station {
            return;
        }
        debug!(station = %station, "Station changed");
        self.station = station;
        self.invalidate();
    }

    /// Change the projection mode. Restarts any running computation.
    pub fn set_mode(&mut self, mode: ProjectionMode) {
        if mode == self.mode {
            return;
        }
        debug!(mode = %mode, "Projection mode changed");
        self.mode = mode;
        self.invalidate();
    }

    /// Change the viewport size. Restarts any running computation.
    pub fn set_viewport(&mut self, viewport: BufferSize) {
        if viewport == self.viewport {
            return;
        }
        debug!(viewport = %viewport, "Viewport changed");
        self.viewport = viewport;
        self.invalidate();
    }

    /// Replace the day and night source maps.
    ///
    /// Both maps must be non-empty and of identical size.
    pub fn set_sources(
        &mut self,
        day: ImageBuffer,
        night: ImageBuffer,
    ) -> Result<(), PipelineError> {
        let sources = SourceMaps::new(day, night);
        if !sources.dimensions_match() {
            return Err(PipelineError::DimensionMismatch {
                day: sources.size(),
                night: sources.night_size(),
            });
        }
        if sources.size().is_empty() {
            return Err(PipelineError::EmptySource);
        }

        info!(size = %sources.size(), "Source maps updated");
        self.sources = Some(Arc::new(sources));
        self.invalidate();
        Ok(())
    }

    /// Recompute the gray line for the current time without reprojecting.
    pub fn request_refresh(&mut self) {
        self.needs_illumination = true;
        self.halted = false;
    }

    /// Stop any running computation and refuse to start new ones.
    pub fn shutdown(&mut self) {
        if self.shutting_down {
            return;
        }
        info!("Pipeline shutting down");
        self.shutting_down = true;
        match &self.in_flight {
            Some(in_flight) => {
                in_flight.abort().raise();
                self.state = PipelineState::Aborting;
            }
            None => self.state = PipelineState::Idle,
        }
    }

    /// Returns true once [`Self::shutdown`] was called and the last task has
    /// been collected.
    pub fn is_shut_down(&self) -> bool {
        self.shutting_down && self.in_flight.is_none()
    }

    /// Advance the pipeline without blocking.
    ///
    /// Collects a finished task if there is one, publishes its frame, and
    /// starts the next computation when parameters, sources or the clock
    /// require one. Returns the resulting state.
    pub fn poll(&mut self) -> PipelineState {
        match self.in_flight.take() {
            Some(InFlight::Projection { abort, mut rx }) => match rx.try_recv() {
                Ok(outcome) => self.finish_projection(outcome),
                Err(TryRecvError::Empty) => {
                    self.in_flight = Some(InFlight::Projection { abort, rx });
                    return self.state;
                }
                Err(TryRecvError::Closed) => self.abandon("projection"),
            },
            Some(InFlight::Illumination { abort, mut rx }) => match rx.try_recv() {
                Ok(outcome) => self.finish_illumination(outcome),
                Err(TryRecvError::Empty) => {
                    self.in_flight = Some(InFlight::Illumination { abort, rx });
                    return self.state;
                }
                Err(TryRecvError::Closed) => self.abandon("illumination"),
            },
            None => {}
        }

        if self.in_flight.is_none() {
            self.start_next();
        }
        self.state
    }

    fn invalidate(&mut self) {
        self.projection_current = false;
        self.halted = false;
        if let Some(in_flight) = &self.in_flight {
            in_flight.abort().raise();
            self.state = PipelineState::Aborting;
        }
    }

    fn abandon(&mut self, stage: &'static str) {
        error!(stage, "Pipeline task ended without a result; abandoning it");
        self.state = PipelineState::Idle;
        // The buffers went down with the task
        self.projection_current = false;
        self.needs_illumination = false;
        self.halted = true;
    }

    fn finish_projection(&mut self, outcome: ProjectionOutcome) {
        self.projected = Some(outcome.maps);

        if self.state == PipelineState::Aborting || !outcome.completed {
            debug!("Projection aborted");
            self.state = PipelineState::Idle;
            return;
        }

        self.projection_current = true;
        if !self.shutting_down {
            self.start_illumination();
        }
    }

    fn finish_illumination(&mut self, outcome: IlluminationOutcome) {
        let view = outcome.maps.view;
        self.projected = Some(outcome.maps);

        let composites = match outcome.composites {
            Some(c) if self.state != PipelineState::Aborting => c,
            _ => {
                debug!("Illumination aborted");
                self.state = PipelineState::Idle;
                return;
            }
        };

        self.generation += 1;
        let frame = Frame::new(
            self.generation,
            &view,
            self.station,
            outcome.sub_solar,
            outcome.computed_at,
            composites,
        );
        self.latest = Some(Arc::new(frame));
        self.state = PipelineState::Ready;
        self.frames_tx.send_replace(self.generation);
        debug!(
            generation = self.generation,
            mode = %view.mode(),
            size = %view.size(),
            "Frame published"
        );
    }

    fn start_next(&mut self) {
        if self.shutting_down {
            self.state = PipelineState::Idle;
            return;
        }
        if self.sources.is_none() || self.halted {
            return;
        }

        if !self.projection_current {
            self.start_projection();
        } else if self.needs_illumination {
            self.start_illumination();
        } else if self.state == PipelineState::Aborting {
            self.state = PipelineState::Idle;
        }
    }

    fn start_projection(&mut self) {
        let (Some(sources), Some(view)) = (self.sources.clone(), self.view_geometry()) else {
            return;
        };

        let maps = ProjectedMaps::reuse_or_blank(self.projected.take(), view);
        let abort = Arc::new(AbortFlag::new());
        let (tx, rx) = oneshot::channel();

        let task_abort = Arc::clone(&abort);
        self.runtime.spawn_blocking(move || {
            let mut maps = maps;
            let completed = project_maps(&sources, &mut maps, &task_abort);
            let _ = tx.send(ProjectionOutcome { maps, completed });
        });

        debug!(mode = %view.mode(), size = %view.size(), "Projection started");
        self.in_flight = Some(InFlight::Projection { abort, rx });
        self.state = PipelineState::ComputingProjection;
    }

    fn start_illumination(&mut self) {
        let Some(maps) = self.projected.take() else {
            return;
        };

        let computed_at = (self.clock)();
        let illuminator = Illuminator::at(self.settings, computed_at);
        let abort = Arc::new(AbortFlag::new());
        let (tx, rx) = oneshot::channel();

        let task_abort = Arc::clone(&abort);
        self.runtime.spawn_blocking(move || {
            let composites = illuminate(&illuminator, &maps, &task_abort);
            let _ = tx.send(IlluminationOutcome {
                maps,
                composites,
                sub_solar: illuminator.sub_solar(),
                computed_at,
            });
        });

        debug!(sub_solar = %illuminator.sub_solar().to_degrees(), "Illumination started");
        self.needs_illumination = false;
        self.in_flight = Some(InFlight::Illumination { abort, rx });
        self.state = PipelineState::ComputingIllumination;
    }
}

impl Drop for ProjectionPipeline {
    fn drop(&mut self) {
        if let Some(in_flight) = &self.in_flight {
            in_flight.abort().raise();
        }
    }
}
