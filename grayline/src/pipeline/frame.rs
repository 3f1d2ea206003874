//! Published frames.

use chrono::{DateTime, Utc};

use crate::buffers::ImageBuffer;
use crate::geo::GeoPosition;
use crate::illumination::Composites;
use crate::projection::{BufferSize, ProjectionMode, ViewGeometry};

/// One finished pair of illuminated views.
///
/// Frames are immutable once published and shared as `Arc<Frame>`, so the
/// presentation thread can keep uploading one while the next is computed.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Monotonic frame counter, matching the value sent on the frame channel.
    pub generation: u64,
    /// Mode that was selected when the frame was computed.
    pub mode: ProjectionMode,
    /// Size of both composites.
    pub size: BufferSize,
    /// Station the views are centred on.
    pub station: GeoPosition,
    /// Sub-solar point the mask was computed for, in radians.
    pub sub_solar: GeoPosition,
    /// Instant the sun position was taken at.
    pub computed_at: DateTime<Utc>,
    /// Illuminated Mercator view.
    pub mercator: ImageBuffer,
    /// Illuminated two-disk azimuthal view.
    pub azimuthal: ImageBuffer,
}

impl Frame {
    pub(crate) fn new(
        generation: u64,
        view: &ViewGeometry,
        station: GeoPosition,
        sub_solar: GeoPosition,
        computed_at: DateTime<Utc>,
        composites: Composites,
    ) -> Self {
        Self {
            generation,
            mode: view.mode(),
            size: view.size(),
            station,
            sub_solar,
            computed_at,
            mercator: composites.mercator,
            azimuthal: composites.azimuthal,
        }
    }

    /// The composite matching the frame's projection mode.
    pub fn display_buffer(&self) -> &ImageBuffer {
        if self.mode.is_azimuthal() {
            &self.azimuthal
        } else {
            &self.mercator
        }
    }

    /// Geometry for placing markers on [`Self::display_buffer`].
    pub fn view(&self) -> ViewGeometry {
        ViewGeometry::new(self.mode, self.size, self.station)
    }

    /// Geometry of [`Self::mercator`].
    ///
    /// Only the plain Mercator mode keeps the prime meridian centred; both
    /// station modes roll the map to the station.
    pub fn mercator_view(&self) -> ViewGeometry {
        let mode = match self.mode {
            ProjectionMode::Mercator => ProjectionMode::Mercator,
            ProjectionMode::StationMercator | ProjectionMode::StationAzimuthal => {
                ProjectionMode::StationMercator
            }
        };
        ViewGeometry::new(mode, self.size, self.station)
    }

    /// Geometry of [`Self::azimuthal`].
    pub fn azimuthal_view(&self) -> ViewGeometry {
        ViewGeometry::new(ProjectionMode::StationAzimuthal, self.size, self.station)
    }
}
