//! Integration tests for the projection pipeline.
//!
//! These drive the public pipeline API the way a presentation loop does:
//! hand over sources, poll until a frame is published, and inspect the
//! composites through the frame's view geometry.
//!
//! Run with: `cargo test --test pipeline_integration`

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{TimeZone, Utc};
use image::Rgba;

use grayline::buffers::ImageBuffer;
use grayline::context::EngineContext;
use grayline::geo::GeoPosition;
use grayline::pipeline::{Clock, Frame, PipelineState, ProjectionPipeline};
use grayline::projection::{BufferSize, ProjectionMode};

// ============================================================================
// Helper Functions
// ============================================================================

const SOURCE_SIZE: BufferSize = BufferSize::new(128, 64);
const DAY: [u8; 4] = [250, 250, 250, 255];
const NIGHT: [u8; 4] = [0, 0, 40, 255];

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .build()
        .unwrap()
}

/// March equinox noon: the sun is overhead near (0°, 0°).
fn equinox_clock() -> Clock {
    Arc::new(|| Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap())
}

fn pipeline(
    rt: &tokio::runtime::Runtime,
    station: GeoPosition,
    mode: ProjectionMode,
) -> ProjectionPipeline {
    let ctx = EngineContext::new(rt.handle().clone(), std::env::temp_dir());
    let mut p = ProjectionPipeline::new(&ctx, station, mode, BufferSize::new(0, 0))
        .with_clock(equinox_clock());
    p.set_sources(
        ImageBuffer::from_pixel(SOURCE_SIZE.width, SOURCE_SIZE.height, Rgba(DAY)),
        ImageBuffer::from_pixel(SOURCE_SIZE.width, SOURCE_SIZE.height, Rgba(NIGHT)),
    )
    .unwrap();
    p
}

fn wait_for_frame(p: &mut ProjectionPipeline, after: u64) -> Arc<Frame> {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if p.poll() == PipelineState::Ready {
            if let Some(frame) = p.latest_frame().filter(|f| f.generation > after) {
                return frame;
            }
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    panic!("no frame after generation {} within 10s", after);
}

fn pixel(buffer: &ImageBuffer, x: i32, y: i32) -> [u8; 4] {
    buffer.get_pixel(x as u32, y as u32).0
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_mercator_frame_is_lit_under_the_sun_and_dark_opposite() {
    let rt = runtime();
    let mut p = pipeline(&rt, GeoPosition::degrees(0.0, 0.0), ProjectionMode::Mercator);
    let frame = wait_for_frame(&mut p, 0);

    assert_eq!(frame.size, SOURCE_SIZE);
    let sun = frame.sub_solar.to_degrees();
    assert!(sun.lat().abs() < 1.0, "equinox sun near the equator: {}", sun);
    assert!(sun.lon().abs() < 5.0, "noon sun near Greenwich: {}", sun);

    let view = frame.view();
    let under_sun = view.geo_to_pixel(frame.sub_solar);
    assert_eq!(pixel(&frame.mercator, under_sun.x, under_sun.y), DAY);

    // Antimeridian on the equator is deep night
    let opposite = view.geo_to_pixel(GeoPosition::degrees(0.0, 179.0));
    let dark = pixel(&frame.mercator, opposite.x, opposite.y);
    assert!(dark[0] < 20, "expected night at the antimeridian, got {:?}", dark);
}

#[test]
fn test_station_change_recentres_the_next_frame() {
    let rt = runtime();
    let mut p = pipeline(&rt, GeoPosition::degrees(0.0, 0.0), ProjectionMode::StationMercator);
    let first = wait_for_frame(&mut p, 0);

    let station = GeoPosition::degrees(20.0, 90.0);
    p.set_station(station);
    let second = wait_for_frame(&mut p, first.generation);

    assert_eq!(second.station, station);
    let centre = second.view().geo_to_pixel(station);
    assert_eq!(centre.x, SOURCE_SIZE.width as i32 / 2);

    // The sun moved from the centre column towards the left edge
    let sun_before = first.view().geo_to_pixel(first.sub_solar);
    let sun_after = second.view().geo_to_pixel(second.sub_solar);
    assert!(sun_after.x < sun_before.x);
}

#[test]
fn test_rapid_changes_settle_on_the_last_parameters() {
    let rt = runtime();
    let mut p = pipeline(&rt, GeoPosition::degrees(0.0, 0.0), ProjectionMode::Mercator);

    p.set_mode(ProjectionMode::StationMercator);
    p.set_station(GeoPosition::degrees(-30.0, 45.0));
    p.set_mode(ProjectionMode::StationAzimuthal);

    let frame = wait_for_frame(&mut p, 0);
    assert_eq!(frame.mode, ProjectionMode::StationAzimuthal);
    assert_eq!(frame.station, GeoPosition::degrees(-30.0, 45.0));
}

#[test]
fn test_azimuthal_frame_has_two_disks() {
    let rt = runtime();
    let mut p = pipeline(&rt, GeoPosition::degrees(51.5, 0.0), ProjectionMode::StationAzimuthal);
    let frame = wait_for_frame(&mut p, 0);

    let quarter = SOURCE_SIZE.width as i32 / 4;
    let middle = SOURCE_SIZE.height as i32 / 2;
    assert_eq!(pixel(&frame.azimuthal, quarter, middle)[3], 255);
    assert_eq!(pixel(&frame.azimuthal, 3 * quarter, middle)[3], 255);
    // Corners lie outside both disks
    assert_eq!(pixel(&frame.azimuthal, 0, 0), [0, 0, 0, 0]);
    assert_eq!(frame.display_buffer(), &frame.azimuthal);
}

#[test]
fn test_shutdown_stops_publishing() {
    let rt = runtime();
    let mut p = pipeline(&rt, GeoPosition::degrees(0.0, 0.0), ProjectionMode::Mercator);
    let frame = wait_for_frame(&mut p, 0);

    p.shutdown();
    p.request_refresh();

    let deadline = Instant::now() + Duration::from_millis(200);
    while Instant::now() < deadline {
        p.poll();
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(p.is_shut_down());
    assert_eq!(p.latest_frame().map(|f| f.generation), Some(frame.generation));
}
