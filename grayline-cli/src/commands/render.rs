//! `render` command: produce one illuminated frame as PNG files.
//!
//! Writes `grayline-mercator.png` and `grayline-azimuthal.png`, each with
//! the station and the sub-solar point marked.

use std::path::{Path, PathBuf};
use std::time::Duration;

use grayline::app::{AppConfig, GrayLineApp};
use grayline::buffers::ImageBuffer;
use grayline::geo::GeoPosition;
use grayline::pipeline::Frame;
use grayline::projection::{PixelPosition, ViewGeometry};
use image::Rgba;

use super::common::ensure_directory;
use crate::error::CliError;

/// File name of the Mercator composite.
pub const MERCATOR_FILE: &str = "grayline-mercator.png";

/// File name of the azimuthal composite.
pub const AZIMUTHAL_FILE: &str = "grayline-azimuthal.png";

const STATION_COLOR: Rgba<u8> = Rgba([255, 48, 48, 255]);
const STATION_RADIUS: i32 = 3;
const SUN_COLOR: Rgba<u8> = Rgba([255, 214, 0, 255]);
const SUN_RADIUS: i32 = 5;

/// Render a single frame into `out_dir`.
pub fn run(config: AppConfig, out_dir: &Path, timeout: Duration) -> Result<(), CliError> {
    ensure_directory(out_dir)?;

    let mut app = GrayLineApp::start(config)?;
    let frame = match app.wait_for_frame(timeout) {
        Ok(frame) => frame,
        Err(e) => {
            app.shutdown();
            return Err(e.into());
        }
    };
    app.shutdown();

    for path in write_frame(&frame, out_dir)? {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// Save both composites of a frame with markers drawn on them.
pub fn write_frame(frame: &Frame, out_dir: &Path) -> Result<Vec<PathBuf>, CliError> {
    let views = [
        (MERCATOR_FILE, &frame.mercator, frame.mercator_view()),
        (AZIMUTHAL_FILE, &frame.azimuthal, frame.azimuthal_view()),
    ];

    let mut written = Vec::with_capacity(views.len());
    for (name, buffer, view) in views {
        let mut image = buffer.clone();
        draw_markers(&mut image, &view, frame.station, frame.sub_solar);

        let path = out_dir.join(name);
        image.save(&path).map_err(|error| CliError::FileWrite {
            path: path.display().to_string(),
            error,
        })?;
        written.push(path);
    }
    Ok(written)
}

/// Mark the station and the sub-solar point.
pub fn draw_markers(
    image: &mut ImageBuffer,
    view: &ViewGeometry,
    station: GeoPosition,
    sun: GeoPosition,
) {
    draw_disk(image, view.geo_to_pixel(sun), SUN_RADIUS, SUN_COLOR);
    draw_disk(image, view.geo_to_pixel(station), STATION_RADIUS, STATION_COLOR);
}

/// Fill a disk, clipped to the image.
fn draw_disk(image: &mut ImageBuffer, center: PixelPosition, radius: i32, color: Rgba<u8>) {
    let (width, height) = (image.width() as i32, image.height() as i32);
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy > radius * radius {
                continue;
            }
            let (x, y) = (center.x + dx, center.y + dy);
            if x >= 0 && y >= 0 && x < width && y < height {
                image.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}
