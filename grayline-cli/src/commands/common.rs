//! Common types and utilities shared across CLI commands.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use grayline::app::AppConfig;
use grayline::config::{config_file_path, ConfigFile};
use grayline::geo::GeoPosition;
use grayline::projection::{BufferSize, ProjectionMode};

use crate::error::CliError;

/// Projection selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum ModeArg {
    /// Plain Mercator map centred on the prime meridian
    Mercator,
    /// Mercator map centred on the station longitude
    StationMercator,
    /// Near and far hemispheres as azimuthal disks around the station
    StationAzimuthal,
}

impl From<ModeArg> for ProjectionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Mercator => ProjectionMode::Mercator,
            ModeArg::StationMercator => ProjectionMode::StationMercator,
            ModeArg::StationAzimuthal => ProjectionMode::StationAzimuthal,
        }
    }
}

/// Overrides for the view, shared by `render` and `watch`.
#[derive(Debug, Clone, Default, Args)]
pub struct ViewArgs {
    /// Station latitude in decimal degrees (overrides config)
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Station longitude in decimal degrees (overrides config)
    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Projection mode (overrides config)
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Output width in pixels; height is half the width
    #[arg(long)]
    pub width: Option<u32>,
}

/// Path of the config file, honouring `--config`.
pub fn resolve_config_path(cli_path: Option<&Path>) -> PathBuf {
    cli_path.map(Path::to_path_buf).unwrap_or_else(config_file_path)
}

/// Load the config file, falling back to defaults when it does not exist.
pub fn load_config(cli_path: Option<&Path>) -> Result<ConfigFile, CliError> {
    Ok(ConfigFile::load_from(&resolve_config_path(cli_path))?)
}

/// Build the engine config, CLI arguments taking precedence over the file.
pub fn resolve_app_config(config: &ConfigFile, view: &ViewArgs) -> Result<AppConfig, CliError> {
    let mut app = AppConfig::from_config_file(config);

    if view.lat.is_some() || view.lon.is_some() {
        let lat = view.lat.unwrap_or(config.station.latitude);
        let lon = view.lon.unwrap_or(config.station.longitude);
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(CliError::Config(format!(
                "station {}, {} is outside -90..90, -180..180",
                lat, lon
            )));
        }
        app = app.with_station(GeoPosition::degrees(lat, lon));
    }

    if let Some(mode) = view.mode {
        app = app.with_mode(mode.into());
    }

    if let Some(width) = view.width {
        if width < 2 {
            return Err(CliError::Config("--width must be at least 2".to_string()));
        }
        app = app.with_viewport(BufferSize::new(width, width / 2));
    }

    Ok(app)
}

/// Create an output directory if needed.
pub fn ensure_directory(path: &Path) -> Result<(), CliError> {
    std::fs::create_dir_all(path).map_err(|error| CliError::Directory {
        path: path.display().to_string(),
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let mut config = ConfigFile::default();
        config.station.latitude = 10.0;
        config.station.longitude = 20.0;

        let view = ViewArgs {
            lon: Some(-75.0),
            mode: Some(ModeArg::StationAzimuthal),
            width: Some(400),
            ..ViewArgs::default()
        };
        let app = resolve_app_config(&config, &view).unwrap();

        assert_eq!(app.station, GeoPosition::degrees(10.0, -75.0));
        assert_eq!(app.mode, ProjectionMode::StationAzimuthal);
        assert_eq!(app.viewport, BufferSize::new(400, 200));
    }

    #[test]
    fn test_config_used_without_overrides() {
        let mut config = ConfigFile::default();
        config.map.mode = ProjectionMode::StationMercator;

        let app = resolve_app_config(&config, &ViewArgs::default()).unwrap();
        assert_eq!(app.mode, ProjectionMode::StationMercator);
        assert!(app.viewport.is_empty());
    }

    #[test]
    fn test_out_of_range_station_rejected() {
        let view = ViewArgs {
            lat: Some(95.0),
            ..ViewArgs::default()
        };
        let err = resolve_app_config(&ConfigFile::default(), &view).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_resolve_config_path_prefers_argument() {
        let path = PathBuf::from("/tmp/custom.ini");
        assert_eq!(resolve_config_path(Some(path.as_path())), path);
        assert_eq!(resolve_config_path(None), config_file_path());
    }
}
