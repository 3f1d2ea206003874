//! INI parsing: `Ini` → `ConfigFile`.
//!
//! The single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::{ConfigFile, MAX_CACHE_TTL_HOURS};

fn invalid(section: &str, key: &str, value: &str, reason: impl Into<String>) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Parse `section.key` with `FromStr`, if present.
fn parse_value<T: FromStr>(
    props: &Properties,
    section: &str,
    key: &str,
    reason: &str,
) -> Result<Option<T>, ConfigFileError> {
    match props.get(key).map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| invalid(section, key, v, reason)),
    }
}

fn parse_ranged(
    props: &Properties,
    section: &str,
    key: &str,
    min: f64,
    max: f64,
) -> Result<Option<f64>, ConfigFileError> {
    let reason = format!("expected a number between {} and {}", min, max);
    let value: Option<f64> = parse_value(props, section, key, &reason)?;
    match value {
        Some(v) if !(min..=max).contains(&v) => Err(invalid(section, key, &v.to_string(), reason)),
        other => Ok(other),
    }
}

/// Expand a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

/// Parse an `Ini` into a `ConfigFile`, starting from defaults.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [station]
    if let Some(s) = ini.section(Some("station")) {
        if let Some(v) = parse_ranged(s, "station", "latitude", -90.0, 90.0)? {
            config.station.latitude = v;
        }
        if let Some(v) = parse_ranged(s, "station", "longitude", -180.0, 180.0)? {
            config.station.longitude = v;
        }
    }

    // [map]
    if let Some(s) = ini.section(Some("map")) {
        if let Some(v) = parse_value(s, "map", "style", "expected terrain or countries")? {
            config.map.style = v;
        }
        let dimension = "expected a positive pixel count";
        if let Some(v) = parse_value::<u32>(s, "map", "width", dimension)? {
            if v == 0 {
                return Err(invalid("map", "width", "0", dimension));
            }
            config.map.size.width = v;
        }
        if let Some(v) = parse_value::<u32>(s, "map", "height", dimension)? {
            if v == 0 {
                return Err(invalid("map", "height", "0", dimension));
            }
            config.map.size.height = v;
        }
        if let Some(v) = parse_value(
            s,
            "map",
            "mode",
            "expected mercator, station-mercator or station-azimuthal",
        )? {
            config.map.mode = v;
        }
    }

    // [cache]
    if let Some(s) = ini.section(Some("cache")) {
        if let Some(v) = s.get("directory").map(str::trim).filter(|v| !v.is_empty()) {
            config.cache.directory = expand_tilde(v);
        }
        if let Some(v) = s.get("root_uri").map(str::trim).filter(|v| !v.is_empty()) {
            config.cache.root_uri = v.to_string();
        }
        let hours = format!("expected whole hours between 0 and {}", MAX_CACHE_TTL_HOURS);
        if let Some(v) = parse_value::<u64>(s, "cache", "ttl_hours", &hours)? {
            if v > MAX_CACHE_TTL_HOURS {
                return Err(invalid("cache", "ttl_hours", &v.to_string(), hours));
            }
            config.cache.ttl_hours = v;
        }
    }

    // [grayline]
    if let Some(s) = ini.section(Some("grayline")) {
        let bands = "expected civil, nautical or astronomical";
        if let Some(v) = parse_value(s, "grayline", "band", bands)? {
            config.grayline.band = v;
        }
        if let Some(v) = parse_ranged(s, "grayline", "sharpness", 0.05, 10.0)? {
            config.grayline.sharpness = v;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::illumination::TwilightBand;
    use crate::maps::MapStyle;
    use crate::projection::ProjectionMode;

    fn parse(text: &str) -> Result<ConfigFile, ConfigFileError> {
        parse_ini(&Ini::load_from_str(text).unwrap())
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(parse("").unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_all_sections() {
        let config = parse(
            "[station]\nlatitude = 45.5\nlongitude = -75.25\n\
             [map]\nstyle = Countries\nwidth = 1320\nheight = 660\nmode = station-azimuthal\n\
             [cache]\ndirectory = /var/cache/grayline\n\
             root_uri = http://maps.local/\nttl_hours = 12\n\
             [grayline]\nband = civil\nsharpness = 1.5\n",
        )
        .unwrap();

        assert_eq!(config.station.latitude, 45.5);
        assert_eq!(config.station.longitude, -75.25);
        assert_eq!(config.map.style, MapStyle::Countries);
        assert_eq!(config.map.size.width, 1320);
        assert_eq!(config.map.mode, ProjectionMode::StationAzimuthal);
        assert_eq!(config.cache.directory, PathBuf::from("/var/cache/grayline"));
        assert_eq!(config.cache.root_uri, "http://maps.local/");
        assert_eq!(config.cache.ttl_hours, 12);
        assert_eq!(config.grayline.band, TwilightBand::Civil);
        assert_eq!(config.grayline.sharpness, 1.5);
    }

    #[test]
    fn test_blank_values_keep_defaults() {
        let config = parse("[cache]\nroot_uri =\n[station]\nlatitude =\n").unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_latitude_out_of_range() {
        let err = parse("[station]\nlatitude = 95\n").unwrap_err();
        match err {
            ConfigFileError::InvalidValue { section, key, .. } => {
                assert_eq!(section, "station");
                assert_eq!(key, "latitude");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(parse("[map]\nmode = globe\n").is_err());
        assert!(parse("[map]\nwidth = 0\n").is_err());
        assert!(parse("[cache]\nttl_hours = soon\n").is_err());
        assert!(parse("[grayline]\nband = dusk\n").is_err());
    }

    #[test]
    fn test_oversized_ttl_rejected() {
        let err = parse("[cache]\nttl_hours = 18446744073709551615\n").unwrap_err();
        match err {
            ConfigFileError::InvalidValue { section, key, .. } => {
                assert_eq!(section, "cache");
                assert_eq!(key, "ttl_hours");
            }
            other => panic!("unexpected error: {}", other),
        }

        let max = format!("[cache]\nttl_hours = {}\n", MAX_CACHE_TTL_HOURS);
        assert_eq!(parse(&max).unwrap().cache.ttl_hours, MAX_CACHE_TTL_HOURS);
        assert!(parse(&format!("[cache]\nttl_hours = {}\n", MAX_CACHE_TTL_HOURS + 1)).is_err());
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/maps"), home.join("maps"));
        }
    }
}
