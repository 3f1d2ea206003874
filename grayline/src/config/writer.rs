//! INI serialization: `ConfigFile` → commented INI text.

use super::settings::ConfigFile;

/// Render a `ConfigFile` as the commented INI written to `config.ini`.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[station]
; Station position in decimal degrees (north and east positive)
latitude = {latitude}
longitude = {longitude}

[map]
; Background artwork: terrain or countries
style = {style}
; Size of the downloaded day/night maps
width = {width}
height = {height}
; View: mercator, station-mercator or station-azimuthal
mode = {mode}

[cache]
; Where downloaded maps are kept
directory = {directory}
; Remote directory the maps are fetched from
root_uri = {root_uri}
; Hours before a cached map is checked for updates
ttl_hours = {ttl_hours}

[grayline]
; Twilight band: civil (6°), nautical (12°) or astronomical (18°)
band = {band}
; Falloff exponent across the band; larger keeps twilight brighter
sharpness = {sharpness}
"#,
        latitude = config.station.latitude,
        longitude = config.station.longitude,
        style = config.map.style.as_str().to_lowercase(),
        width = config.map.size.width,
        height = config.map.size.height,
        mode = config.map.mode,
        directory = config.cache.directory.display(),
        root_uri = config.cache.root_uri,
        ttl_hours = config.cache.ttl_hours,
        band = config.grayline.band,
        sharpness = config.grayline.sharpness,
    )
}

#[cfg(test)]
mod tests {
    use super::super::parser::parse_ini;
    use super::*;
    use ini::Ini;

    #[test]
    fn test_written_config_parses_back() {
        let mut config = ConfigFile::default();
        config.station.latitude = -33.9;
        config.station.longitude = 18.4;
        config.map.mode = crate::projection::ProjectionMode::StationMercator;
        config.grayline.sharpness = 2.0;

        let text = to_config_string(&config);
        let parsed = parse_ini(&Ini::load_from_str(&text).unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_written_config_has_comments() {
        let text = to_config_string(&ConfigFile::default());
        assert!(text.contains("; Twilight band"));
        assert!(text.contains("mode = mercator"));
    }
}
