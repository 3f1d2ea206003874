//! `sun` command: where the sun is overhead and how lit the station is.

use chrono::{DateTime, Utc};
use grayline::config::ConfigFile;
use grayline::illumination::{sub_solar_point, Illuminator, GRAYLINE_FLOOR_ALPHA};

use crate::error::CliError;

/// Parse an RFC 3339 instant, e.g. `2024-06-20T16:13:20Z`.
pub fn parse_time(value: &str) -> Result<DateTime<Utc>, CliError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| CliError::InvalidTime(value.to_string()))
}

/// Describe a day-fraction the way an operator would.
pub fn describe_alpha(alpha: f64) -> &'static str {
    if alpha >= 1.0 {
        "day"
    } else if alpha > GRAYLINE_FLOOR_ALPHA {
        "twilight"
    } else {
        "night"
    }
}

/// Print the sub-solar point and the station's illumination.
pub fn run(config: &ConfigFile, time: Option<&str>) -> Result<(), CliError> {
    let now = match time {
        Some(value) => parse_time(value)?,
        None => Utc::now(),
    };

    let sun = sub_solar_point(now).to_degrees();
    let station = config.station_position();
    let alpha = Illuminator::at(config.gray_line_settings(), now).alpha_at(station);

    println!("Time:      {}", now.to_rfc3339());
    println!("Sub-solar: {:.2}°, {:.2}°", sun.lat(), sun.lon());
    println!("Station:   {:.2}°, {:.2}°", station.lat(), station.lon());
    println!(
        "Daylight:  {:.0}% ({}, {} twilight)",
        alpha * 100.0,
        describe_alpha(alpha),
        config.grayline.band
    );

    Ok(())
}
