//! Grayline - day/night world maps with a live gray line
//!
//! This library renders the Earth's day/night terminator over background
//! maps in Mercator and station-centred azimuthal views:
//!
//! - [`geo`] and [`projection`] map between pixels and geocoordinates
//! - [`illumination`] locates the sun and blends the day and night maps
//! - [`pipeline`] runs projection and illumination as cancellable background work
//! - [`resource_cache`] keeps the background maps downloaded and fresh
//! - [`app`] wires everything together for a host application

pub mod abort;
pub mod app;
pub mod buffers;
pub mod config;
pub mod context;
pub mod geo;
pub mod illumination;
pub mod logging;
pub mod maps;
pub mod pipeline;
pub mod projection;
pub mod resource_cache;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
