//! CLI command implementations.
//!
//! # Command Modules
//!
//! - [`config`] - Configuration management (init, show, path)
//! - [`fetch`] - Download or refresh the background maps
//! - [`render`] - Write one illuminated frame as PNG files
//! - [`sun`] - Sub-solar point and station daylight
//! - [`watch`] - Keep the PNG files current until interrupted

pub mod common;
pub mod config;
pub mod fetch;
pub mod render;
pub mod sun;
pub mod watch;
