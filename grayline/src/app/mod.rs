//! Application bootstrap and lifecycle management.
//!
//! `GrayLineApp` owns a runtime, the map cache and the projection pipeline,
//! and connects them: maps reported by the cache are loaded as pipeline
//! sources, and the gray line is refreshed as the sun moves.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                       GrayLineApp                         │
//! │                                                           │
//! │  ResourceCache ──(key, status)──► load_source_maps        │
//! │   └── fetch tasks                  │                      │
//! │                                    ▼                      │
//! │                            ProjectionPipeline ──► Frame   │
//! │                             ├── projection task           │
//! │                             └── illumination task         │
//! └───────────────────────────────────────────────────────────┘
//! ```

mod bootstrap;
mod config;
mod error;

pub use bootstrap::{GrayLineApp, TICK_INTERVAL};
pub use config::{AppConfig, DEFAULT_FETCH_INTERVAL, DEFAULT_REFRESH_INTERVAL, MAPS_SUB_DIRECTORY};
pub use error::AppError;
