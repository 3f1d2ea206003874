//! Pipeline configuration errors.

use thiserror::Error;

use crate::projection::BufferSize;

/// Errors returned when the pipeline is given unusable inputs.
///
/// Cancellation is never reported through this type; an aborted computation
/// simply restarts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Day and night source maps differ in size.
    #[error("day map is {day} but night map is {night}")]
    DimensionMismatch { day: BufferSize, night: BufferSize },

    /// A source map has no pixels.
    #[error("source map is empty")]
    EmptySource,
}
