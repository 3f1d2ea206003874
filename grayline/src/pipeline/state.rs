//! Pipeline lifecycle states.

use std::fmt;

/// Where the pipeline is in producing the next frame.
///
/// ```text
/// Idle ──► ComputingProjection ──► ComputingIllumination ──► Ready
///                 │                          │
///                 └────────► Aborting ◄──────┘
///                               │
///                               ▼
///                             Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PipelineState {
    /// Nothing running; waiting for sources or a parameter change.
    #[default]
    Idle,
    /// Resampling the sources into the derived projections.
    ComputingProjection,
    /// Compositing day and night with the gray-line mask.
    ComputingIllumination,
    /// A frame for the current parameters has been published.
    Ready,
    /// Work in flight has been told to stop; its result will be discarded.
    Aborting,
}

impl PipelineState {
    /// Returns true while a background task is running.
    pub fn is_computing(&self) -> bool {
        matches!(
            self,
            PipelineState::ComputingProjection
                | PipelineState::ComputingIllumination
                | PipelineState::Aborting
        )
    }

    /// Short lowercase name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::ComputingProjection => "computing-projection",
            PipelineState::ComputingIllumination => "computing-illumination",
            PipelineState::Ready => "ready",
            PipelineState::Aborting => "aborting",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
