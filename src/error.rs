//! Crate-level error types.

use std::fmt;

use crate::gpu::render_context::RenderContextError;

/// Errors produced by the sphere-sprites crate.
#[derive(Debug)]
pub enum ParticleError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// An upload or writer range does not fit the position buffer.
    CapacityExceeded {
        /// Number of particle slots the operation needed.
        requested: usize,
        /// Number of particle slots the buffer holds.
        capacity: usize,
    },
    /// WGSL composition failed.
    ShaderCompose(String),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl fmt::Display for ParticleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::CapacityExceeded {
                requested,
                capacity,
            } => write!(
                f,
                "{requested} particles requested but the buffer holds \
                 {capacity}"
            ),
            Self::ShaderCompose(msg) => {
                write!(f, "shader composition error: {msg}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for ParticleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for ParticleError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<std::io::Error> for ParticleError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
