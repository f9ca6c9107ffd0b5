//! Rendering subsystems.
//!
//! Contains the point-sprite particle renderer and the pipeline state it
//! shares with any future passes.

pub mod particle;
pub(crate) mod pipeline_util;
