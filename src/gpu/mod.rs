//! GPU resource management utilities.
//!
//! Provides wgpu device/surface initialization, dynamic-offset uniform
//! storage, render targets, and shader composition.

/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// WGSL shader composition with `#import` support via naga-oil.
pub mod shader_composer;
/// Framework-agnostic render-target texture abstraction.
pub mod texture;
pub mod uniform_ring;
