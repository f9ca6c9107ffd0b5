//! Camera system for 3D scene viewing.
//!
//! Provides an orbital camera with rotation, zoom and fit-to-points,
//! producing the view and projection matrices sprite draws take.

/// Orbital camera controller managing rotation and zoom.
pub mod controller;
/// Core camera struct.
pub mod core;
