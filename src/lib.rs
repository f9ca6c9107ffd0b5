// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Function signature hygiene
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
// GPU / graphics allowances (mirrors the workspace table)
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::float_cmp)]
#![allow(clippy::suboptimal_flops)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::redundant_pub_crate)]
#![allow(clippy::doc_markdown)]
// Tests assert with unwrap/panic
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::panic))]

//! Point-sprite particle rendering on wgpu, shading every particle as a
//! sphere.
//!
//! # Key entry points
//!
//! - [`renderer::particle::ParticleRenderer`] - owns the position buffer and
//!   the standard and CMYK sprite programs
//! - [`gpu::render_context::RenderContext`] - device, queue and surface
//! - [`options::Options`] - TOML-backed particle and camera settings
//! - `viewer::Viewer` (feature `viewer`) - a standalone demo window
//!
//! # Drawing model
//!
//! wgpu has no sized point primitive, so each particle is drawn as a
//! 4-vertex triangle strip instanced over the position buffer. The vertex
//! stage derives the sprite footprint from the point size and screen width;
//! the fragment stage discards outside the unit disc, lights the sphere
//! normal and writes the sphere's depth.

pub mod camera;
pub mod error;
pub mod gpu;
pub mod options;
pub mod renderer;
pub mod util;
#[cfg(feature = "viewer")]
pub mod viewer;
