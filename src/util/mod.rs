//! Shared utilities.

pub mod cloud;
