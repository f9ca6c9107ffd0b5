//! Rendering options with TOML preset support.
//!
//! Particle appearance and camera settings are consolidated here. Options
//! serialize to/from TOML so the viewer can start from a preset file.

mod camera;
mod particles;

use std::path::Path;

pub use camera::CameraOptions;
pub use particles::ParticleOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ParticleError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[particles]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Particle appearance.
    pub particles: ParticleOptions,
    /// Camera projection and control parameters.
    pub camera: CameraOptions,
}

impl Options {
    /// Generate JSON Schema describing the options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ParticleError::Io`] if the file cannot be read and
    /// [`ParticleError::OptionsParse`] if it is not valid options TOML.
    pub fn load(path: &Path) -> Result<Self, ParticleError> {
        let content =
            std::fs::read_to_string(path).map_err(ParticleError::Io)?;
        toml::from_str(&content)
            .map_err(|e| ParticleError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`ParticleError::OptionsParse`] if serialization fails and
    /// [`ParticleError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ParticleError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ParticleError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ParticleError::Io)?;
        }
        std::fs::write(path, content).map_err(ParticleError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}
