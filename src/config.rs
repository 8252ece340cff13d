//! Analysis settings.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::InputError;
use crate::model::{DEFAULT_AREA, DEFAULT_ELASTIC_MODULUS};

/// Numerical settings for the linear solve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Smallest accepted ratio of the extreme singular values of the reduced
    /// stiffness matrix. Anything at or below it is reported as singular.
    pub singularity_tolerance: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            singularity_tolerance: 1.0e-12,
        }
    }
}

/// Section and material assigned by the loaders when an input omits them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialDefaults {
    /// Elastic modulus in pascals.
    pub elastic_modulus: f64,
    /// Cross-sectional area in square metres.
    pub area: f64,
}

impl Default for MaterialDefaults {
    fn default() -> Self {
        Self {
            elastic_modulus: DEFAULT_ELASTIC_MODULUS,
            area: DEFAULT_AREA,
        }
    }
}

/// Top-level settings, usually read from a JSON file.
///
/// # Examples
/// ```
/// use truss2d::Settings;
///
/// let settings = Settings::from_json(r#"{ "solver": { "singularity_tolerance": 1e-9 } }"#).unwrap();
/// assert_eq!(settings.solver.singularity_tolerance, 1e-9);
/// assert_eq!(settings.material.area, 0.01);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Linear solve settings.
    pub solver: SolverSettings,
    /// Loader defaults for bars.
    pub material: MaterialDefaults,
}

impl Settings {
    /// Parse settings from a JSON document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Json`] when the document is malformed.
    pub fn from_json(text: &str) -> Result<Self, InputError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Io`] when the file cannot be read and
    /// [`InputError::Json`] when it is malformed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
