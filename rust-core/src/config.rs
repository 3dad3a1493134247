// Constants

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DiffcalcError, Result};

// Tolerances
pub const LATTICE_TOLERANCE: f64 = 1e-10; // For lattice parameter validation and classification
pub const VECTOR_TOLERANCE: f64 = 1e-8; // Below this a vector or cross product counts as zero
pub const ANGLE_TOLERANCE: f64 = 1e-8; // Radians; equality of angles and gimbal detection
pub const HKL_TOLERANCE: f64 = 1e-6; // A branch must map back to the target hkl within this
pub const ROTATION_TOLERANCE: f64 = 1e-6; // Orthonormality of supplied U matrices
pub const CLASSIFICATION_TOLERANCE: f64 = 1e-6; // Crystal system detection from the metric

// Physical constants
pub const ENERGY_WAVELENGTH_PRODUCT: f64 = 12.3984; // keV * Å

// Defaults
pub const DEFAULT_GEOMETRY: &str = "sixc";
pub const DEFAULT_LOG_TARGET: &str = "diffcalc";
pub const DEFAULT_RESIDUAL_THRESHOLD_DEG: f64 = 0.5;

/// Travel range of one axis in degrees. Either bound may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct AxisLimit {
    #[serde(default)]
    pub lower: Option<f64>,
    #[serde(default)]
    pub upper: Option<f64>,
}

/// Configuration of one calculation session.
///
/// Everything has a default so an empty JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Geometry family name, see [`crate::geometry::geometry_from_name`]
    pub geometry: String,
    /// Reference (surface normal) vector in the phi frame
    pub reference: [f64; 3],
    /// Travel limits keyed by canonical axis name (`alpha`, `delta`, ...)
    pub limits: BTreeMap<String, AxisLimit>,
    /// Overrides for hardware-fixed axis values in degrees, keyed by canonical axis name
    pub fixed_axes: BTreeMap<String, f64>,
    /// Reflection residual (degrees) above which a UB fit warns
    pub residual_threshold: f64,
    /// Log target used for every record the session emits
    pub log_target: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            geometry: DEFAULT_GEOMETRY.to_string(),
            reference: [0.0, 0.0, 1.0],
            limits: BTreeMap::new(),
            fixed_axes: BTreeMap::new(),
            residual_threshold: DEFAULT_RESIDUAL_THRESHOLD_DEG,
            log_target: DEFAULT_LOG_TARGET.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| DiffcalcError::invalid_input(format!("bad session config: {e}")))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            DiffcalcError::invalid_input(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
    }

    pub fn with_geometry(mut self, name: impl Into<String>) -> Self {
        self.geometry = name.into();
        self
    }

    pub fn with_limit(mut self, axis: &str, lower: Option<f64>, upper: Option<f64>) -> Self {
        self.limits
            .insert(axis.to_string(), AxisLimit { lower, upper });
        self
    }
}
