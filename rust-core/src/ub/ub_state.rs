use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::orientation::{fit_u_with_target, Orientation, OrientationFit};
use super::reflection::Reflection;
use crate::config::{DEFAULT_LOG_TARGET, ROTATION_TOLERANCE};
use crate::error::{DiffcalcError, Result};
use crate::lattice::{Lattice, LatticeParameters};

/// Persisted orientation session: crystal, reference reflections and the
/// orientation last derived from them.
///
/// `u`/`ub` absent means the orientation must be recomputed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrientationState {
    pub name: String,
    #[serde(default)]
    pub crystal_name: Option<String>,
    #[serde(default)]
    pub lattice: Option<LatticeParameters>,
    #[serde(default)]
    reflections: Vec<Reflection>,
    #[serde(default)]
    u: Option<Matrix3<f64>>,
    #[serde(default)]
    ub: Option<Matrix3<f64>>,
}

impl OrientationState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse and validate persisted state
    pub fn from_json(text: &str) -> Result<Self> {
        let state: OrientationState = serde_json::from_str(text)?;
        state.validate()?;
        Ok(state)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            DiffcalcError::invalid_state(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Replace the lattice. Any orientation derived from the old one is dropped.
    pub fn set_lattice(&mut self, lattice: &Lattice) {
        self.lattice = Some(*lattice.parameters());
        self.crystal_name = lattice.name.clone();
        self.clear_orientation();
    }

    pub fn lattice(&self) -> Result<Option<Lattice>> {
        self.lattice
            .map(|params| -> Result<Lattice> {
                let lattice = Lattice::from_lattice_parameters(params)?;
                Ok(match &self.crystal_name {
                    Some(name) => lattice.with_name(name.clone()),
                    None => lattice,
                })
            })
            .transpose()
    }

    fn require_lattice(&self) -> Result<Lattice> {
        self.lattice()?
            .ok_or_else(|| DiffcalcError::invalid_state("no lattice has been set"))
    }

    pub fn reflections(&self) -> &[Reflection] {
        &self.reflections
    }

    /// Append a reflection. The stored orientation no longer matches the set and is dropped.
    pub fn add_reflection(&mut self, reflection: Reflection) -> Result<()> {
        reflection.validate()?;
        self.reflections.push(reflection);
        self.clear_orientation();
        Ok(())
    }

    /// Remove the reflection at `index` (0-based), dropping the stored orientation
    pub fn remove_reflection(&mut self, index: usize) -> Result<Reflection> {
        if index >= self.reflections.len() {
            return Err(DiffcalcError::invalid_input(format!(
                "no reflection {index}, the state holds {}",
                self.reflections.len()
            )));
        }
        self.clear_orientation();
        Ok(self.reflections.remove(index))
    }

    pub fn orientation(&self) -> Option<Orientation> {
        match (self.u, self.ub) {
            (Some(u), Some(ub)) => Some(Orientation { u, ub }),
            _ => None,
        }
    }

    pub fn require_orientation(&self) -> Result<Orientation> {
        self.orientation()
            .ok_or_else(|| DiffcalcError::invalid_state("orientation has not been calculated"))
    }

    pub fn clear_orientation(&mut self) {
        self.u = None;
        self.ub = None;
    }

    /// Recompute U and UB from the reflections.
    ///
    /// Either both are replaced or, on error, the previous pair is kept.
    pub fn recompute(&mut self, threshold_deg: f64) -> Result<OrientationFit> {
        self.recompute_with_target(threshold_deg, DEFAULT_LOG_TARGET)
    }

    /// [`recompute`](Self::recompute) logging under `log_target`
    pub fn recompute_with_target(
        &mut self,
        threshold_deg: f64,
        log_target: &str,
    ) -> Result<OrientationFit> {
        let lattice = self.require_lattice()?;
        let fit = fit_u_with_target(
            &self.reflections,
            lattice.b_matrix(),
            threshold_deg,
            log_target,
        )?;
        self.store(fit.orientation);
        Ok(fit)
    }

    /// Use a manually supplied U
    pub fn set_u(&mut self, u: Matrix3<f64>) -> Result<Orientation> {
        let lattice = self.require_lattice()?;
        let orientation = Orientation::from_u(u, lattice.b_matrix())?;
        self.store(orientation);
        Ok(orientation)
    }

    /// Use a manually supplied UB
    pub fn set_ub(&mut self, ub: Matrix3<f64>) -> Result<Orientation> {
        let lattice = self.require_lattice()?;
        let orientation = Orientation::from_ub(ub, lattice.b_matrix())?;
        self.store(orientation);
        Ok(orientation)
    }

    fn store(&mut self, orientation: Orientation) {
        self.u = Some(orientation.u);
        self.ub = Some(orientation.ub);
    }

    /// Invariants of a loaded state
    pub fn validate(&self) -> Result<()> {
        for reflection in &self.reflections {
            reflection.validate()?;
        }
        let lattice = self
            .lattice()
            .map_err(|e| DiffcalcError::invalid_state(format!("stored lattice is invalid: {e}")))?;

        match (self.u, self.ub) {
            (None, None) => Ok(()),
            (Some(_), None) | (None, Some(_)) => Err(DiffcalcError::invalid_state(
                "U and UB must be stored together",
            )),
            (Some(u), Some(ub)) => {
                let lattice = lattice.ok_or_else(|| {
                    DiffcalcError::invalid_state("UB is stored without a lattice")
                })?;
                if self.reflections.len() < 2 {
                    return Err(DiffcalcError::invalid_state(format!(
                        "UB is stored with {} reflection(s), at least two are needed",
                        self.reflections.len()
                    )));
                }
                Orientation::from_u(u, lattice.b_matrix())
                    .map_err(|e| DiffcalcError::invalid_state(e.to_string()))?;
                let mismatch = (u * lattice.b_matrix() - ub).norm() / ub.norm().max(1.0);
                if mismatch > ROTATION_TOLERANCE {
                    return Err(DiffcalcError::invalid_state(format!(
                        "stored UB differs from U·B (relative error {mismatch:.2e})"
                    )));
                }
                Ok(())
            }
        }
    }
}
