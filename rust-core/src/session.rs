//! Calculation session
//!
//! Bundles everything one diffractometer setup needs between calls: the
//! geometry adapter, hardware limits, reference vector, orientation state,
//! the selected mode with its parameter values, the beam energy and the last
//! known position. Angles cross this boundary in degrees on the geometry's
//! physical motors; everything below it works on the canonical six-circle in
//! radians.

use log::{debug, info};
use nalgebra::Vector3;
use std::collections::HashMap;

use crate::calc::{
    angles_to_hkl, hkl_to_angles, virtual_angles, SolveContext, Solution, VirtualAngles,
};
use crate::config::{SessionConfig, VECTOR_TOLERANCE};
use crate::error::{DiffcalcError, Result};
use crate::geometry::{geometry_from_config, DiffractometerGeometry, HardwareLimits, Position};
use crate::interfaces::{check_wavelength, energy_to_wavelength, wavelength_to_energy, Hkl};
use crate::modes::{ConstraintName, ConstraintSet, Mode, ModeSelector};
use crate::ub::{OrientationFit, OrientationState, Reflection};

#[derive(Debug)]
pub struct CalculationSession {
    config: SessionConfig,
    geometry: Box<dyn DiffractometerGeometry>,
    limits: HardwareLimits,
    reference: Vector3<f64>,
    state: OrientationState,
    selector: ModeSelector,
    /// Mode parameter values in degrees
    parameters: HashMap<String, f64>,
    wavelength: Option<f64>,
    last_position: Option<Position>,
}

impl CalculationSession {
    pub fn new(config: SessionConfig) -> Result<Self> {
        let geometry = geometry_from_config(&config)?;
        let limits = HardwareLimits::from_config(&config.limits, geometry.as_ref())?;
        let reference = Vector3::from(config.reference);
        if reference.norm() < VECTOR_TOLERANCE {
            return Err(DiffcalcError::invalid_input("reference vector has zero length"));
        }
        debug!(
            target: config.log_target.as_str(),
            "session on {} ({} constraints), limits on {} axes",
            geometry.name(),
            geometry.required_constraint_count(),
            config.limits.len()
        );
        Ok(Self {
            config,
            geometry,
            limits,
            reference,
            state: OrientationState::new("session"),
            selector: ModeSelector::new(),
            parameters: HashMap::new(),
            wavelength: None,
            last_position: None,
        })
    }

    /// Replace the orientation state, e.g. one loaded from disk.
    ///
    /// The state is validated the same way a persisted one is on load.
    pub fn with_state(mut self, state: OrientationState) -> Result<Self> {
        state.validate()?;
        self.state = state;
        Ok(self)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn geometry(&self) -> &dyn DiffractometerGeometry {
        self.geometry.as_ref()
    }

    pub fn limits(&self) -> &HardwareLimits {
        &self.limits
    }

    pub fn state(&self) -> &OrientationState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut OrientationState {
        &mut self.state
    }

    fn log_target(&self) -> &str {
        &self.config.log_target
    }

    // ======================== BEAM ========================

    pub fn set_energy(&mut self, energy_kev: f64) -> Result<()> {
        self.wavelength = Some(energy_to_wavelength(energy_kev)?);
        Ok(())
    }

    pub fn set_wavelength(&mut self, wavelength: f64) -> Result<()> {
        check_wavelength(wavelength)?;
        self.wavelength = Some(wavelength);
        Ok(())
    }

    pub fn wavelength(&self) -> Result<f64> {
        self.wavelength
            .ok_or_else(|| DiffcalcError::invalid_input("no energy or wavelength set"))
    }

    pub fn energy(&self) -> Result<f64> {
        wavelength_to_energy(self.wavelength()?)
    }

    // ======================== ORIENTATION ========================

    /// Record a reflection at physical angles (degrees) with the current energy
    pub fn add_reflection(&mut self, hkl: Hkl, physical: &[f64], tag: Option<&str>) -> Result<()> {
        let position = self.geometry.physical_to_internal(physical)?;
        let mut reflection = Reflection::new(hkl, &position, self.energy()?)?;
        if let Some(tag) = tag {
            reflection = reflection.with_tag(tag);
        }
        self.state.add_reflection(reflection)
    }

    /// Recompute U and UB from the stored reflections
    pub fn calculate_ub(&mut self) -> Result<OrientationFit> {
        let fit = self
            .state
            .recompute_with_target(self.config.residual_threshold, &self.config.log_target)?;
        info!(
            target: self.log_target(),
            "UB recomputed from {} reflections ({:?}), max residual {:.4}°",
            self.state.reflections().len(),
            fit.method,
            fit.max_residual()
        );
        Ok(fit)
    }

    // ======================== MODES ========================

    /// Select a mode by name or numeric id
    pub fn select_mode(&mut self, name_or_id: &str) -> Result<&'static Mode> {
        let mode = self
            .selector
            .select_by_name_or_id(name_or_id, self.geometry.as_ref())?;
        debug!(
            target: self.log_target(),
            "selected mode {} ({}) on {}",
            mode.id,
            mode.name,
            self.geometry.name()
        );
        Ok(mode)
    }

    pub fn mode(&self) -> Option<&'static Mode> {
        self.selector.current()
    }

    /// Set a mode parameter in degrees
    pub fn set_parameter(&mut self, name: &str, degrees: f64) -> Result<()> {
        if ConstraintName::from_name(name).is_none() {
            return Err(DiffcalcError::invalid_input(format!(
                "'{name}' is not a mode parameter"
            )));
        }
        if !degrees.is_finite() {
            return Err(DiffcalcError::invalid_input(format!(
                "parameter '{name}' needs a finite value, got {degrees}"
            )));
        }
        self.parameters.insert(name.to_ascii_lowercase(), degrees);
        Ok(())
    }

    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.parameters.get(&name.to_ascii_lowercase()).copied()
    }

    /// Constraint set of the selected mode with the current parameters
    pub fn constraints(&self) -> Result<ConstraintSet> {
        let mode = self
            .selector
            .current()
            .ok_or_else(|| DiffcalcError::invalid_input("no mode selected"))?;
        ConstraintSet::for_mode(mode, &self.parameters, self.geometry.as_ref())
    }

    // ======================== CALCULATION ========================

    /// Angles for `hkl` in the selected mode
    pub fn hkl_to_angles(&mut self, hkl: &Hkl) -> Result<Solution> {
        let constraints = self.constraints()?;
        self.hkl_to_angles_with(hkl, &constraints)
    }

    /// Angles for `hkl` under an explicit constraint set
    pub fn hkl_to_angles_with(
        &mut self,
        hkl: &Hkl,
        constraints: &ConstraintSet,
    ) -> Result<Solution> {
        let orientation = self.state.require_orientation()?;
        let context = SolveContext::new(self.geometry.as_ref(), &self.limits)
            .with_reference(self.reference)
            .with_hint(self.last_position)
            .with_log_target(&self.config.log_target);
        let wavelength = self.wavelength()?;
        let solution = hkl_to_angles(hkl, wavelength, &orientation.ub, constraints, &context)?;
        self.last_position = Some(solution.position);
        Ok(solution)
    }

    /// hkl at physical angles (degrees)
    pub fn angles_to_hkl(&self, physical: &[f64]) -> Result<Hkl> {
        let position = self.geometry.physical_to_internal(physical)?;
        let orientation = self.state.require_orientation()?;
        angles_to_hkl(&position, self.wavelength()?, &orientation.ub)
    }

    /// Virtual angles at physical angles (degrees)
    pub fn virtual_angles(&self, physical: &[f64]) -> Result<VirtualAngles> {
        let position = self.geometry.physical_to_internal(physical)?;
        virtual_angles(&position, &self.reference)
    }

    /// Tell the session where the diffractometer is; used to break branch ties
    pub fn set_position(&mut self, physical: &[f64]) -> Result<Position> {
        let position = self.geometry.physical_to_internal(physical)?;
        debug!(target: self.log_target(), "position set to {:?}", position.to_degrees());
        self.last_position = Some(position);
        Ok(position)
    }

    pub fn last_position(&self) -> Option<Position> {
        self.last_position
    }

    /// Physical angles (degrees) of a canonical position
    pub fn physical_angles(&self, position: &Position) -> Vec<f64> {
        self.geometry.internal_to_physical(position)
    }
}
