use nalgebra::Vector3;
use std::fmt;

use super::position::{Axis, Position};
use super::rotation_matrices;
use crate::config::SessionConfig;
use crate::error::{DiffcalcError, Result};
use crate::modes::ModeGroup;

/// Capability interface of one diffractometer family.
///
/// Implementations only describe how physical motors map onto the canonical
/// six-circle; all angle math runs on [`Position`].
pub trait DiffractometerGeometry: fmt::Debug {
    fn name(&self) -> &'static str;

    /// Physical motor names, in the order angles are passed in and out
    fn physical_axis_names(&self) -> &'static [&'static str];

    /// Canonical axis driven by each physical motor
    fn physical_axes(&self) -> &'static [Axis];

    /// Hardware-fixed canonical axes and their values in radians
    fn fixed_axes(&self) -> &[(Axis, f64)];

    fn fixed_axes_mut(&mut self) -> &mut [(Axis, f64)];

    fn supports_mode_group(&self, group: ModeGroup) -> bool;

    /// Axis whose lower value wins a branch tie
    fn tiebreak_axis(&self) -> Axis {
        Axis::Chi
    }

    /// (chi, phi) in radians that put the reference along the omega axis
    fn zaxis_alignment(&self) -> (f64, f64) {
        (0.0, 0.0)
    }

    fn motor_count(&self) -> usize {
        self.physical_axes().len()
    }

    /// Constraints a caller has to supply: motors minus the three taken by hkl
    fn required_constraint_count(&self) -> usize {
        self.motor_count().saturating_sub(3)
    }

    fn is_fixed(&self, axis: Axis) -> bool {
        self.fixed_axes().iter().any(|(fixed, _)| *fixed == axis)
    }

    fn fixed_value(&self, axis: Axis) -> Option<f64> {
        self.fixed_axes()
            .iter()
            .find(|(fixed, _)| *fixed == axis)
            .map(|(_, value)| *value)
    }

    /// Override the value of a hardware-fixed axis (radians)
    fn set_fixed_value(&mut self, axis: Axis, value: f64) -> Result<()> {
        let name = self.name();
        match self.fixed_axes_mut().iter_mut().find(|(fixed, _)| *fixed == axis) {
            Some(entry) => {
                entry.1 = value;
                Ok(())
            }
            None => Err(DiffcalcError::invalid_input(format!(
                "axis '{axis}' is not hardware-fixed on geometry '{name}'"
            ))),
        }
    }

    /// Canonical axis for a physical motor name or a canonical axis name
    fn resolve_axis(&self, name: &str) -> Option<Axis> {
        self.physical_axis_names()
            .iter()
            .position(|physical| physical.eq_ignore_ascii_case(name))
            .map(|index| self.physical_axes()[index])
            .or_else(|| Axis::from_name(name))
    }

    /// Physical angles in degrees → canonical position in radians
    fn physical_to_internal(&self, angles: &[f64]) -> Result<Position> {
        if angles.len() != self.motor_count() {
            return Err(DiffcalcError::invalid_input(format!(
                "geometry '{}' expects {} angles ({}), got {}",
                self.name(),
                self.motor_count(),
                self.physical_axis_names().join(", "),
                angles.len()
            )));
        }
        let mut position = Position::default();
        for (axis, value) in self.fixed_axes() {
            position.set(*axis, *value);
        }
        for (axis, value) in self.physical_axes().iter().zip(angles) {
            position.set(*axis, value.to_radians());
        }
        Ok(position)
    }

    /// Canonical position → physical angles in degrees
    fn internal_to_physical(&self, position: &Position) -> Vec<f64> {
        self.physical_axes()
            .iter()
            .map(|axis| position.get(*axis).to_degrees())
            .collect()
    }

    fn incident_direction(&self, position: &Position) -> Vector3<f64> {
        rotation_matrices::incident_direction(position)
    }

    fn exit_direction(&self, position: &Position) -> Vector3<f64> {
        rotation_matrices::exit_direction(position)
    }

    fn scattering_vector(&self, position: &Position, wave_number: f64) -> Vector3<f64> {
        rotation_matrices::scattering_vector(position, wave_number)
    }
}

// ======================== FOUR-CIRCLE ========================

/// Eulerian four-circle: delta, omega, chi, phi
#[derive(Debug, Clone, PartialEq)]
pub struct FourCircle {
    fixed: [(Axis, f64); 2],
}

impl Default for FourCircle {
    fn default() -> Self {
        Self {
            fixed: [(Axis::Alpha, 0.0), (Axis::Gamma, 0.0)],
        }
    }
}

impl DiffractometerGeometry for FourCircle {
    fn name(&self) -> &'static str {
        "fourc"
    }

    fn physical_axis_names(&self) -> &'static [&'static str] {
        &["delta", "omega", "chi", "phi"]
    }

    fn physical_axes(&self) -> &'static [Axis] {
        &[Axis::Delta, Axis::Omega, Axis::Chi, Axis::Phi]
    }

    fn fixed_axes(&self) -> &[(Axis, f64)] {
        &self.fixed
    }

    fn fixed_axes_mut(&mut self) -> &mut [(Axis, f64)] {
        &mut self.fixed
    }

    fn supports_mode_group(&self, group: ModeGroup) -> bool {
        group == ModeGroup::FourCircle
    }
}

// ======================== FIVE-CIRCLE ========================

/// Five-circle with the incidence circle and a fixed detector out-of-plane angle
#[derive(Debug, Clone, PartialEq)]
pub struct FiveCircleFixedGamma {
    fixed: [(Axis, f64); 1],
}

impl Default for FiveCircleFixedGamma {
    fn default() -> Self {
        Self {
            fixed: [(Axis::Gamma, 0.0)],
        }
    }
}

impl DiffractometerGeometry for FiveCircleFixedGamma {
    fn name(&self) -> &'static str {
        "fivec"
    }

    fn physical_axis_names(&self) -> &'static [&'static str] {
        &["alpha", "delta", "omega", "chi", "phi"]
    }

    fn physical_axes(&self) -> &'static [Axis] {
        &[Axis::Alpha, Axis::Delta, Axis::Omega, Axis::Chi, Axis::Phi]
    }

    fn fixed_axes(&self) -> &[(Axis, f64)] {
        &self.fixed
    }

    fn fixed_axes_mut(&mut self) -> &mut [(Axis, f64)] {
        &mut self.fixed
    }

    fn supports_mode_group(&self, group: ModeGroup) -> bool {
        matches!(group, ModeGroup::FourCircle | ModeGroup::FiveCircleFixedGamma)
    }
}

/// Five-circle with the detector out-of-plane circle and a fixed incidence angle
#[derive(Debug, Clone, PartialEq)]
pub struct FiveCircleFixedAlpha {
    fixed: [(Axis, f64); 1],
}

impl Default for FiveCircleFixedAlpha {
    fn default() -> Self {
        Self {
            fixed: [(Axis::Alpha, 0.0)],
        }
    }
}

impl DiffractometerGeometry for FiveCircleFixedAlpha {
    fn name(&self) -> &'static str {
        "fivec_fixed_alpha"
    }

    fn physical_axis_names(&self) -> &'static [&'static str] {
        &["delta", "gamma", "omega", "chi", "phi"]
    }

    fn physical_axes(&self) -> &'static [Axis] {
        &[Axis::Delta, Axis::Gamma, Axis::Omega, Axis::Chi, Axis::Phi]
    }

    fn fixed_axes(&self) -> &[(Axis, f64)] {
        &self.fixed
    }

    fn fixed_axes_mut(&mut self) -> &mut [(Axis, f64)] {
        &mut self.fixed
    }

    fn supports_mode_group(&self, group: ModeGroup) -> bool {
        matches!(group, ModeGroup::FourCircle | ModeGroup::FiveCircleFixedAlpha)
    }
}

// ======================== SIX-CIRCLE ========================

/// Surface diffractometer with chi and phi locked, the reference along omega
#[derive(Debug, Clone, PartialEq)]
pub struct ZAxis {
    fixed: [(Axis, f64); 2],
}

impl Default for ZAxis {
    fn default() -> Self {
        Self {
            fixed: [(Axis::Chi, 0.0), (Axis::Phi, 0.0)],
        }
    }
}

impl DiffractometerGeometry for ZAxis {
    fn name(&self) -> &'static str {
        "zaxis"
    }

    fn physical_axis_names(&self) -> &'static [&'static str] {
        &["alpha", "delta", "gamma", "omega"]
    }

    fn physical_axes(&self) -> &'static [Axis] {
        &[Axis::Alpha, Axis::Delta, Axis::Gamma, Axis::Omega]
    }

    fn fixed_axes(&self) -> &[(Axis, f64)] {
        &self.fixed
    }

    fn fixed_axes_mut(&mut self) -> &mut [(Axis, f64)] {
        &mut self.fixed
    }

    fn supports_mode_group(&self, group: ModeGroup) -> bool {
        group == ModeGroup::ZAxis
    }

    // chi is locked, so detector out-of-plane decides ties
    fn tiebreak_axis(&self) -> Axis {
        Axis::Gamma
    }

    fn zaxis_alignment(&self) -> (f64, f64) {
        (
            self.fixed_value(Axis::Chi).unwrap_or(0.0),
            self.fixed_value(Axis::Phi).unwrap_or(0.0),
        )
    }
}

/// Full six-circle: mu, delta, nu, eta, chi, phi
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SixCircle {
    fixed: [(Axis, f64); 0],
}

impl DiffractometerGeometry for SixCircle {
    fn name(&self) -> &'static str {
        "sixc"
    }

    fn physical_axis_names(&self) -> &'static [&'static str] {
        &["mu", "delta", "nu", "eta", "chi", "phi"]
    }

    fn physical_axes(&self) -> &'static [Axis] {
        &[
            Axis::Alpha,
            Axis::Delta,
            Axis::Gamma,
            Axis::Omega,
            Axis::Chi,
            Axis::Phi,
        ]
    }

    fn fixed_axes(&self) -> &[(Axis, f64)] {
        &self.fixed
    }

    fn fixed_axes_mut(&mut self) -> &mut [(Axis, f64)] {
        &mut self.fixed
    }

    fn supports_mode_group(&self, _group: ModeGroup) -> bool {
        true
    }
}

// ======================== FACTORY ========================

pub const GEOMETRY_NAMES: [&str; 5] = ["fourc", "fivec", "fivec_fixed_alpha", "zaxis", "sixc"];

/// Create a geometry adapter by family name
pub fn geometry_from_name(name: &str) -> Result<Box<dyn DiffractometerGeometry>> {
    let geometry: Box<dyn DiffractometerGeometry> = match name.to_ascii_lowercase().as_str() {
        "fourc" => Box::new(FourCircle::default()),
        "fivec" | "fivec_fixed_gamma" => Box::new(FiveCircleFixedGamma::default()),
        "fivec_fixed_alpha" => Box::new(FiveCircleFixedAlpha::default()),
        "zaxis" => Box::new(ZAxis::default()),
        "sixc" => Box::new(SixCircle::default()),
        _ => {
            return Err(DiffcalcError::UnsupportedMode {
                mode: "-".to_string(),
                geometry: name.to_string(),
                reason: format!("unknown geometry, expected one of {}", GEOMETRY_NAMES.join(", ")),
            })
        }
    };
    Ok(geometry)
}

/// Create the configured geometry and apply fixed-axis overrides (degrees)
pub fn geometry_from_config(config: &SessionConfig) -> Result<Box<dyn DiffractometerGeometry>> {
    let mut geometry = geometry_from_name(&config.geometry)?;
    for (key, value) in &config.fixed_axes {
        let axis = Axis::from_name(key).ok_or_else(|| {
            DiffcalcError::invalid_input(format!("unknown canonical axis '{key}'"))
        })?;
        geometry.set_fixed_value(axis, value.to_radians())?;
    }
    Ok(geometry)
}
