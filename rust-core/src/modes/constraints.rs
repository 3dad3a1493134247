use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::mode_table::{Mode, ModeGroup, SampleCondition};
use super::mode_selector::{check_mode_usable, required_parameters};
use crate::error::{DiffcalcError, Result};
use crate::geometry::{Axis, DiffractometerGeometry};

/// Names a constraint can be set on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintName {
    // Motor angles
    Alpha,
    Gamma,
    Chi,
    Phi,
    // Virtual angles
    Betain,
    Betaout,
    Psi,
    // Relations, no value
    BetainEqBetaout,
    AlphaEqBetain,
    GammaEqBetaout,
}

impl ConstraintName {
    pub const ALL: [ConstraintName; 10] = [
        ConstraintName::Alpha,
        ConstraintName::Gamma,
        ConstraintName::Chi,
        ConstraintName::Phi,
        ConstraintName::Betain,
        ConstraintName::Betaout,
        ConstraintName::Psi,
        ConstraintName::BetainEqBetaout,
        ConstraintName::AlphaEqBetain,
        ConstraintName::GammaEqBetaout,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ConstraintName::Alpha => "alpha",
            ConstraintName::Gamma => "gamma",
            ConstraintName::Chi => "chi",
            ConstraintName::Phi => "phi",
            ConstraintName::Betain => "betain",
            ConstraintName::Betaout => "betaout",
            ConstraintName::Psi => "psi",
            ConstraintName::BetainEqBetaout => "betain_eq_betaout",
            ConstraintName::AlphaEqBetain => "alpha_eq_betain",
            ConstraintName::GammaEqBetaout => "gamma_eq_betaout",
        }
    }

    /// Accepts the mode parameter alias `azimuth` for psi
    pub fn from_name(name: &str) -> Option<ConstraintName> {
        if name.eq_ignore_ascii_case("azimuth") {
            return Some(ConstraintName::Psi);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }

    pub fn is_valueless(&self) -> bool {
        matches!(
            self,
            ConstraintName::BetainEqBetaout
                | ConstraintName::AlphaEqBetain
                | ConstraintName::GammaEqBetaout
        )
    }

    /// Motor axis this constraint pins, if any
    pub fn axis(&self) -> Option<Axis> {
        match self {
            ConstraintName::Alpha => Some(Axis::Alpha),
            ConstraintName::Gamma => Some(Axis::Gamma),
            ConstraintName::Chi => Some(Axis::Chi),
            ConstraintName::Phi => Some(Axis::Phi),
            _ => None,
        }
    }

    pub fn from_axis(axis: Axis) -> Option<ConstraintName> {
        match axis {
            Axis::Alpha => Some(ConstraintName::Alpha),
            Axis::Gamma => Some(ConstraintName::Gamma),
            Axis::Chi => Some(ConstraintName::Chi),
            Axis::Phi => Some(ConstraintName::Phi),
            Axis::Delta | Axis::Omega => None,
        }
    }
}

impl fmt::Display for ConstraintName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// User-supplied constraints. Values are stored in radians, `None` marks a
/// value-less relation. Anything absent is free.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSet {
    entries: BTreeMap<ConstraintName, Option<f64>>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constrain a valued quantity, value in degrees
    pub fn fix(&mut self, name: ConstraintName, degrees: f64) -> Result<&mut Self> {
        if name.is_valueless() {
            return Err(DiffcalcError::invalid_input(format!(
                "constraint '{name}' takes no value"
            )));
        }
        if !degrees.is_finite() {
            return Err(DiffcalcError::invalid_input(format!(
                "constraint '{name}' needs a finite value, got {degrees}"
            )));
        }
        self.entries.insert(name, Some(degrees.to_radians()));
        Ok(self)
    }

    /// Activate a value-less relation
    pub fn enable(&mut self, name: ConstraintName) -> Result<&mut Self> {
        if !name.is_valueless() {
            return Err(DiffcalcError::invalid_input(format!(
                "constraint '{name}' needs a value"
            )));
        }
        self.entries.insert(name, None);
        Ok(self)
    }

    pub fn free(&mut self, name: ConstraintName) -> &mut Self {
        self.entries.remove(&name);
        self
    }

    pub fn is_constrained(&self, name: ConstraintName) -> bool {
        self.entries.contains_key(&name)
    }

    /// Value in radians of a valued constraint
    pub fn value(&self, name: ConstraintName) -> Option<f64> {
        self.entries.get(&name).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = ConstraintName> + '_ {
        self.entries.keys().copied()
    }

    /// Human-readable listing, values in degrees
    pub fn describe(&self) -> String {
        if self.entries.is_empty() {
            return "none".to_string();
        }
        self.entries
            .iter()
            .map(|(name, value)| match value {
                Some(v) => format!("{name}={:.4}", v.to_degrees()),
                None => name.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Check the set against the geometry before any angle math.
    ///
    /// Hardware-fixed axes are implicit and must not be constrained again.
    pub fn validate(&self, geometry: &dyn DiffractometerGeometry) -> Result<()> {
        if let Some(axis) = self
            .names()
            .filter_map(|name| name.axis())
            .find(|axis| geometry.is_fixed(*axis))
        {
            return Err(DiffcalcError::UnsupportedMode {
                mode: self.describe(),
                geometry: geometry.name().to_string(),
                reason: format!("'{axis}' is hardware-fixed and cannot be constrained"),
            });
        }
        let expected = geometry.required_constraint_count();
        if self.len() != expected {
            return Err(DiffcalcError::ConstraintCount {
                geometry: geometry.name().to_string(),
                expected,
                actual: self.len(),
                constraints: self.describe(),
            });
        }
        Ok(())
    }

    /// Build the constraint set a mode implies, parameter values in degrees.
    pub fn for_mode(
        mode: &Mode,
        parameters: &HashMap<String, f64>,
        geometry: &dyn DiffractometerGeometry,
    ) -> Result<Self> {
        check_mode_usable(mode, geometry)?;
        let required = required_parameters(mode, geometry);
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|name| !parameters.contains_key(*name))
            .collect();
        if !missing.is_empty() {
            return Err(DiffcalcError::ConstraintCount {
                geometry: geometry.name().to_string(),
                expected: required.len(),
                actual: required.len() - missing.len(),
                constraints: format!("mode {} is missing {}", mode.name, missing.join(", ")),
            });
        }

        let mut set = ConstraintSet::new();
        for name in &required {
            let constraint = ConstraintName::from_name(name).ok_or_else(|| {
                DiffcalcError::UnsupportedMode {
                    mode: mode.name.to_string(),
                    geometry: geometry.name().to_string(),
                    reason: format!("parameter '{name}' has no solver constraint"),
                }
            })?;
            set.fix(constraint, parameters[*name])?;
        }

        match mode.group {
            ModeGroup::FourCircle => {}
            ModeGroup::FiveCircleFixedGamma => {
                set.enable(ConstraintName::AlphaEqBetain)?;
            }
            ModeGroup::FiveCircleFixedAlpha => {
                set.enable(ConstraintName::GammaEqBetaout)?;
            }
            ModeGroup::ZAxis => {
                let (chi, phi) = geometry.zaxis_alignment();
                if !geometry.is_fixed(Axis::Chi) {
                    set.fix(ConstraintName::Chi, chi.to_degrees())?;
                }
                if !geometry.is_fixed(Axis::Phi) {
                    set.fix(ConstraintName::Phi, phi.to_degrees())?;
                }
            }
        }
        if mode.condition == SampleCondition::BetaEqual {
            set.enable(ConstraintName::BetainEqBetaout)?;
        }
        Ok(set)
    }
}
