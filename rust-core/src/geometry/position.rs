use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Canonical diffractometer axes.
///
/// Every geometry family maps its physical motors onto a subset of these six.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Incidence circle, rotates sample stage and detector arm about x
    Alpha,
    /// Detector in-plane, about z
    Delta,
    /// Detector out-of-plane, about x
    Gamma,
    /// Sample, about z
    Omega,
    /// Sample, about y
    Chi,
    /// Sample, about z
    Phi,
}

impl Axis {
    pub const ALL: [Axis; 6] = [
        Axis::Alpha,
        Axis::Delta,
        Axis::Gamma,
        Axis::Omega,
        Axis::Chi,
        Axis::Phi,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Axis::Alpha => "alpha",
            Axis::Delta => "delta",
            Axis::Gamma => "gamma",
            Axis::Omega => "omega",
            Axis::Chi => "chi",
            Axis::Phi => "phi",
        }
    }

    pub fn from_name(name: &str) -> Option<Axis> {
        Axis::ALL
            .iter()
            .copied()
            .find(|axis| axis.name().eq_ignore_ascii_case(name))
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Diffractometer position on the canonical axes, angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub alpha: f64,
    pub delta: f64,
    pub gamma: f64,
    pub omega: f64,
    pub chi: f64,
    pub phi: f64,
}

impl Position {
    pub fn new(alpha: f64, delta: f64, gamma: f64, omega: f64, chi: f64, phi: f64) -> Self {
        Self {
            alpha,
            delta,
            gamma,
            omega,
            chi,
            phi,
        }
    }

    /// Build from angles in degrees, canonical order alpha, delta, gamma, omega, chi, phi
    pub fn from_degrees(alpha: f64, delta: f64, gamma: f64, omega: f64, chi: f64, phi: f64) -> Self {
        Self::new(
            alpha.to_radians(),
            delta.to_radians(),
            gamma.to_radians(),
            omega.to_radians(),
            chi.to_radians(),
            phi.to_radians(),
        )
    }

    pub fn from_array(angles: [f64; 6]) -> Self {
        Self::new(angles[0], angles[1], angles[2], angles[3], angles[4], angles[5])
    }

    pub fn from_degrees_array(angles: [f64; 6]) -> Self {
        Self::from_array(angles.map(f64::to_radians))
    }

    pub fn as_array(&self) -> [f64; 6] {
        [self.alpha, self.delta, self.gamma, self.omega, self.chi, self.phi]
    }

    pub fn to_degrees(&self) -> [f64; 6] {
        self.as_array().map(f64::to_degrees)
    }

    pub fn get(&self, axis: Axis) -> f64 {
        self.as_array()[axis.index()]
    }

    pub fn set(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::Alpha => self.alpha = value,
            Axis::Delta => self.delta = value,
            Axis::Gamma => self.gamma = value,
            Axis::Omega => self.omega = value,
            Axis::Chi => self.chi = value,
            Axis::Phi => self.phi = value,
        }
    }

    pub fn with(mut self, axis: Axis, value: f64) -> Self {
        self.set(axis, value);
        self
    }

    /// Every angle wrapped into (-π, π]
    pub fn normalized(&self) -> Self {
        Self::from_array(self.as_array().map(wrap_angle))
    }

    /// Root-sum-square of the per-axis angular differences, each taken the short way round
    pub fn distance(&self, other: &Position) -> f64 {
        self.as_array()
            .iter()
            .zip(other.as_array().iter())
            .map(|(a, b)| wrap_angle(a - b).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

/// Wrap an angle into (-π, π]
pub fn wrap_angle(angle: f64) -> f64 {
    let mut wrapped = angle.rem_euclid(2.0 * PI);
    if wrapped > PI {
        wrapped -= 2.0 * PI;
    }
    wrapped
}
