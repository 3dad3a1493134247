use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::config::{CLASSIFICATION_TOLERANCE, LATTICE_TOLERANCE};
use crate::error::{DiffcalcError, Result};
use crate::interfaces::{check_wavelength, hkl_array, Hkl};
use crate::lattice::lattice_types::{identify_crystal_system, CrystalSystem};

/// Real-space lattice parameters. Lengths in Å, angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatticeParameters {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl LatticeParameters {
    pub fn new(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        Self {
            a,
            b,
            c,
            alpha,
            beta,
            gamma,
        }
    }

    pub fn lengths(&self) -> (f64, f64, f64) {
        (self.a, self.b, self.c)
    }

    /// Angles α, β, γ in degrees
    pub fn angles(&self) -> (f64, f64, f64) {
        (self.alpha, self.beta, self.gamma)
    }
}

/// Reciprocal lattice parameters in the 2π convention. Angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReciprocalParameters {
    pub a_star: f64,
    pub b_star: f64,
    pub c_star: f64,
    pub alpha_star: f64,
    pub beta_star: f64,
    pub gamma_star: f64,
}

/// A crystal lattice with its derived metric and B matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    /// Optional crystal name, e.g. "Si" or "Pt531".
    pub name: Option<String>,
    /// Real-space parameters the lattice was built from.
    parameters: LatticeParameters,
    /// Metric tensor G, G_ij = a_i · a_j.
    metric: Matrix3<f64>,
    /// Inverse metric G⁻¹ (reciprocal metric without the 2π factor).
    reciprocal_metric: Matrix3<f64>,
    /// Busing–Levy B matrix, hkl → Cartesian reciprocal vector (2π convention).
    b_matrix: Matrix3<f64>,
    /// Unit cell volume in Å³.
    cell_volume: f64,
}

impl Lattice {
    /// Build a lattice from a, b, c (Å) and α, β, γ (degrees).
    pub fn from_parameters(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Result<Self> {
        Self::from_lattice_parameters(LatticeParameters::new(a, b, c, alpha, beta, gamma))
    }

    pub fn from_lattice_parameters(parameters: LatticeParameters) -> Result<Self> {
        validate_parameters(&parameters)?;

        let (a, b, c) = parameters.lengths();
        let (ca, cb, cg) = (
            parameters.alpha.to_radians().cos(),
            parameters.beta.to_radians().cos(),
            parameters.gamma.to_radians().cos(),
        );

        // 1) Volume; a non-positive radicand means the three angles cannot close a cell
        let radicand = 1.0 - ca * ca - cb * cb - cg * cg + 2.0 * ca * cb * cg;
        if radicand <= LATTICE_TOLERANCE {
            return Err(DiffcalcError::InvalidLattice {
                reason: format!(
                    "angles ({}, {}, {}) give a degenerate unit cell",
                    parameters.alpha, parameters.beta, parameters.gamma
                ),
            });
        }
        let cell_volume = a * b * c * radicand.sqrt();

        // 2) Metric tensor and its inverse
        let metric = Matrix3::new(
            a * a,     a * b * cg, a * c * cb,
            a * b * cg, b * b,     b * c * ca,
            a * c * cb, b * c * ca, c * c,
        );
        let reciprocal_metric = metric.try_inverse().ok_or_else(|| DiffcalcError::InvalidLattice {
            reason: "metric tensor is singular".to_string(),
        })?;

        // 3) B matrix from reciprocal lengths and angles
        let b_matrix = busing_levy_b(&parameters, &reciprocal_metric);

        Ok(Lattice {
            name: None,
            parameters,
            metric,
            reciprocal_metric,
            b_matrix,
            cell_volume,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn parameters(&self) -> &LatticeParameters {
        &self.parameters
    }

    pub fn b_matrix(&self) -> &Matrix3<f64> {
        &self.b_matrix
    }

    pub fn metric_tensor(&self) -> &Matrix3<f64> {
        &self.metric
    }

    pub fn reciprocal_metric(&self) -> &Matrix3<f64> {
        &self.reciprocal_metric
    }

    pub fn cell_volume(&self) -> f64 {
        self.cell_volume
    }

    /// Crystal system implied by the cell metric
    pub fn crystal_system(&self) -> CrystalSystem {
        identify_crystal_system(&self.metric, CLASSIFICATION_TOLERANCE)
    }

    /// Reciprocal lengths (2π included) and angles in degrees
    pub fn reciprocal_parameters(&self) -> ReciprocalParameters {
        let g = &self.reciprocal_metric;
        let (a_star, b_star, c_star) = (
            2.0 * PI * g[(0, 0)].sqrt(),
            2.0 * PI * g[(1, 1)].sqrt(),
            2.0 * PI * g[(2, 2)].sqrt(),
        );
        let angle = |i: usize, j: usize| {
            (g[(i, j)] / (g[(i, i)] * g[(j, j)]).sqrt())
                .clamp(-1.0, 1.0)
                .acos()
                .to_degrees()
        };
        ReciprocalParameters {
            a_star,
            b_star,
            c_star,
            alpha_star: angle(1, 2),
            beta_star: angle(0, 2),
            gamma_star: angle(0, 1),
        }
    }

    /// Cartesian reciprocal-lattice vector B·hkl
    pub fn q_vector(&self, hkl: &Hkl) -> Vector3<f64> {
        self.b_matrix * hkl
    }

    /// Plane spacing d = 2π / |B·hkl| in Å
    pub fn d_spacing(&self, hkl: &Hkl) -> Result<f64> {
        let q = self.q_vector(hkl).norm();
        if q < LATTICE_TOLERANCE {
            return Err(DiffcalcError::degenerate(format!(
                "hkl {:?} is the origin and has no plane spacing",
                hkl_array(hkl)
            )));
        }
        Ok(2.0 * PI / q)
    }

    /// Scattering angle 2θ (degrees) of an hkl at a wavelength, orientation independent.
    pub fn two_theta(&self, hkl: &Hkl, wavelength: f64) -> Result<f64> {
        check_wavelength(wavelength)?;
        let sin_theta = wavelength * self.q_vector(hkl).norm() / (4.0 * PI);
        if sin_theta > 1.0 + LATTICE_TOLERANCE {
            return Err(DiffcalcError::UnreachableReflection {
                hkl: hkl_array(hkl),
                wavelength,
                reason: format!("sin(theta) = {sin_theta:.6} exceeds 1"),
            });
        }
        Ok(2.0 * sin_theta.min(1.0).asin().to_degrees())
    }
}

fn validate_parameters(p: &LatticeParameters) -> Result<()> {
    for (label, length) in [("a", p.a), ("b", p.b), ("c", p.c)] {
        if !(length > 0.0) || !length.is_finite() {
            return Err(DiffcalcError::InvalidLattice {
                reason: format!("length {label} = {length} must be positive"),
            });
        }
    }
    for (label, angle) in [("alpha", p.alpha), ("beta", p.beta), ("gamma", p.gamma)] {
        if !(angle > 0.0 && angle < 180.0) {
            return Err(DiffcalcError::InvalidLattice {
                reason: format!("angle {label} = {angle} must lie in (0, 180) degrees"),
            });
        }
    }
    Ok(())
}

/// B = | b1  b2 cos β3  b3 cos β2         |
///     | 0   b2 sin β3  -b3 sin β2 cos α1 |
///     | 0   0          2π / c            |
fn busing_levy_b(p: &LatticeParameters, reciprocal_metric: &Matrix3<f64>) -> Matrix3<f64> {
    let g = reciprocal_metric;
    let b1 = 2.0 * PI * g[(0, 0)].sqrt();
    let b2 = 2.0 * PI * g[(1, 1)].sqrt();
    let b3 = 2.0 * PI * g[(2, 2)].sqrt();

    let cos_beta2 = (g[(0, 2)] / (g[(0, 0)] * g[(2, 2)]).sqrt()).clamp(-1.0, 1.0);
    let cos_beta3 = (g[(0, 1)] / (g[(0, 0)] * g[(1, 1)]).sqrt()).clamp(-1.0, 1.0);
    let sin_beta2 = (1.0 - cos_beta2 * cos_beta2).sqrt();
    let sin_beta3 = (1.0 - cos_beta3 * cos_beta3).sqrt();
    let cos_alpha1 = p.alpha.to_radians().cos();

    Matrix3::new(
        b1,  b2 * cos_beta3, b3 * cos_beta2,
        0.0, b2 * sin_beta3, -b3 * sin_beta2 * cos_alpha1,
        0.0, 0.0,            2.0 * PI / p.c,
    )
}
