use log::{debug, warn};
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use super::reflection::Reflection;
use crate::calc::forward::angles_to_hkl;
use crate::config::{DEFAULT_LOG_TARGET, ROTATION_TOLERANCE, VECTOR_TOLERANCE};
use crate::error::{DiffcalcError, Result};
use crate::geometry::{exit_direction, incident_direction, sample_rotation, scattering_vector, Position};
use crate::lattice::Lattice;

/// Crystal orientation. `ub` is always `u · B` for the lattice it was built with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub u: Matrix3<f64>,
    pub ub: Matrix3<f64>,
}

impl Orientation {
    /// Accept a supplied U after checking it is a proper rotation
    pub fn from_u(u: Matrix3<f64>, b_matrix: &Matrix3<f64>) -> Result<Self> {
        check_rotation(&u)?;
        Ok(Self {
            u,
            ub: u * b_matrix,
        })
    }

    /// Recover U = UB·B⁻¹ from a supplied UB
    pub fn from_ub(ub: Matrix3<f64>, b_matrix: &Matrix3<f64>) -> Result<Self> {
        let b_inv = b_matrix
            .try_inverse()
            .ok_or_else(|| DiffcalcError::invalid_input("B matrix is singular"))?;
        let u = ub * b_inv;
        check_rotation(&u)?;
        Ok(Self { u, ub })
    }

    pub fn ub_inverse(&self) -> Result<Matrix3<f64>> {
        self.ub
            .try_inverse()
            .ok_or_else(|| DiffcalcError::invalid_input("UB matrix is singular"))
    }
}

/// How an orientation was obtained from reflections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMethod {
    /// Busing–Levy triad from the first two reflections
    Triad,
    /// SVD best-fit rotation over all reflections
    Kabsch,
}

/// Orientation plus per-reflection residuals in degrees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrientationFit {
    pub orientation: Orientation,
    pub residuals: Vec<f64>,
    pub method: FitMethod,
}

impl OrientationFit {
    pub fn max_residual(&self) -> f64 {
        self.residuals.iter().copied().fold(0.0, f64::max)
    }
}

/// Unit scattering vector of a reflection position expressed in the phi frame
pub fn phi_frame_direction(position: &Position) -> Result<Vector3<f64>> {
    let q = scattering_vector(position, 1.0);
    let norm = q.norm();
    if norm < VECTOR_TOLERANCE {
        return Err(DiffcalcError::degenerate(
            "reflection position has zero scattering angle",
        ));
    }
    Ok(sample_rotation(position).transpose() * (q / norm))
}

/// Orthonormal triad [t1 t2 t3] with t1 ∥ v1 and t2 ∥ v1 × v2
pub(crate) fn triad(v1: &Vector3<f64>, v2: &Vector3<f64>) -> Option<Matrix3<f64>> {
    let (n1, n2) = (v1.norm(), v2.norm());
    if n1 < VECTOR_TOLERANCE || n2 < VECTOR_TOLERANCE {
        return None;
    }
    let cross = v1.cross(v2);
    if cross.norm() < VECTOR_TOLERANCE * n1 * n2 {
        return None;
    }
    let t1 = v1 / n1;
    let t2 = cross.normalize();
    let t3 = t1.cross(&t2);
    Some(Matrix3::from_columns(&[t1, t2, t3]))
}

/// Rotation taking the pair (a1, a2) onto (b1, b2), exact along a1 → b1.
///
/// `None` when either pair is collinear.
pub fn rotation_from_vector_pairs(
    a1: &Vector3<f64>,
    a2: &Vector3<f64>,
    b1: &Vector3<f64>,
    b2: &Vector3<f64>,
) -> Option<Matrix3<f64>> {
    let from = triad(a1, a2)?;
    let to = triad(b1, b2)?;
    Some(to * from.transpose())
}

/// U from two reference reflections by the Busing–Levy triad method.
pub fn compute_u(
    r1: &Reflection,
    r2: &Reflection,
    b_matrix: &Matrix3<f64>,
) -> Result<Orientation> {
    let h_c1 = b_matrix * r1.hkl();
    let h_c2 = b_matrix * r2.hkl();
    let h_phi1 = phi_frame_direction(&r1.position())?;
    let h_phi2 = phi_frame_direction(&r2.position())?;

    let t_c = triad(&h_c1, &h_c2).ok_or_else(|| {
        DiffcalcError::degenerate(format!(
            "reflections {:?} and {:?} are collinear in reciprocal space",
            r1.hkl, r2.hkl
        ))
    })?;
    let t_phi = triad(&h_phi1, &h_phi2).ok_or_else(|| {
        DiffcalcError::degenerate(format!(
            "positions of reflections {:?} and {:?} give collinear scattering vectors",
            r1.hkl, r2.hkl
        ))
    })?;

    let u = t_phi * t_c.transpose();
    Ok(Orientation {
        u,
        ub: u * b_matrix,
    })
}

/// U from two or more reflections.
///
/// Two reflections use the triad; three or more are fitted with an SVD
/// (Kabsch) rotation. Residuals above `threshold_deg` are logged, never fatal.
pub fn fit_u(
    reflections: &[Reflection],
    b_matrix: &Matrix3<f64>,
    threshold_deg: f64,
) -> Result<OrientationFit> {
    fit_u_with_target(reflections, b_matrix, threshold_deg, DEFAULT_LOG_TARGET)
}

/// [`fit_u`] logging under `log_target`
pub fn fit_u_with_target(
    reflections: &[Reflection],
    b_matrix: &Matrix3<f64>,
    threshold_deg: f64,
    log_target: &str,
) -> Result<OrientationFit> {
    if reflections.len() < 2 {
        return Err(DiffcalcError::invalid_state(format!(
            "orientation needs at least two reflections, have {}",
            reflections.len()
        )));
    }

    let (orientation, method) = if reflections.len() == 2 {
        (
            compute_u(&reflections[0], &reflections[1], b_matrix)?,
            FitMethod::Triad,
        )
    } else {
        (kabsch_u(reflections, b_matrix)?, FitMethod::Kabsch)
    };

    let residuals = reflection_residuals(&orientation.u, b_matrix, reflections)?;
    for (reflection, residual) in reflections.iter().zip(&residuals) {
        if *residual > threshold_deg {
            warn!(
                target: log_target,
                "reflection {:?} deviates {:.4}° from the fitted orientation (threshold {:.4}°)",
                reflection.hkl, residual, threshold_deg
            );
        }
    }
    debug!(
        target: log_target,
        "{:?} fit over {} reflections, residuals {:?}",
        method,
        reflections.len(),
        residuals
    );

    Ok(OrientationFit {
        orientation,
        residuals,
        method,
    })
}

fn kabsch_u(reflections: &[Reflection], b_matrix: &Matrix3<f64>) -> Result<Orientation> {
    let mut crystal = Vec::with_capacity(reflections.len());
    let mut measured = Vec::with_capacity(reflections.len());
    for reflection in reflections {
        let h_c = b_matrix * reflection.hkl();
        if h_c.norm() < VECTOR_TOLERANCE {
            return Err(DiffcalcError::degenerate(format!(
                "reflection {:?} is the reciprocal-space origin",
                reflection.hkl
            )));
        }
        crystal.push(h_c.normalize());
        measured.push(phi_frame_direction(&reflection.position())?);
    }

    // At least one non-collinear pair is needed on each side
    let spans = |vs: &[Vector3<f64>]| {
        vs.iter()
            .enumerate()
            .any(|(i, a)| vs[i + 1..].iter().any(|b| a.cross(b).norm() > VECTOR_TOLERANCE))
    };
    if !spans(&crystal) || !spans(&measured) {
        return Err(DiffcalcError::degenerate(
            "all reflections are collinear, orientation is undetermined",
        ));
    }

    // Covariance H = Σ a bᵀ, rotation R = V Uᵀ
    let mut h = Matrix3::zeros();
    for (a, b) in crystal.iter().zip(&measured) {
        h += a * b.transpose();
    }
    let svd = h.svd(true, true);
    let svd_u = svd
        .u
        .ok_or_else(|| DiffcalcError::degenerate("SVD of the reflection covariance failed"))?;
    let mut v_t = svd
        .v_t
        .ok_or_else(|| DiffcalcError::degenerate("SVD of the reflection covariance failed"))?;

    let mut u = v_t.transpose() * svd_u.transpose();
    // Improper result: flip the direction of least support
    if u.determinant() < 0.0 {
        let weakest = svd.singular_values.imin();
        for j in 0..3 {
            v_t[(weakest, j)] = -v_t[(weakest, j)];
        }
        u = v_t.transpose() * svd_u.transpose();
    }

    Ok(Orientation {
        u,
        ub: u * b_matrix,
    })
}

/// Angle (degrees) between U·B·hkl and the measured phi-frame direction of each reflection
pub fn reflection_residuals(
    u: &Matrix3<f64>,
    b_matrix: &Matrix3<f64>,
    reflections: &[Reflection],
) -> Result<Vec<f64>> {
    reflections
        .iter()
        .map(|reflection| {
            let predicted = u * b_matrix * reflection.hkl();
            let measured = phi_frame_direction(&reflection.position())?;
            let angle = predicted.cross(&measured).norm().atan2(predicted.dot(&measured));
            Ok(angle.to_degrees())
        })
        .collect()
}

/// Consistency of one reflection with an orientation and lattice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectionCheck {
    pub tag: Option<String>,
    pub hkl: [f64; 3],
    /// hkl the orientation assigns to the recorded position
    pub hkl_calculated: [f64; 3],
    /// 2θ of the recorded position, degrees
    pub two_theta_measured: f64,
    /// 2θ the lattice predicts for the nominal hkl, `None` beyond the Bragg sphere
    pub two_theta_calculated: Option<f64>,
}

impl ReflectionCheck {
    pub fn two_theta_error(&self) -> Option<f64> {
        self.two_theta_calculated
            .map(|calculated| self.two_theta_measured - calculated)
    }
}

pub fn check_reflections(
    orientation: &Orientation,
    lattice: &Lattice,
    reflections: &[Reflection],
) -> Result<Vec<ReflectionCheck>> {
    reflections
        .iter()
        .map(|reflection| {
            let position = reflection.position();
            let wavelength = reflection.wavelength()?;
            let hkl = angles_to_hkl(&position, wavelength, &orientation.ub)?;
            let (k_in, k_out) = (incident_direction(&position), exit_direction(&position));
            let two_theta = k_out.cross(&k_in).norm().atan2(k_out.dot(&k_in));
            Ok(ReflectionCheck {
                tag: reflection.tag.clone(),
                hkl: reflection.hkl,
                hkl_calculated: [hkl[0], hkl[1], hkl[2]],
                two_theta_measured: two_theta.to_degrees(),
                two_theta_calculated: lattice.two_theta(&reflection.hkl(), wavelength).ok(),
            })
        })
        .collect()
}

fn check_rotation(u: &Matrix3<f64>) -> Result<()> {
    let orthogonality = (u.transpose() * u - Matrix3::identity()).norm();
    let det = u.determinant();
    if orthogonality > ROTATION_TOLERANCE || (det - 1.0).abs() > ROTATION_TOLERANCE {
        return Err(DiffcalcError::degenerate(format!(
            "U is not a proper rotation (|UᵀU − I| = {orthogonality:.2e}, det = {det:.6})"
        )));
    }
    Ok(())
}
