use nalgebra::{Matrix3, Vector3};

use crate::error::{DiffcalcError, Result};
use crate::geometry::{sample_rotation, scattering_vector, Position};
use crate::interfaces::{wave_number, Hkl};

/// hkl at a diffractometer position: UB⁻¹ · Rᵀ · Q_α
pub fn angles_to_hkl(position: &Position, wavelength: f64, ub: &Matrix3<f64>) -> Result<Hkl> {
    let ub_inv = ub
        .try_inverse()
        .ok_or_else(|| DiffcalcError::invalid_input("UB matrix is singular"))?;
    let q_alpha = scattering_vector(position, wave_number(wavelength)?);
    Ok(hkl_from_scattering(position, &q_alpha, &ub_inv))
}

/// hkl of an alpha-frame scattering vector at `position`, UB already inverted
pub(crate) fn hkl_from_scattering(
    position: &Position,
    q_alpha: &Vector3<f64>,
    ub_inv: &Matrix3<f64>,
) -> Hkl {
    ub_inv * sample_rotation(position).transpose() * q_alpha
}
