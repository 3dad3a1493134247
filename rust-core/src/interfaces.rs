// Definitions that are used throughout all modules

use nalgebra::Vector3;

use crate::config::ENERGY_WAVELENGTH_PRODUCT;
use crate::error::{DiffcalcError, Result};

/// Miller indices (h, k, l). Non-integer values are allowed.
pub type Hkl = Vector3<f64>;

/// Convert a photon energy in keV into a wavelength in Å.
pub fn energy_to_wavelength(energy_kev: f64) -> Result<f64> {
    if !(energy_kev > 0.0) || !energy_kev.is_finite() {
        return Err(DiffcalcError::invalid_input(format!(
            "energy must be positive, got {energy_kev} keV"
        )));
    }
    Ok(ENERGY_WAVELENGTH_PRODUCT / energy_kev)
}

/// Convert a wavelength in Å into a photon energy in keV.
pub fn wavelength_to_energy(wavelength: f64) -> Result<f64> {
    check_wavelength(wavelength)?;
    Ok(ENERGY_WAVELENGTH_PRODUCT / wavelength)
}

/// Wave number k = 2π/λ
pub fn wave_number(wavelength: f64) -> Result<f64> {
    check_wavelength(wavelength)?;
    Ok(2.0 * std::f64::consts::PI / wavelength)
}

pub(crate) fn check_wavelength(wavelength: f64) -> Result<()> {
    if !(wavelength > 0.0) || !wavelength.is_finite() {
        return Err(DiffcalcError::invalid_input(format!(
            "wavelength must be positive, got {wavelength} Å"
        )));
    }
    Ok(())
}

pub(crate) fn hkl_array(hkl: &Hkl) -> [f64; 3] {
    [hkl[0], hkl[1], hkl[2]]
}
