use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// The seven crystal systems, inferred from the cell metric.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CrystalSystem {
    Triclinic,
    Monoclinic,
    Orthorhombic,
    Tetragonal,
    Trigonal,
    Hexagonal,
    Cubic,
}

impl CrystalSystem {
    pub fn name(&self) -> &'static str {
        match self {
            CrystalSystem::Triclinic => "triclinic",
            CrystalSystem::Monoclinic => "monoclinic",
            CrystalSystem::Orthorhombic => "orthorhombic",
            CrystalSystem::Tetragonal => "tetragonal",
            CrystalSystem::Trigonal => "trigonal",
            CrystalSystem::Hexagonal => "hexagonal",
            CrystalSystem::Cubic => "cubic",
        }
    }
}

/// Identify the crystal system from a metric tensor G.
///
/// Only the cell shape is inspected, so a cell that happens to have higher
/// metric symmetry than its space group is reported at the higher system.
pub fn identify_crystal_system(metric: &Matrix3<f64>, tol: f64) -> CrystalSystem {
    let a = metric[(0, 0)].sqrt();
    let b = metric[(1, 1)].sqrt();
    let c = metric[(2, 2)].sqrt();

    let alpha = (metric[(1, 2)] / (b * c)).clamp(-1.0, 1.0).acos();
    let beta = (metric[(0, 2)] / (a * c)).clamp(-1.0, 1.0).acos();
    let gamma = (metric[(0, 1)] / (a * b)).clamp(-1.0, 1.0).acos();

    // Length relations are compared relative to the cell size
    let scale = a.max(b).max(c);
    let a_eq_b = approx_equal(a / scale, b / scale, tol);
    let b_eq_c = approx_equal(b / scale, c / scale, tol);
    let all_equal = a_eq_b && b_eq_c;

    let alpha_90 = is_right_angle(alpha, tol);
    let beta_90 = is_right_angle(beta, tol);
    let gamma_90 = is_right_angle(gamma, tol);
    let all_90 = alpha_90 && beta_90 && gamma_90;
    let angles_equal = approx_equal(alpha, beta, tol) && approx_equal(beta, gamma, tol);

    match (all_equal, a_eq_b, all_90) {
        (true, _, true) => CrystalSystem::Cubic,
        (true, _, false) if angles_equal => CrystalSystem::Trigonal,
        (false, true, true) => CrystalSystem::Tetragonal,
        (_, true, false) if alpha_90 && beta_90 && is_120_degrees(gamma, tol) => {
            CrystalSystem::Hexagonal
        }
        (_, _, true) => CrystalSystem::Orthorhombic,
        // Unique axis b
        _ if alpha_90 && gamma_90 => CrystalSystem::Monoclinic,
        _ => CrystalSystem::Triclinic,
    }
}

/// Check if two values are approximately equal within tolerance
pub fn approx_equal(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() < tol
}

/// Check if angle is approximately 90 degrees (π/2 radians)
pub fn is_right_angle(angle: f64, tol: f64) -> bool {
    approx_equal(angle, PI / 2.0, tol)
}

/// Check if angle is approximately 120 degrees (2π/3 radians)
pub fn is_120_degrees(angle: f64, tol: f64) -> bool {
    approx_equal(angle, 2.0 * PI / 3.0, tol)
}
