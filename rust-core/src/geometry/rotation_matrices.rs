// Rotation matrices of the canonical six-circle and the angle → vector map.
//
// Frames: the lab frame has the beam along +y and z vertical. The alpha frame
// is the lab frame rotated by the incidence circle; scattering vectors are
// computed there so that R = Ω·X·Φ maps the phi frame onto it directly.

use nalgebra::{Matrix3, Vector3};

use super::position::Position;

/// Right-handed rotation about x
pub fn x_rotation(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(1.0, 0.0, 0.0, 0.0, c, -s, 0.0, s, c)
}

/// Right-handed rotation about y
pub fn y_rotation(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(c, 0.0, s, 0.0, 1.0, 0.0, -s, 0.0, c)
}

/// Right-handed rotation about z
pub fn z_rotation(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0)
}

// Per-axis matrices. Delta, omega and phi turn left-handed about z.

pub fn alpha_matrix(alpha: f64) -> Matrix3<f64> {
    x_rotation(alpha)
}

pub fn delta_matrix(delta: f64) -> Matrix3<f64> {
    z_rotation(-delta)
}

pub fn gamma_matrix(gamma: f64) -> Matrix3<f64> {
    x_rotation(gamma)
}

pub fn omega_matrix(omega: f64) -> Matrix3<f64> {
    z_rotation(-omega)
}

pub fn chi_matrix(chi: f64) -> Matrix3<f64> {
    y_rotation(chi)
}

pub fn phi_matrix(phi: f64) -> Matrix3<f64> {
    z_rotation(-phi)
}

/// Sample rotation R = Ω·X·Φ, phi frame → alpha frame
pub fn sample_rotation(position: &Position) -> Matrix3<f64> {
    omega_matrix(position.omega) * chi_matrix(position.chi) * phi_matrix(position.phi)
}

/// Unit incident wave vector in the alpha frame, ALPHA⁻¹·ŷ
pub fn incident_direction(position: &Position) -> Vector3<f64> {
    let (s, c) = position.alpha.sin_cos();
    Vector3::new(0.0, c, -s)
}

/// Unit exit wave vector in the alpha frame, DELTA·GAMMA·ŷ
pub fn exit_direction(position: &Position) -> Vector3<f64> {
    let (sd, cd) = position.delta.sin_cos();
    let (sg, cg) = position.gamma.sin_cos();
    Vector3::new(cg * sd, cg * cd, sg)
}

/// Scattering vector Q = k·(k̂f − k̂i) in the alpha frame
pub fn scattering_vector(position: &Position, wave_number: f64) -> Vector3<f64> {
    (exit_direction(position) - incident_direction(position)) * wave_number
}

/// Map an alpha-frame vector into the lab frame
pub fn alpha_to_lab(position: &Position, vector: &Vector3<f64>) -> Vector3<f64> {
    alpha_matrix(position.alpha) * vector
}
