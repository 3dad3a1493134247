use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::VECTOR_TOLERANCE;
use crate::error::{DiffcalcError, Result};
use crate::geometry::rotation_matrices::alpha_to_lab;
use crate::geometry::{exit_direction, incident_direction, sample_rotation, Position};

/// Derived angles of a position, radians.
///
/// Azimuths that are undefined at the position (e.g. psi with the reference
/// along Q) are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VirtualAngles {
    pub theta: f64,
    pub two_theta: f64,
    /// Incidence angle of the beam onto the reference surface
    pub betain: f64,
    /// Exit angle of the scattered beam from the reference surface
    pub betaout: f64,
    /// Angle between Q and the reference
    pub tau: f64,
    /// Azimuth of the reference about Q, zero in the scattering plane
    pub psi: Option<f64>,
    /// Azimuth of Q about the beam
    pub qaz: Option<f64>,
    /// Azimuth of the reference about the beam
    pub naz: Option<f64>,
}

impl VirtualAngles {
    pub const NAMES: [&'static str; 8] = [
        "theta", "two_theta", "betain", "betaout", "tau", "psi", "qaz", "naz",
    ];

    /// Value in radians by name
    pub fn get(&self, name: &str) -> Option<f64> {
        match name.to_ascii_lowercase().as_str() {
            "theta" => Some(self.theta),
            "two_theta" | "ttheta" => Some(self.two_theta),
            "betain" => Some(self.betain),
            "betaout" => Some(self.betaout),
            "tau" => Some(self.tau),
            "psi" => self.psi,
            "qaz" => self.qaz,
            "naz" => self.naz,
            _ => None,
        }
    }

    /// Defined angles in degrees keyed by name
    pub fn to_degrees_map(&self) -> BTreeMap<&'static str, f64> {
        Self::NAMES
            .iter()
            .filter_map(|name| self.get(name).map(|value| (*name, value.to_degrees())))
            .collect()
    }
}

/// Virtual angles of a position for a reference vector given in the phi frame.
///
/// Independent of UB and wavelength.
pub fn virtual_angles(position: &Position, reference: &Vector3<f64>) -> Result<VirtualAngles> {
    let n_norm = reference.norm();
    if n_norm < VECTOR_TOLERANCE {
        return Err(DiffcalcError::invalid_input("reference vector has zero length"));
    }
    let k_in = incident_direction(position);
    let k_out = exit_direction(position);
    let n = sample_rotation(position) * (reference / n_norm);

    let cos_2theta = k_out.dot(&k_in).clamp(-1.0, 1.0);
    let two_theta = cos_2theta.acos();

    let betain = (-k_in.dot(&n)).clamp(-1.0, 1.0).asin();
    let betaout = k_out.dot(&n).clamp(-1.0, 1.0).asin();

    let q = k_out - k_in;
    let q_norm = q.norm();
    let (tau, psi) = if q_norm < VECTOR_TOLERANCE {
        // No scattering vector: tau taken as 0 and psi undefined
        (0.0, None)
    } else {
        let q_hat = q / q_norm;
        let sin_tau = q_hat.cross(&n).norm();
        let tau = sin_tau.atan2(q_hat.dot(&n));
        (tau, reference_azimuth(&q_hat, &k_in, &k_out, &n, sin_tau))
    };

    let q_lab = alpha_to_lab(position, &q);
    let n_lab = alpha_to_lab(position, &n);

    Ok(VirtualAngles {
        theta: two_theta / 2.0,
        two_theta,
        betain,
        betaout,
        tau,
        psi,
        qaz: azimuth_about_beam(&q_lab),
        naz: azimuth_about_beam(&n_lab),
    })
}

/// psi = atan2(n·e_p, n·e_s) with e_s the in-plane normal to Q and e_p = Q̂ × e_s
fn reference_azimuth(
    q_hat: &Vector3<f64>,
    k_in: &Vector3<f64>,
    k_out: &Vector3<f64>,
    n: &Vector3<f64>,
    sin_tau: f64,
) -> Option<f64> {
    if sin_tau < VECTOR_TOLERANCE {
        return None;
    }
    let e_s = in_plane_normal(k_in, k_out)?;
    let e_p = q_hat.cross(&e_s);
    Some(n.dot(&e_p).atan2(n.dot(&e_s)))
}

/// Unit vector in the scattering plane perpendicular to Q, k̂f + k̂i normalized
pub(crate) fn in_plane_normal(k_in: &Vector3<f64>, k_out: &Vector3<f64>) -> Option<Vector3<f64>> {
    let sum = k_in + k_out;
    let norm = sum.norm();
    (norm > VECTOR_TOLERANCE).then(|| sum / norm)
}

/// Azimuth in the plane normal to the beam (lab y), measured from x towards z
fn azimuth_about_beam(v: &Vector3<f64>) -> Option<f64> {
    (v.x.hypot(v.z) > VECTOR_TOLERANCE).then(|| v.z.atan2(v.x))
}
