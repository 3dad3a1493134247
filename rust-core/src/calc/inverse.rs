//! Inverse solver: hkl plus a constraint set → diffractometer angles.
//!
//! The solve runs in two stages on the canonical six-circle:
//!
//! 1. Detector side. The Bragg angle fixes 2θ; the constraints (directly, or
//!    through `sin βin + sin βout = 2 sin θ cos τ`) fix alpha and gamma, and
//!    delta follows from the scattering triangle with two signs.
//! 2. Sample side. With the scattering vector known in the alpha frame, the
//!    sample rotation Ω·X·Φ is found either from the reference direction
//!    (cone intersection, then decomposition into omega, chi, phi) or from a
//!    fixed phi or a fixed chi/phi pair.
//!
//! Every branch is mapped forward again and kept only if it reproduces the
//! requested hkl. One branch is then chosen by [`select_branch`].

use log::{debug, warn};
use nalgebra::{Matrix3, Vector3};
use serde::Serialize;

use super::branch_selection::{dedupe_branches, select_branch};
use super::forward::hkl_from_scattering;
use super::virtual_angles::{in_plane_normal, virtual_angles, VirtualAngles};
use crate::config::{ANGLE_TOLERANCE, DEFAULT_LOG_TARGET, HKL_TOLERANCE, VECTOR_TOLERANCE};
use crate::error::{DiffcalcError, Result};
use crate::geometry::rotation_matrices::{chi_matrix, phi_matrix, y_rotation};
use crate::geometry::{wrap_angle, DiffractometerGeometry, HardwareLimits, Position};
use crate::interfaces::{check_wavelength, hkl_array, wave_number, Hkl};
use crate::modes::{ConstraintName, ConstraintSet};
use crate::ub::rotation_from_vector_pairs;

/// Everything besides hkl, wavelength, UB and constraints that a solve depends on
#[derive(Debug, Clone)]
pub struct SolveContext<'a> {
    pub geometry: &'a dyn DiffractometerGeometry,
    pub limits: &'a HardwareLimits,
    /// Reference (surface normal) in the phi frame
    pub reference: Vector3<f64>,
    /// Last known position, used to break ties between branches
    pub hint: Option<Position>,
    pub log_target: &'a str,
}

impl<'a> SolveContext<'a> {
    pub fn new(geometry: &'a dyn DiffractometerGeometry, limits: &'a HardwareLimits) -> Self {
        Self {
            geometry,
            limits,
            reference: Vector3::z(),
            hint: None,
            log_target: DEFAULT_LOG_TARGET,
        }
    }

    pub fn with_reference(mut self, reference: Vector3<f64>) -> Self {
        self.reference = reference;
        self
    }

    pub fn with_hint(mut self, hint: Option<Position>) -> Self {
        self.hint = hint;
        self
    }

    pub fn with_log_target(mut self, log_target: &'a str) -> Self {
        self.log_target = log_target;
        self
    }
}

/// Chosen position of an inverse solve
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    pub position: Position,
    pub virtual_angles: VirtualAngles,
    /// Algebraically valid branches before hardware limits were applied
    pub branch_count: usize,
}

// ======================== SOLVE PLAN ========================

#[derive(Debug, Clone, Copy, PartialEq)]
enum BetaCondition {
    In(f64),
    Out(f64),
    Equal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ReferenceCondition {
    Beta(BetaCondition),
    Psi(f64),
}

/// How alpha and gamma are determined
#[derive(Debug, Clone, Copy, PartialEq)]
enum Detector {
    Known { alpha: f64, gamma: f64 },
    AlphaFollowsBetain { gamma: f64, beta: BetaCondition },
    GammaFollowsBetaout { alpha: f64, beta: BetaCondition },
    /// Reference along the omega axis: alpha = betain, gamma = betaout
    ZAxis { chi: f64, phi: f64, beta: BetaCondition },
}

/// How omega, chi and phi are determined
#[derive(Debug, Clone, Copy, PartialEq)]
enum Sample {
    Reference(ReferenceCondition),
    FixedPhi(f64),
    /// chi and phi fixed, only omega free
    OmegaOnly { chi: f64, phi: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SolvePlan {
    detector: Detector,
    sample: Sample,
}

impl SolvePlan {
    fn from_constraints(
        constraints: &ConstraintSet,
        geometry: &dyn DiffractometerGeometry,
    ) -> Result<Self> {
        let unsupported = |reason: &str| DiffcalcError::UnsupportedMode {
            mode: constraints.describe(),
            geometry: geometry.name().to_string(),
            reason: reason.to_string(),
        };
        let effective = |name: ConstraintName| {
            constraints
                .value(name)
                .or_else(|| name.axis().and_then(|axis| geometry.fixed_value(axis)))
        };

        let mut references = Vec::new();
        if let Some(v) = constraints.value(ConstraintName::Betain) {
            references.push(ReferenceCondition::Beta(BetaCondition::In(v)));
        }
        if let Some(v) = constraints.value(ConstraintName::Betaout) {
            references.push(ReferenceCondition::Beta(BetaCondition::Out(v)));
        }
        if constraints.is_constrained(ConstraintName::BetainEqBetaout) {
            references.push(ReferenceCondition::Beta(BetaCondition::Equal));
        }
        if let Some(v) = constraints.value(ConstraintName::Psi) {
            references.push(ReferenceCondition::Psi(v));
        }
        if references.len() > 1 {
            return Err(unsupported("more than one reference constraint"));
        }
        let reference = references.first().copied();
        let beta = match reference {
            Some(ReferenceCondition::Beta(beta)) => Some(beta),
            _ => None,
        };

        let alpha = effective(ConstraintName::Alpha);
        let gamma = effective(ConstraintName::Gamma);
        let chi = effective(ConstraintName::Chi);
        let phi = effective(ConstraintName::Phi);
        let alpha_follows = constraints.is_constrained(ConstraintName::AlphaEqBetain);
        let gamma_follows = constraints.is_constrained(ConstraintName::GammaEqBetaout);

        let detector = match (alpha, gamma, alpha_follows, gamma_follows) {
            (Some(alpha), Some(gamma), false, false) => Detector::Known { alpha, gamma },
            (None, Some(gamma), true, false) => Detector::AlphaFollowsBetain {
                gamma,
                beta: beta.ok_or_else(|| unsupported("alpha = betain needs a beta constraint"))?,
            },
            (Some(alpha), None, false, true) => Detector::GammaFollowsBetaout {
                alpha,
                beta: beta.ok_or_else(|| unsupported("gamma = betaout needs a beta constraint"))?,
            },
            (None, None, false, false) => match (chi, phi) {
                (Some(chi), Some(phi)) => Detector::ZAxis {
                    chi,
                    phi,
                    beta: beta.ok_or_else(|| unsupported("z-axis needs a beta constraint"))?,
                },
                _ => return Err(unsupported("alpha and gamma are not determined")),
            },
            _ => return Err(unsupported("alpha and gamma are not determined")),
        };

        let sample = match detector {
            Detector::ZAxis { chi, phi, .. } => Sample::OmegaOnly { chi, phi },
            _ => match (reference, chi, phi) {
                (Some(reference), None, None) => Sample::Reference(reference),
                (None, None, Some(phi)) if matches!(detector, Detector::Known { .. }) => {
                    Sample::FixedPhi(phi)
                }
                _ => return Err(unsupported("sample constraints not supported")),
            },
        };

        Ok(SolvePlan { detector, sample })
    }

    fn uses_reference(&self) -> bool {
        !matches!(self.sample, Sample::FixedPhi(_))
    }
}

// ======================== SOLVER ========================

/// Error context of one solve
struct Target<'a> {
    hkl: &'a Hkl,
    wavelength: f64,
}

impl Target<'_> {
    fn unreachable(&self, reason: impl Into<String>) -> DiffcalcError {
        DiffcalcError::UnreachableReflection {
            hkl: hkl_array(self.hkl),
            wavelength: self.wavelength,
            reason: reason.into(),
        }
    }

    fn asin(&self, value: f64, what: &str) -> Result<f64> {
        if value.abs() > 1.0 + ANGLE_TOLERANCE {
            return Err(self.unreachable(format!("{what}: sin = {value:.6} outside [-1, 1]")));
        }
        Ok(value.clamp(-1.0, 1.0).asin())
    }

    fn acos(&self, value: f64, what: &str) -> Result<f64> {
        if value.abs() > 1.0 + ANGLE_TOLERANCE {
            return Err(self.unreachable(format!("{what}: cos = {value:.6} outside [-1, 1]")));
        }
        Ok(value.clamp(-1.0, 1.0).acos())
    }
}

/// Angles that put `hkl` in diffraction under `constraints`.
pub fn hkl_to_angles(
    hkl: &Hkl,
    wavelength: f64,
    ub: &Matrix3<f64>,
    constraints: &ConstraintSet,
    context: &SolveContext<'_>,
) -> Result<Solution> {
    let geometry = context.geometry;
    let target = Target { hkl, wavelength };

    // 1) Constraints before any trigonometry
    constraints.validate(geometry)?;
    let plan = SolvePlan::from_constraints(constraints, geometry)?;
    debug!(
        target: context.log_target,
        "solving {:?} on {} with {:?}",
        hkl_array(hkl),
        geometry.name(),
        plan
    );

    // 2) Bragg condition
    check_wavelength(wavelength)?;
    let ub_inv = ub
        .try_inverse()
        .ok_or_else(|| DiffcalcError::invalid_input("UB matrix is singular"))?;
    let q_phi = ub * hkl;
    let q_norm = q_phi.norm();
    if q_norm < VECTOR_TOLERANCE {
        return Err(DiffcalcError::degenerate(format!(
            "hkl {:?} is the reciprocal-space origin",
            hkl_array(hkl)
        )));
    }
    let sin_theta = q_norm / (2.0 * wave_number(wavelength)?);
    let theta = target.asin(sin_theta, "Bragg angle beyond 90°")?;
    let h_phi = q_phi / q_norm;

    // 3) Reference direction and tau
    let n_phi = match plan.detector {
        Detector::ZAxis { chi, phi, .. } => {
            (chi_matrix(chi) * phi_matrix(phi)).transpose() * Vector3::z()
        }
        _ => {
            let norm = context.reference.norm();
            if norm < VECTOR_TOLERANCE {
                return Err(DiffcalcError::invalid_input("reference vector has zero length"));
            }
            context.reference / norm
        }
    };
    let sin_tau = h_phi.cross(&n_phi).norm();
    let cos_tau = h_phi.dot(&n_phi);
    let tau = sin_tau.atan2(cos_tau);
    if plan.uses_reference() && sin_tau < VECTOR_TOLERANCE {
        return Err(DiffcalcError::degenerate(format!(
            "hkl {:?} is parallel to the reference, azimuth undefined",
            hkl_array(hkl)
        )));
    }

    // 4) Detector side: alpha, gamma, then two delta signs
    let s = 2.0 * sin_theta * cos_tau;
    let (alpha, gamma) = incidence_and_exit(&plan.detector, s, &target)?;
    let denominator = alpha.cos() * gamma.cos();
    if denominator.abs() < VECTOR_TOLERANCE {
        return Err(target.unreachable("incidence or exit angle at 90°"));
    }
    let cos_delta = ((2.0 * theta).cos() + alpha.sin() * gamma.sin()) / denominator;
    let delta = target.acos(cos_delta, "detector angle")?;

    // 5) Sample side for each delta
    let mut branches = Vec::new();
    let mut first_error = None;
    for delta in [delta, -delta] {
        let detector = Position::new(alpha, delta, gamma, 0.0, 0.0, 0.0);
        match sample_branches(&plan.sample, &detector, &h_phi, &n_phi, tau, context, &target) {
            Ok(samples) => branches.extend(samples.into_iter().map(|(omega, chi, phi)| {
                Position::new(alpha, delta, gamma, omega, chi, phi).normalized()
            })),
            Err(err) => {
                debug!(target: context.log_target, "delta {:.4}°: {err}", delta.to_degrees());
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
    }
    if branches.is_empty() {
        if let Some(err) = first_error {
            return Err(err);
        }
    }

    // 6) Forward check
    let tolerance = HKL_TOLERANCE * hkl.norm().max(1.0);
    let k = wave_number(wavelength)?;
    let mut valid = Vec::new();
    for branch in dedupe_branches(branches) {
        let q_alpha = geometry.scattering_vector(&branch, k);
        let back = hkl_from_scattering(&branch, &q_alpha, &ub_inv);
        if (back - hkl).norm() <= tolerance {
            debug!(target: context.log_target, "branch {:?}", branch.to_degrees());
            valid.push(branch);
        } else {
            debug!(
                target: context.log_target,
                "discarded branch {:?}, maps to {:?}",
                branch.to_degrees(),
                hkl_array(&back)
            );
        }
    }
    if valid.is_empty() {
        return Err(target.unreachable("no branch satisfies every constraint"));
    }

    // 7) Branch selection
    let position = select_branch(&valid, geometry, context.limits, context.hint.as_ref())
        .ok_or_else(|| {
            warn!(
                target: context.log_target,
                "all {} branch(es) for {:?} are outside hardware limits",
                valid.len(),
                hkl_array(hkl)
            );
            DiffcalcError::PositionUnreachable {
                hkl: hkl_array(hkl),
                geometry: geometry.name().to_string(),
                branches: valid.len(),
            }
        })?;

    Ok(Solution {
        position,
        virtual_angles: virtual_angles(&position, &context.reference)?,
        branch_count: valid.len(),
    })
}

/// (omega, chi, phi) candidates for one detector setting
fn sample_branches(
    sample: &Sample,
    detector: &Position,
    h_phi: &Vector3<f64>,
    n_phi: &Vector3<f64>,
    tau: f64,
    context: &SolveContext<'_>,
    target: &Target<'_>,
) -> Result<Vec<(f64, f64, f64)>> {
    let hint_phi = context.hint.map_or(0.0, |h| h.phi);
    let hint_omega = context.hint.map_or(0.0, |h| h.omega);
    let k_in = context.geometry.incident_direction(detector);
    let k_out = context.geometry.exit_direction(detector);
    let q_alpha = (k_out - k_in).normalize();

    match *sample {
        Sample::Reference(condition) => {
            let mut samples = Vec::new();
            for n_alpha in reference_normals(&condition, &q_alpha, &k_in, &k_out, tau, target)? {
                let rotation = rotation_from_vector_pairs(h_phi, n_phi, &q_alpha, &n_alpha)
                    .ok_or_else(|| {
                        DiffcalcError::degenerate("reference parallel to the scattering vector")
                    })?;
                samples.extend(decompose_sample_rotation(&rotation, hint_phi));
            }
            Ok(samples)
        }
        Sample::FixedPhi(phi) => fixed_phi_samples(phi, h_phi, &q_alpha, hint_omega, target),
        Sample::OmegaOnly { chi, phi } => {
            let in_omega_frame = chi_matrix(chi) * phi_matrix(phi) * h_phi;
            Ok(vec![(in_plane_omega(&in_omega_frame, &q_alpha, hint_omega), chi, phi)])
        }
    }
}

/// alpha and gamma from the detector plan, `s` = 2 sin θ cos τ = sin βin + sin βout
fn incidence_and_exit(detector: &Detector, s: f64, target: &Target<'_>) -> Result<(f64, f64)> {
    // The beta that is not fixed follows from the identity
    let other = |fixed: f64| target.asin(s - fixed.sin(), "beta from sin βin + sin βout");
    let equal = || target.asin(s / 2.0, "betain = betaout");

    Ok(match *detector {
        Detector::Known { alpha, gamma } => (alpha, gamma),
        Detector::AlphaFollowsBetain { gamma, beta } => match beta {
            BetaCondition::In(v) => (v, gamma),
            BetaCondition::Out(v) => (other(v)?, gamma),
            BetaCondition::Equal => (equal()?, gamma),
        },
        Detector::GammaFollowsBetaout { alpha, beta } => match beta {
            BetaCondition::Out(v) => (alpha, v),
            BetaCondition::In(v) => (alpha, other(v)?),
            BetaCondition::Equal => (alpha, equal()?),
        },
        Detector::ZAxis { beta, .. } => match beta {
            BetaCondition::In(v) => (v, other(v)?),
            BetaCondition::Out(v) => (other(v)?, v),
            BetaCondition::Equal => {
                let both = equal()?;
                (both, both)
            }
        },
    })
}

/// Candidate reference directions in the alpha frame
fn reference_normals(
    condition: &ReferenceCondition,
    q_hat: &Vector3<f64>,
    k_in: &Vector3<f64>,
    k_out: &Vector3<f64>,
    tau: f64,
    target: &Target<'_>,
) -> Result<Vec<Vector3<f64>>> {
    match *condition {
        ReferenceCondition::Beta(BetaCondition::In(v)) => {
            cone_intersection(q_hat, &-k_in, v.sin(), tau, target)
        }
        ReferenceCondition::Beta(BetaCondition::Out(v)) => {
            cone_intersection(q_hat, k_out, v.sin(), tau, target)
        }
        ReferenceCondition::Beta(BetaCondition::Equal) => {
            let m = in_plane_normal(k_in, k_out).ok_or_else(|| {
                DiffcalcError::degenerate("back-scattering, betain = betaout undefined")
            })?;
            cone_intersection(q_hat, &m, 0.0, tau, target)
        }
        ReferenceCondition::Psi(psi) => {
            let e_s = in_plane_normal(k_in, k_out)
                .ok_or_else(|| DiffcalcError::degenerate("back-scattering, psi undefined"))?;
            let e_p = q_hat.cross(&e_s);
            Ok(vec![
                q_hat * tau.cos() + (e_s * psi.cos() + e_p * psi.sin()) * tau.sin(),
            ])
        }
    }
}

/// Unit vectors n with n·q̂ = cos τ and n·m̂ = c
fn cone_intersection(
    q_hat: &Vector3<f64>,
    m: &Vector3<f64>,
    c: f64,
    tau: f64,
    target: &Target<'_>,
) -> Result<Vec<Vector3<f64>>> {
    let m_hat = m.normalize();
    let mq = m_hat.dot(q_hat);
    let m_perp = m_hat - q_hat * mq;
    let perp_norm = m_perp.norm();
    if perp_norm < VECTOR_TOLERANCE {
        // m ∥ Q: the condition either holds for the whole cone or never
        return if (tau.cos() * mq - c).abs() < ANGLE_TOLERANCE {
            Err(DiffcalcError::degenerate(
                "reference condition is parallel to Q and leaves the azimuth free",
            ))
        } else {
            Err(target.unreachable("reference condition cannot be met at this tau"))
        };
    }
    let m_perp = m_perp / perp_norm;
    let w = q_hat.cross(&m_perp);

    let a = tau.cos();
    let b = (c - a * mq) / perp_norm;
    let c_squared = 1.0 - a * a - b * b;
    if c_squared < -ANGLE_TOLERANCE {
        return Err(target.unreachable("reference condition cannot be met at this tau"));
    }
    let root = c_squared.max(0.0).sqrt();
    let base = q_hat * a + m_perp * b;
    if root < ANGLE_TOLERANCE {
        Ok(vec![base])
    } else {
        Ok(vec![base + w * root, base - w * root])
    }
}

/// (omega, chi, phi) with Ω·X·Φ = rotation; two chi signs, one branch at the gimbal lock
pub fn decompose_sample_rotation(rotation: &Matrix3<f64>, hint_phi: f64) -> Vec<(f64, f64, f64)> {
    let r = rotation;
    let sin_chi = r[(2, 0)].hypot(r[(2, 1)]);
    if sin_chi < ANGLE_TOLERANCE {
        // Only omega ± phi is defined; phi stays where it was
        let phi = hint_phi;
        return if r[(2, 2)] > 0.0 {
            let sum = r[(0, 1)].atan2(r[(0, 0)]);
            vec![(sum - phi, 0.0, phi)]
        } else {
            let difference = r[(0, 1)].atan2(-r[(0, 0)]);
            vec![(difference + phi, std::f64::consts::PI, phi)]
        };
    }
    [sin_chi, -sin_chi]
        .into_iter()
        .map(|s| {
            let chi = s.atan2(r[(2, 2)]);
            let phi = (-r[(2, 1)] / s).atan2(-r[(2, 0)] / s);
            let omega = (-r[(1, 2)] / s).atan2(r[(0, 2)] / s);
            (omega, chi, phi)
        })
        .collect()
}

/// Omega that turns `v` (omega frame) onto `q` about z; both share their z component
fn in_plane_omega(v: &Vector3<f64>, q: &Vector3<f64>, fallback: f64) -> f64 {
    if v.x.hypot(v.y) < VECTOR_TOLERANCE {
        return fallback;
    }
    v.y.atan2(v.x) - q.y.atan2(q.x)
}

/// Branches with phi fixed: chi from the z component (two signs), omega in plane
fn fixed_phi_samples(
    phi: f64,
    h_phi: &Vector3<f64>,
    q_alpha: &Vector3<f64>,
    hint_omega: f64,
    target: &Target<'_>,
) -> Result<Vec<(f64, f64, f64)>> {
    let u = phi_matrix(phi) * h_phi;
    let r = u.x.hypot(u.z);
    if r < VECTOR_TOLERANCE {
        return Err(DiffcalcError::degenerate("scattering vector along the chi axis"));
    }
    // u.z = r cos ψ0, u.x = r sin ψ0, so the chi-rotated z component is r cos(χ + ψ0)
    let psi0 = u.x.atan2(u.z);
    let spread = target.acos(q_alpha.z / r, "chi for fixed phi")?;
    let mut samples = Vec::new();
    for chi in [spread - psi0, -spread - psi0] {
        let chi = wrap_angle(chi);
        let w = y_rotation(chi) * u;
        samples.push((in_plane_omega(&w, q_alpha, hint_omega), chi, phi));
    }
    Ok(samples)
}
