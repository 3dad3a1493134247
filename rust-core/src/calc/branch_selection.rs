use std::cmp::Ordering;

use crate::geometry::{Axis, DiffractometerGeometry, HardwareLimits, Position};

// Angles closer than this compare equal during branch ordering
const BRANCH_TOLERANCE: f64 = 1e-9;

/// Drop branches that repeat an earlier one (up to 2π)
pub fn dedupe_branches(branches: Vec<Position>) -> Vec<Position> {
    let mut unique: Vec<Position> = Vec::with_capacity(branches.len());
    for branch in branches {
        if !unique.iter().any(|kept| kept.distance(&branch) < BRANCH_TOLERANCE) {
            unique.push(branch);
        }
    }
    unique
}

/// Order two feasible branches: nearest to the hint, then lower tie-break axis,
/// then larger delta, lower omega, lower phi.
pub fn compare_branches(
    a: &Position,
    b: &Position,
    tiebreak: Axis,
    hint: Option<&Position>,
) -> Ordering {
    let by = |x: f64, y: f64| {
        if (x - y).abs() < BRANCH_TOLERANCE {
            Ordering::Equal
        } else {
            x.total_cmp(&y)
        }
    };
    hint.map_or(Ordering::Equal, |h| by(a.distance(h), b.distance(h)))
        .then_with(|| by(a.get(tiebreak), b.get(tiebreak)))
        .then_with(|| by(b.delta, a.delta))
        .then_with(|| by(a.omega, b.omega))
        .then_with(|| by(a.phi, b.phi))
}

/// Pick one branch.
///
/// Branches are first cut into the hardware limits; those that do not fit are
/// discarded. Returns `None` when nothing fits.
pub fn select_branch(
    branches: &[Position],
    geometry: &dyn DiffractometerGeometry,
    limits: &HardwareLimits,
    hint: Option<&Position>,
) -> Option<Position> {
    let tiebreak = geometry.tiebreak_axis();
    branches
        .iter()
        .filter_map(|branch| limits.fit(branch, geometry))
        .min_by(|a, b| compare_branches(a, b, tiebreak, hint))
}
