use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;

use super::geometry_adapter::DiffractometerGeometry;
use super::position::{wrap_angle, Axis, Position};
use crate::config::{AxisLimit, ANGLE_TOLERANCE};
use crate::error::{DiffcalcError, Result};

/// Travel range of one canonical axis in radians
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl AxisRange {
    fn contains(&self, value: f64) -> bool {
        self.lower.map_or(true, |lo| value >= lo - ANGLE_TOLERANCE)
            && self.upper.map_or(true, |hi| value <= hi + ANGLE_TOLERANCE)
    }
}

/// Hardware travel limits keyed by canonical axis.
///
/// Axes without an entry are unlimited and reported in (-180°, 180°].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HardwareLimits {
    ranges: BTreeMap<Axis, AxisRange>,
}

impl HardwareLimits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve configured limits (degrees) against a geometry.
    ///
    /// Keys may be canonical axis names or the geometry's physical motor names.
    pub fn from_config(
        limits: &BTreeMap<String, AxisLimit>,
        geometry: &dyn DiffractometerGeometry,
    ) -> Result<Self> {
        let mut ranges = BTreeMap::new();
        for (key, limit) in limits {
            let axis = geometry.resolve_axis(key).ok_or_else(|| {
                DiffcalcError::invalid_input(format!(
                    "limit for unknown axis '{key}' on geometry '{}'",
                    geometry.name()
                ))
            })?;
            if let (Some(lo), Some(hi)) = (limit.lower, limit.upper) {
                if lo > hi {
                    return Err(DiffcalcError::invalid_input(format!(
                        "limit for '{key}' has lower {lo} above upper {hi}"
                    )));
                }
            }
            ranges.insert(
                axis,
                AxisRange {
                    lower: limit.lower.map(f64::to_radians),
                    upper: limit.upper.map(f64::to_radians),
                },
            );
        }
        Ok(Self { ranges })
    }

    /// Set a range in degrees
    pub fn set(&mut self, axis: Axis, lower: Option<f64>, upper: Option<f64>) {
        self.ranges.insert(
            axis,
            AxisRange {
                lower: lower.map(f64::to_radians),
                upper: upper.map(f64::to_radians),
            },
        );
    }

    pub fn range(&self, axis: Axis) -> Option<&AxisRange> {
        self.ranges.get(&axis)
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Shift an angle by multiples of 2π into the axis range.
    ///
    /// Returns `None` when no shifted copy of the angle lies inside the range.
    pub fn cut(&self, axis: Axis, angle: f64) -> Option<f64> {
        let wrapped = wrap_angle(angle);
        let Some(range) = self.ranges.get(&axis) else {
            return Some(wrapped);
        };
        // Smallest shift first, upward before downward
        for turns in [0, 1, -1, 2, -2] {
            let candidate = wrapped + 2.0 * PI * f64::from(turns);
            if range.contains(candidate) {
                return Some(candidate);
            }
        }
        None
    }

    /// Cut every axis of a position; `None` if any axis falls outside its range.
    ///
    /// Hardware-fixed axes of the geometry are passed through unchanged.
    pub fn fit(&self, position: &Position, geometry: &dyn DiffractometerGeometry) -> Option<Position> {
        let mut fitted = *position;
        for axis in Axis::ALL {
            if geometry.is_fixed(axis) {
                continue;
            }
            fitted.set(axis, self.cut(axis, position.get(axis))?);
        }
        Some(fitted)
    }
}
