use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DiffcalcError, Result};
use crate::geometry::Position;
use crate::interfaces::{energy_to_wavelength, Hkl};

/// When a reflection was recorded
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timestamp {
    /// Seconds since the Unix epoch
    Epoch { seconds: f64 },
    Calendar(DateTime<Utc>),
}

impl Timestamp {
    pub fn now() -> Self {
        Timestamp::Calendar(Utc::now())
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Timestamp::Epoch { seconds } => {
                let whole = seconds.floor();
                let nanos = ((seconds - whole) * 1e9).round() as u32;
                DateTime::<Utc>::from_timestamp(whole as i64, nanos.min(999_999_999))
            }
            Timestamp::Calendar(datetime) => Some(*datetime),
        }
    }
}

/// A reference reflection: hkl, the diffractometer position it was found at
/// and the beam energy.
///
/// Angles are persisted in degrees on the canonical axes
/// (alpha, delta, gamma, omega, chi, phi).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reflection {
    pub hkl: [f64; 3],
    pub angles: [f64; 6],
    /// Photon energy in keV
    pub energy: f64,
    #[serde(default)]
    pub tag: Option<String>,
    pub timestamp: Timestamp,
}

impl Reflection {
    pub fn new(hkl: Hkl, position: &Position, energy: f64) -> Result<Self> {
        let reflection = Self {
            hkl: [hkl[0], hkl[1], hkl[2]],
            angles: position.to_degrees(),
            energy,
            tag: None,
            timestamp: Timestamp::now(),
        };
        reflection.validate()?;
        Ok(reflection)
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn hkl(&self) -> Hkl {
        Hkl::new(self.hkl[0], self.hkl[1], self.hkl[2])
    }

    pub fn position(&self) -> Position {
        Position::from_degrees_array(self.angles)
    }

    pub fn wavelength(&self) -> Result<f64> {
        energy_to_wavelength(self.energy)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.energy > 0.0) || !self.energy.is_finite() {
            return Err(DiffcalcError::invalid_state(format!(
                "reflection {:?} has non-positive energy {}",
                self.hkl, self.energy
            )));
        }
        if self
            .hkl
            .iter()
            .chain(self.angles.iter())
            .any(|v| !v.is_finite())
        {
            return Err(DiffcalcError::invalid_state(format!(
                "reflection {:?} has non-finite values",
                self.hkl
            )));
        }
        Ok(())
    }
}
