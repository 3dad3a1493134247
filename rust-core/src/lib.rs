//! Diffractometer geometry engine
//!
//! This library computes crystal orientation matrices from reference reflections
//! and converts between Miller indices and diffractometer angles for four-circle,
//! five-circle, z-axis and six-circle instruments.

pub mod calc;
pub mod config;
pub mod error;
pub mod geometry;
pub mod interfaces;
pub mod lattice;
pub mod modes;
pub mod session;
pub mod ub;


pub use calc::{angles_to_hkl, hkl_to_angles, virtual_angles, SolveContext, Solution, VirtualAngles};
pub use config::SessionConfig;
pub use error::{DiffcalcError, ErrorKind, Result};
pub use geometry::{geometry_from_name, DiffractometerGeometry, HardwareLimits, Position};
pub use interfaces::{energy_to_wavelength, wavelength_to_energy, Hkl};
pub use lattice::Lattice;
pub use modes::{ConstraintName, ConstraintSet, Mode};
pub use session::CalculationSession;
pub use ub::{Orientation, OrientationState, Reflection};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
