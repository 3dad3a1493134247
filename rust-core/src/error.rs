//! Error types for geometry calculations
//!
//! Every fallible operation in the crate returns [`DiffcalcError`]. Each variant
//! carries enough context (offending hkl, constraint description, geometry name)
//! for a caller to correct its input and retry, and maps to a fieldless
//! [`ErrorKind`] plus a stable string code for programmatic handling.
//!
//! None of these errors is fatal to the process and the library never retries
//! internally; trying an alternative mode or reference is a caller decision.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, DiffcalcError>;

/// Tag for each error variant, independent of the attached context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidLattice,
    DegenerateGeometry,
    UnreachableReflection,
    ConstraintCount,
    UnknownMode,
    UnsupportedMode,
    PositionUnreachable,
    InvalidSessionState,
    InvalidInput,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiffcalcError {
    // ═══════════════════════════════════════════════════════════════════════
    // Crystal and orientation errors
    // ═══════════════════════════════════════════════════════════════════════

    /// Lattice parameters do not describe a physical unit cell
    #[error("Invalid lattice: {reason}")]
    InvalidLattice { reason: String },

    /// Collinear reference reflections, or an undefined azimuth
    #[error("Degenerate geometry: {reason}")]
    DegenerateGeometry { reason: String },

    // ═══════════════════════════════════════════════════════════════════════
    // Solver errors
    // ═══════════════════════════════════════════════════════════════════════

    /// The requested hkl cannot be reached for this wavelength and constraint set
    #[error("Reflection {hkl:?} unreachable at wavelength {wavelength} Å: {reason}")]
    UnreachableReflection {
        hkl: [f64; 3],
        wavelength: f64,
        reason: String,
    },

    /// Number of fixed constraints does not match the geometry's free degrees of freedom
    #[error(
        "Geometry '{geometry}' needs {expected} constraints but {actual} were given ({constraints})"
    )]
    ConstraintCount {
        geometry: String,
        expected: usize,
        actual: usize,
        constraints: String,
    },

    /// No mode with this name or id exists
    #[error("Unknown mode: '{mode}'")]
    UnknownMode { mode: String },

    /// Mode (or constraint combination) cannot be used with the active geometry
    #[error("Mode '{mode}' not supported for geometry '{geometry}': {reason}")]
    UnsupportedMode {
        mode: String,
        geometry: String,
        reason: String,
    },

    /// Every algebraic solution violates the configured travel limits
    #[error(
        "Reflection {hkl:?} has {branches} solution(s) on '{geometry}' but none within hardware limits"
    )]
    PositionUnreachable {
        hkl: [f64; 3],
        geometry: String,
        branches: usize,
    },

    /// Persisted orientation state is corrupt or incomplete
    #[error("Invalid orientation session state: {reason}")]
    InvalidSessionState { reason: String },

    /// Argument shape or range error (angle count, energy, singular UB)
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },
}

impl DiffcalcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidLattice { .. } => ErrorKind::InvalidLattice,
            Self::DegenerateGeometry { .. } => ErrorKind::DegenerateGeometry,
            Self::UnreachableReflection { .. } => ErrorKind::UnreachableReflection,
            Self::ConstraintCount { .. } => ErrorKind::ConstraintCount,
            Self::UnknownMode { .. } => ErrorKind::UnknownMode,
            Self::UnsupportedMode { .. } => ErrorKind::UnsupportedMode,
            Self::PositionUnreachable { .. } => ErrorKind::PositionUnreachable,
            Self::InvalidSessionState { .. } => ErrorKind::InvalidSessionState,
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
        }
    }

    /// Stable error code, e.g. `UNREACHABLE_REFLECTION`
    pub fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::InvalidLattice => "INVALID_LATTICE",
            ErrorKind::DegenerateGeometry => "DEGENERATE_GEOMETRY",
            ErrorKind::UnreachableReflection => "UNREACHABLE_REFLECTION",
            ErrorKind::ConstraintCount => "CONSTRAINT_COUNT",
            ErrorKind::UnknownMode => "UNKNOWN_MODE",
            ErrorKind::UnsupportedMode => "UNSUPPORTED_MODE",
            ErrorKind::PositionUnreachable => "POSITION_UNREACHABLE",
            ErrorKind::InvalidSessionState => "INVALID_SESSION_STATE",
            ErrorKind::InvalidInput => "INVALID_INPUT",
        }
    }

    /// All errors can be retried with corrected input.
    pub fn is_recoverable(&self) -> bool {
        true
    }

    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidSessionState {
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for DiffcalcError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_state(format!("could not parse session data: {err}"))
    }
}
