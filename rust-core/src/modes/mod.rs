// Modes module: static mode tables, mode selection and the constraint sets
// handed to the inverse solver. No angle math happens here.

// ======================== MODULE DECLARATIONS ========================
pub mod constraints;
pub mod mode_selector;
pub mod mode_table;

mod _tests_mode_selector;

// ======================== MODE TABLE ========================
pub use mode_table::{
    Mode,            // struct - id, name, group, parameters, implemented flag
    ModeGroup,       // enum - fourc, fivecFixedGamma, fivecFixedAlpha, zaxis
    SampleCondition, // enum - the sample-side condition of a mode
    MODES,           // static - every mode, ordered by id
};
// Mode impl methods:
//   all() -> &'static [Mode]
//   from_id(u32) / from_name(&str) / lookup(&str) -> Option<&'static Mode>

// ======================== SELECTION ========================
pub use mode_selector::{
    list_modes,          // fn - modes available on a geometry
    required_parameters, // fn - parameters minus hardware-fixed axes
    ModeSelector,        // struct - the session's selected mode
};

// ======================== CONSTRAINTS ========================
pub use constraints::{
    ConstraintName, // enum - alpha, gamma, chi, phi, betain, betaout, psi and relations
    ConstraintSet,  // struct - constraint name → value (radians) or active relation
};
// ConstraintSet impl methods:
//   fix(name, degrees) / enable(name) / free(name)
//   value(name) -> Option<f64>, is_constrained(name), len(), describe()
//   validate(&self, geometry) -> Result<()>    - arity check
//   for_mode(mode, parameters, geometry) -> Result<ConstraintSet>
