// UB module: reference reflections, the orientation solver and the persisted
// orientation state

// ======================== MODULE DECLARATIONS ========================
pub mod orientation;
pub mod reflection;
pub mod ub_state;


// ======================== REFLECTIONS ========================
pub use reflection::{
    Reflection, // struct - hkl, canonical angles (degrees), energy, tag, timestamp
    Timestamp,  // enum - Epoch { seconds } or Calendar(DateTime<Utc>)
};

// ======================== ORIENTATION SOLVER ========================
pub use orientation::{
    check_reflections,          // fn - calculated hkl and 2θ mismatch per reflection
    compute_u,                  // fn - Busing–Levy triad from two reflections
    fit_u,                      // fn - triad or SVD fit with residuals
    fit_u_with_target,          // fn - fit_u logging under a session target
    phi_frame_direction,        // fn - unit scattering vector of a position in the phi frame
    reflection_residuals,       // fn - angular residual per reflection in degrees
    rotation_from_vector_pairs, // fn - rotation taking one vector pair onto another
    FitMethod,                  // enum - Triad or Kabsch
    Orientation,                // struct - U and UB, always together
    OrientationFit,             // struct - orientation with residuals
    ReflectionCheck,            // struct - one row of check_reflections
};

// ======================== PERSISTED STATE ========================
pub use ub_state::OrientationState; // struct - lattice, reflections, optional U/UB
// OrientationState impl methods:
//   from_json(&str) -> Result<Self>              - parse and validate
//   set_lattice(&Lattice)                        - clears U/UB
//   reflections() -> &[Reflection]
//   add_reflection(Reflection) / remove_reflection(index) - clear U/UB
//   recompute(threshold_deg) -> Result<OrientationFit> - all-or-nothing
//   recompute_with_target(threshold_deg, log_target)
//   set_u / set_ub -> Result<Orientation>        - manual orientation
//   orientation() -> Option<Orientation>
