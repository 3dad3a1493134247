// Calc module: hkl ↔ angle conversion, virtual angles and branch selection

// ======================== MODULE DECLARATIONS ========================
pub mod branch_selection;
pub mod forward;
pub mod inverse;
pub mod virtual_angles;

mod _tests_forward;
mod _tests_inverse;

// ======================== FORWARD ========================
pub use forward::angles_to_hkl; // fn - hkl = UB⁻¹ · Rᵀ · Q

// ======================== INVERSE ========================
pub use inverse::{
    decompose_sample_rotation, // fn - (omega, chi, phi) branches of a sample rotation
    hkl_to_angles,             // fn - constrained inverse solve
    SolveContext,              // struct - geometry, limits, reference, hint, log target
    Solution,                  // struct - chosen position with its virtual angles
};
// SolveContext impl methods:
//   new(geometry, limits) -> Self
//   with_reference(n_phi) / with_hint(Option<Position>) / with_log_target(&str)

// ======================== VIRTUAL ANGLES ========================
pub use virtual_angles::{
    virtual_angles, // fn - theta, 2θ, betain, betaout, tau, psi, qaz, naz
    VirtualAngles,  // struct - radians, undefined azimuths as None
};

// ======================== BRANCH SELECTION ========================
pub use branch_selection::{
    compare_branches, // fn - hint distance, tie-break axis, delta, omega, phi
    dedupe_branches,  // fn - drop repeated branches
    select_branch,    // fn - fit limits then take the best branch
};
