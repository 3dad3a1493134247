// Geometry module: canonical diffractometer position, rotation matrices and the
// per-family adapters that map physical motors onto the canonical six-circle

// ======================== MODULE DECLARATIONS ========================
pub mod geometry_adapter;
pub mod hardware_limits;
pub mod position;
pub mod rotation_matrices;

mod _tests_hardware_limits;
mod _tests_position;

// ======================== POSITION MODEL ========================
pub use position::{
    Axis,       // enum - alpha, delta, gamma, omega, chi, phi
    Position,   // struct - canonical angles in radians
    wrap_angle, // fn - wrap into (-π, π]
};
// Position impl methods:
//   from_degrees(alpha, delta, gamma, omega, chi, phi) -> Self
//   to_degrees(&self) -> [f64; 6]
//   get(&self, axis) / set(&mut self, axis, value) / with(self, axis, value)
//   normalized(&self) -> Self                - every angle in (-π, π]
//   distance(&self, other) -> f64            - RSS of wrapped per-axis differences

// ======================== ROTATIONS & WAVE VECTORS ========================
pub use rotation_matrices::{
    incident_direction, // fn - k̂i in the alpha frame
    exit_direction,     // fn - k̂f in the alpha frame
    sample_rotation,    // fn - R = Ω·X·Φ
    scattering_vector,  // fn - Q = k(k̂f − k̂i)
};

// ======================== GEOMETRY ADAPTERS ========================
pub use geometry_adapter::{
    DiffractometerGeometry, // trait - capability interface of one family
    FiveCircleFixedAlpha,   // struct - "fivec_fixed_alpha"
    FiveCircleFixedGamma,   // struct - "fivec"
    FourCircle,             // struct - "fourc"
    SixCircle,              // struct - "sixc"
    ZAxis,                  // struct - "zaxis"
    GEOMETRY_NAMES,         // const - accepted family names
    geometry_from_config,   // fn - adapter with configured fixed-axis overrides
    geometry_from_name,     // fn - adapter by family name
};
// DiffractometerGeometry trait methods:
//   name, physical_axis_names, physical_axes, fixed_axes    - static description
//   supports_mode_group(&self, group) -> bool
//   physical_to_internal(&self, &[f64]) -> Result<Position> - degrees in
//   internal_to_physical(&self, &Position) -> Vec<f64>      - degrees out
//   motor_count, required_constraint_count, tiebreak_axis, zaxis_alignment
//   incident_direction, exit_direction, scattering_vector   - angle → vector map

// ======================== HARDWARE LIMITS ========================
pub use hardware_limits::{
    AxisRange,      // struct - travel range in radians
    HardwareLimits, // struct - per-axis ranges with 360° cut
};
