// Lattice module: crystal unit cells and the B matrix mapping hkl into reciprocal space

// ======================== MODULE DECLARATIONS ========================
pub mod crystal_lattice;
pub mod lattice_construction;
pub mod lattice_types;


// ======================== UNIT CELL ========================
pub use crystal_lattice::{
    Lattice,              // struct - unit cell with metric tensor and Busing–Levy B matrix
    LatticeParameters,    // struct - a, b, c (Å) and α, β, γ (degrees)
    ReciprocalParameters, // struct - reciprocal lengths (2π convention) and angles
};
// Lattice impl methods:
//   from_parameters(a, b, c, alpha, beta, gamma) -> Result<Self> - validates and builds the cell
//   b_matrix(&self) -> &Matrix3<f64>                  - upper-triangular B, 2π included
//   metric_tensor(&self) -> &Matrix3<f64>             - G, G_ij = a_i · a_j
//   reciprocal_metric(&self) -> &Matrix3<f64>         - G⁻¹
//   cell_volume(&self) -> f64                         - unit cell volume in Å³
//   reciprocal_parameters(&self) -> ReciprocalParameters
//   q_vector(&self, hkl) -> Vector3<f64>              - B · hkl
//   d_spacing(&self, hkl) -> Result<f64>              - 2π / |B · hkl|
//   two_theta(&self, hkl, wavelength) -> Result<f64>  - Bragg angle 2θ in degrees

// ======================== CRYSTAL SYSTEM CLASSIFICATION ========================
pub use lattice_types::{
    CrystalSystem,           // enum - the seven crystal systems
    identify_crystal_system, // fn - classify a metric tensor
};

// ======================== CONSTRUCTION UTILITIES ========================
pub use lattice_construction::{
    cubic_lattice,        // fn(a)
    hexagonal_lattice,    // fn(a, c)
    monoclinic_lattice,   // fn(a, b, c, beta)
    orthorhombic_lattice, // fn(a, b, c)
    rhombohedral_lattice, // fn(a, alpha)
    tetragonal_lattice,   // fn(a, c)
    triclinic_lattice,    // fn(a, b, c, alpha, beta, gamma)
};
