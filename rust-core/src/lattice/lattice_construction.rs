use crate::error::Result;
use crate::lattice::Lattice;

// Standard lattice construction utilities for the seven crystal systems.
// Lengths in Å, angles in degrees.

/// Cubic cell, a = b = c, all angles 90°
pub fn cubic_lattice(a: f64) -> Result<Lattice> {
    Lattice::from_parameters(a, a, a, 90.0, 90.0, 90.0)
}

/// Tetragonal cell, a = b ≠ c
pub fn tetragonal_lattice(a: f64, c: f64) -> Result<Lattice> {
    Lattice::from_parameters(a, a, c, 90.0, 90.0, 90.0)
}

/// Orthorhombic cell with three independent lengths
pub fn orthorhombic_lattice(a: f64, b: f64, c: f64) -> Result<Lattice> {
    Lattice::from_parameters(a, b, c, 90.0, 90.0, 90.0)
}

/// Hexagonal cell, a = b, γ = 120°
pub fn hexagonal_lattice(a: f64, c: f64) -> Result<Lattice> {
    Lattice::from_parameters(a, a, c, 90.0, 90.0, 120.0)
}

/// Rhombohedral (trigonal) cell in its primitive setting
pub fn rhombohedral_lattice(a: f64, alpha: f64) -> Result<Lattice> {
    Lattice::from_parameters(a, a, a, alpha, alpha, alpha)
}

/// Monoclinic cell with unique axis b
pub fn monoclinic_lattice(a: f64, b: f64, c: f64, beta: f64) -> Result<Lattice> {
    Lattice::from_parameters(a, b, c, 90.0, beta, 90.0)
}

pub fn triclinic_lattice(
    a: f64,
    b: f64,
    c: f64,
    alpha: f64,
    beta: f64,
    gamma: f64,
) -> Result<Lattice> {
    Lattice::from_parameters(a, b, c, alpha, beta, gamma)
}
