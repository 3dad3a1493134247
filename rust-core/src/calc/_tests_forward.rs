#[cfg(test)]
mod _tests_forward {
    use super::super::forward::angles_to_hkl;
    use crate::error::ErrorKind;
    use crate::geometry::Position;
    use crate::lattice::{cubic_lattice, tetragonal_lattice};
    use nalgebra::{Matrix3, Vector3};
    use std::f64::consts::PI;

    const TOL: f64 = 1e-10;

    fn golden_ub() -> Matrix3<f64> {
        Matrix3::identity() * 2.0 * PI
    }

    #[test]
    fn test_golden_position() {
        let p = Position::from_degrees(0.0, 90.0, 0.0, 90.0, 0.0, 0.0);
        // Rotating the (110) reflection by omega = 90° puts it on Q
        let hkl = angles_to_hkl(&p, 1.0, &golden_ub()).unwrap();
        assert!((hkl - Vector3::new(1.0, 1.0, 0.0)).norm() < TOL, "{hkl:?}");
    }

    #[test]
    fn test_symmetric_reflection() {
        // delta = 60°, omega = 30°: Q along x in the phi frame, |Q| = 2π
        let p = Position::from_degrees(0.0, 60.0, 0.0, 30.0, 0.0, 0.0);
        let hkl = angles_to_hkl(&p, 1.0, &golden_ub()).unwrap();
        assert!((hkl - Vector3::new(1.0, 0.0, 0.0)).norm() < TOL, "{hkl:?}");

        // Same position, phi = 90° turns the crystal so (010) diffracts
        let p = p.with(crate::geometry::Axis::Phi, PI / 2.0);
        let hkl = angles_to_hkl(&p, 1.0, &golden_ub()).unwrap();
        assert!((hkl - Vector3::new(0.0, 1.0, 0.0)).norm() < TOL, "{hkl:?}");
    }

    #[test]
    fn test_zero_position_is_origin() {
        let hkl = angles_to_hkl(&Position::default(), 1.54, &golden_ub()).unwrap();
        assert!(hkl.norm() < TOL);
    }

    #[test]
    fn test_scales_with_lattice() {
        // Doubling c halves l for the same scattering vector
        let p = Position::from_degrees(0.0, 60.0, 0.0, 30.0, 90.0, 0.0);
        let cubic = *cubic_lattice(1.0).unwrap().b_matrix();
        let long = *tetragonal_lattice(1.0, 2.0).unwrap().b_matrix();
        let l1 = angles_to_hkl(&p, 1.0, &cubic).unwrap();
        let l2 = angles_to_hkl(&p, 1.0, &long).unwrap();
        assert!((l2.z - 2.0 * l1.z).abs() < TOL);
        assert!(l1.z.abs() > 0.5);
    }

    #[test]
    fn test_rejects_bad_input() {
        let p = Position::default();
        assert_eq!(
            angles_to_hkl(&p, 1.0, &Matrix3::zeros()).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            angles_to_hkl(&p, 0.0, &golden_ub()).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
    }
}
