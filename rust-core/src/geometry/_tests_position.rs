#[cfg(test)]
mod _tests_position {
    use super::super::position::{wrap_angle, Axis, Position};
    use super::super::rotation_matrices::*;
    use nalgebra::Vector3;
    use std::f64::consts::PI;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_axis_names() {
        for axis in Axis::ALL {
            assert_eq!(Axis::from_name(axis.name()), Some(axis));
        }
        assert_eq!(Axis::from_name("CHI"), Some(Axis::Chi));
        assert_eq!(Axis::from_name("eta"), None);
    }

    #[test]
    fn test_degrees_round_trip() {
        let p = Position::from_degrees(1.0, 60.0, -2.0, 30.0, 90.0, -45.0);
        assert!((p.delta - PI / 3.0).abs() < TOL);
        let degrees = p.to_degrees();
        for (got, expected) in degrees.iter().zip([1.0, 60.0, -2.0, 30.0, 90.0, -45.0]) {
            assert!((got - expected).abs() < 1e-10);
        }
    }

    #[test]
    fn test_get_set() {
        let mut p = Position::default();
        p.set(Axis::Omega, 0.5);
        assert_eq!(p.get(Axis::Omega), 0.5);
        assert_eq!(p.with(Axis::Phi, 1.0).phi, 1.0);
    }

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < TOL);
        assert!((wrap_angle(-PI) - PI).abs() < TOL);
        assert!((wrap_angle(PI) - PI).abs() < TOL);
        assert!((wrap_angle(-0.25) + 0.25).abs() < TOL);
    }

    #[test]
    fn test_distance_takes_short_way() {
        let a = Position::from_degrees(0.0, 0.0, 0.0, 179.0, 0.0, 0.0);
        let b = Position::from_degrees(0.0, 0.0, 0.0, -179.0, 0.0, 0.0);
        assert!((a.distance(&b) - 2.0_f64.to_radians()).abs() < 1e-10);
    }

    #[test]
    fn test_rotation_matrices_are_proper() {
        for m in [x_rotation(0.3), y_rotation(-1.2), z_rotation(2.5)] {
            assert!((m.determinant() - 1.0).abs() < TOL);
            assert!((m * m.transpose() - nalgebra::Matrix3::identity()).norm() < 1e-12);
        }
    }

    #[test]
    fn test_left_handed_sample_axes() {
        // Positive phi turns x towards -y
        let v = phi_matrix(PI / 2.0) * Vector3::x();
        assert!((v - Vector3::new(0.0, -1.0, 0.0)).norm() < TOL);
        // Positive chi turns z towards +x
        let v = chi_matrix(PI / 2.0) * Vector3::z();
        assert!((v - Vector3::x()).norm() < TOL);
    }

    #[test]
    fn test_wave_vectors_at_zero() {
        let p = Position::default();
        assert!((incident_direction(&p) - Vector3::y()).norm() < TOL);
        assert!((exit_direction(&p) - Vector3::y()).norm() < TOL);
        assert!(scattering_vector(&p, 2.0 * PI).norm() < TOL);
    }

    #[test]
    fn test_scattering_vector_magnitude() {
        // |Q| = 2k sin θ
        let p = Position::from_degrees(0.0, 60.0, 0.0, 30.0, 0.0, 0.0);
        let k = 2.0 * PI;
        let q = scattering_vector(&p, k);
        assert!((q.norm() - 2.0 * k * (30.0_f64).to_radians().sin()).abs() < 1e-10);
        // In the horizontal plane, 30° below x
        assert!(q.z.abs() < TOL);
        assert!((q.y.atan2(q.x) + PI / 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_incidence_rotates_beam_into_alpha_frame() {
        let p = Position::from_degrees(10.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let lab = alpha_to_lab(&p, &incident_direction(&p));
        assert!((lab - Vector3::y()).norm() < TOL);
    }
}
