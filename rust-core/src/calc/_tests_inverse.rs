#[cfg(test)]
mod _tests_inverse {
    use super::super::forward::angles_to_hkl;
    use super::super::inverse::{decompose_sample_rotation, hkl_to_angles, SolveContext, Solution};
    use super::super::virtual_angles::virtual_angles;
    use crate::error::{DiffcalcError, ErrorKind, Result};
    use crate::geometry::{
        geometry_from_name, sample_rotation, Axis, DiffractometerGeometry, HardwareLimits,
        Position,
    };
    use crate::geometry::rotation_matrices::{x_rotation, y_rotation, z_rotation};
    use crate::interfaces::wavelength_to_energy;
    use crate::lattice::monoclinic_lattice;
    use crate::modes::{ConstraintName, ConstraintSet};
    use crate::ub::{fit_u, Reflection};
    use nalgebra::{Matrix3, Vector3};
    use std::f64::consts::PI;

    const WAVELENGTH: f64 = 1.0;

    fn ub() -> Matrix3<f64> {
        Matrix3::identity() * 2.0 * PI
    }

    /// Constraint set from (name, degrees) pairs; `None` for relations
    fn constraints(entries: &[(&str, Option<f64>)]) -> ConstraintSet {
        let mut set = ConstraintSet::new();
        for (name, value) in entries {
            let name = ConstraintName::from_name(name).unwrap();
            match value {
                Some(degrees) => set.fix(name, *degrees).unwrap(),
                None => set.enable(name).unwrap(),
            };
        }
        set
    }

    fn solve_on(
        geometry: &dyn DiffractometerGeometry,
        limits: &HardwareLimits,
        hkl: Vector3<f64>,
        set: &ConstraintSet,
        hint: Option<Position>,
    ) -> Result<Solution> {
        let context = SolveContext::new(geometry, limits).with_hint(hint);
        hkl_to_angles(&hkl, WAVELENGTH, &ub(), set, &context)
    }

    fn solve(
        geometry: &str,
        hkl: Vector3<f64>,
        set: &ConstraintSet,
        hint: Option<Position>,
    ) -> Result<Solution> {
        let geometry = geometry_from_name(geometry).unwrap();
        solve_on(geometry.as_ref(), &HardwareLimits::new(), hkl, set, hint)
    }

    fn assert_reaches(solution: &Solution, hkl: Vector3<f64>) {
        let back = angles_to_hkl(&solution.position, WAVELENGTH, &ub()).unwrap();
        assert!(
            (back - hkl).norm() < 1e-8,
            "{:?} maps to {back:?}, wanted {hkl:?}",
            solution.position.to_degrees()
        );
    }

    fn assert_same_position(a: &Position, b: &Position) {
        assert!(
            a.distance(b) < 1e-7,
            "{:?} != {:?}",
            a.to_degrees(),
            b.to_degrees()
        );
    }

    fn close_deg(radians: f64, degrees: f64) -> bool {
        (radians.to_degrees() - degrees).abs() < 1e-6
    }

    fn general_hkl() -> Vector3<f64> {
        Vector3::new(0.6, 0.3, 0.4)
    }

    // ======================== GOLDEN ========================

    #[test]
    fn test_golden_bisecting_reflection() {
        let set = constraints(&[("betain_eq_betaout", None)]);
        let solution = solve("fourc", Vector3::new(1.0, 1.0, 0.0), &set, None).unwrap();
        let expected = Position::from_degrees(0.0, 90.0, 0.0, 90.0, 0.0, 0.0);
        assert_same_position(&solution.position, &expected);
        // Both delta signs and both chi gimbal branches survive the forward check
        assert_eq!(solution.branch_count, 4);
        assert!(close_deg(solution.virtual_angles.two_theta, 90.0));
        assert!(solution.virtual_angles.betain.abs() < 1e-9);
    }

    #[test]
    fn test_golden_same_with_bisect_mode_on_sixc() {
        let set = constraints(&[
            ("alpha", Some(0.0)),
            ("gamma", Some(0.0)),
            ("betain_eq_betaout", None),
        ]);
        let solution = solve("sixc", Vector3::new(1.0, 1.0, 0.0), &set, None).unwrap();
        let expected = Position::from_degrees(0.0, 90.0, 0.0, 90.0, 0.0, 0.0);
        assert_same_position(&solution.position, &expected);
    }

    // ======================== ROUND TRIPS ========================

    #[test]
    fn test_fourc_round_trips() {
        let p = Position::from_degrees(0.0, 50.0, 0.0, 20.0, 35.0, -60.0);
        let hkl = angles_to_hkl(&p, WAVELENGTH, &ub()).unwrap();
        let v = virtual_angles(&p, &Vector3::z()).unwrap();

        for set in [
            constraints(&[("betain", Some(v.betain.to_degrees()))]),
            constraints(&[("betaout", Some(v.betaout.to_degrees()))]),
            constraints(&[("psi", Some(v.psi.unwrap().to_degrees()))]),
            constraints(&[("phi", Some(-60.0))]),
        ] {
            let solution = solve("fourc", hkl, &set, Some(p)).unwrap();
            assert_same_position(&solution.position, &p);
            assert_reaches(&solution, hkl);
        }
    }

    #[test]
    fn test_sixc_round_trip_with_psi() {
        let p = Position::from_degrees(3.0, 40.0, 6.0, 25.0, 50.0, 10.0);
        let hkl = angles_to_hkl(&p, WAVELENGTH, &ub()).unwrap();
        let psi = virtual_angles(&p, &Vector3::z()).unwrap().psi.unwrap();
        let set = constraints(&[
            ("alpha", Some(3.0)),
            ("gamma", Some(6.0)),
            ("psi", Some(psi.to_degrees())),
        ]);
        let solution = solve("sixc", hkl, &set, Some(p)).unwrap();
        assert_same_position(&solution.position, &p);
        assert!(close_deg(solution.virtual_angles.psi.unwrap(), psi.to_degrees()));
    }

    #[test]
    fn test_zaxis_round_trip_on_sixc() {
        let p = Position::from_degrees(4.0, 30.0, 9.0, 70.0, 0.0, 0.0);
        let hkl = angles_to_hkl(&p, WAVELENGTH, &ub()).unwrap();
        let set = constraints(&[("chi", Some(0.0)), ("phi", Some(0.0)), ("betain", Some(4.0))]);
        let solution = solve("sixc", hkl, &set, Some(p)).unwrap();
        assert_same_position(&solution.position, &p);
    }

    #[test]
    fn test_fitted_ub_reproduces_its_reflections() {
        let lattice = monoclinic_lattice(4.0, 5.0, 6.0, 100.0).unwrap();
        let u0 = z_rotation(0.4) * y_rotation(-0.7) * x_rotation(1.1);
        let ub0 = u0 * lattice.b_matrix();
        let energy = wavelength_to_energy(WAVELENGTH).unwrap();
        let positions = [
            Position::from_degrees(2.0, 40.0, 5.0, 20.0, 10.0, 5.0),
            Position::from_degrees(0.0, 55.0, 3.0, 27.0, -30.0, 80.0),
        ];
        let reflections: Vec<Reflection> = positions
            .iter()
            .map(|p| {
                let hkl = angles_to_hkl(p, WAVELENGTH, &ub0).unwrap();
                Reflection::new(hkl, p, energy).unwrap()
            })
            .collect();
        let fit = fit_u(&reflections, lattice.b_matrix(), 0.5).unwrap();
        assert!((fit.orientation.u - u0).norm() < 1e-9);

        let sixc = geometry_from_name("sixc").unwrap();
        let limits = HardwareLimits::new();
        for (reflection, p) in reflections.iter().zip(&positions) {
            let v = virtual_angles(p, &Vector3::z()).unwrap();
            let detector = [
                ("alpha", Some(p.alpha.to_degrees())),
                ("gamma", Some(p.gamma.to_degrees())),
            ];
            for sample in [
                ("phi", Some(p.phi.to_degrees())),
                ("psi", Some(v.psi.unwrap().to_degrees())),
                ("betain", Some(v.betain.to_degrees())),
            ] {
                let set = constraints(&[detector[0], detector[1], sample]);
                let context = SolveContext::new(sixc.as_ref(), &limits).with_hint(Some(*p));
                let solution = hkl_to_angles(
                    &reflection.hkl(),
                    WAVELENGTH,
                    &fit.orientation.ub,
                    &set,
                    &context,
                )
                .unwrap();
                assert!(
                    solution.position.distance(p) < 1e-6,
                    "{} fixed: {:?} != {:?}",
                    sample.0,
                    solution.position.to_degrees(),
                    p.to_degrees()
                );
            }
        }
    }

    // ======================== MODE PROPERTIES ========================

    #[test]
    fn test_fourc_modes_meet_their_condition() {
        let hkl = general_hkl();

        let s = solve("fourc", hkl, &constraints(&[("betain_eq_betaout", None)]), None).unwrap();
        assert_reaches(&s, hkl);
        assert!((s.virtual_angles.betain - s.virtual_angles.betaout).abs() < 1e-8);

        let s = solve("fourc", hkl, &constraints(&[("betain", Some(5.0))]), None).unwrap();
        assert_reaches(&s, hkl);
        assert!(close_deg(s.virtual_angles.betain, 5.0));

        let s = solve("fourc", hkl, &constraints(&[("betaout", Some(10.0))]), None).unwrap();
        assert_reaches(&s, hkl);
        assert!(close_deg(s.virtual_angles.betaout, 10.0));

        let s = solve("fourc", hkl, &constraints(&[("psi", Some(30.0))]), None).unwrap();
        assert_reaches(&s, hkl);
        assert!(close_deg(s.virtual_angles.psi.unwrap(), 30.0));

        let s = solve("fourc", hkl, &constraints(&[("phi", Some(20.0))]), None).unwrap();
        assert_reaches(&s, hkl);
        assert!(close_deg(s.position.phi, 20.0));

        // alpha and gamma stay at their hardware values
        assert_eq!(s.position.alpha, 0.0);
        assert_eq!(s.position.gamma, 0.0);
    }

    #[test]
    fn test_five_circle_fixed_gamma_follows_betain() {
        let hkl = general_hkl();
        for set in [
            constraints(&[("alpha_eq_betain", None), ("betain_eq_betaout", None)]),
            constraints(&[("alpha_eq_betain", None), ("betain", Some(5.0))]),
            constraints(&[("alpha_eq_betain", None), ("betaout", Some(10.0))]),
        ] {
            let s = solve("fivec", hkl, &set, None).unwrap();
            assert_reaches(&s, hkl);
            assert!((s.position.alpha - s.virtual_angles.betain).abs() < 1e-8);
            assert_eq!(s.position.gamma, 0.0);
        }
    }

    #[test]
    fn test_five_circle_fixed_alpha_follows_betaout() {
        let hkl = general_hkl();
        for set in [
            constraints(&[("gamma_eq_betaout", None), ("betain_eq_betaout", None)]),
            constraints(&[("gamma_eq_betaout", None), ("betain", Some(5.0))]),
            constraints(&[("gamma_eq_betaout", None), ("betaout", Some(10.0))]),
        ] {
            let s = solve("fivec_fixed_alpha", hkl, &set, None).unwrap();
            assert_reaches(&s, hkl);
            assert!((s.position.gamma - s.virtual_angles.betaout).abs() < 1e-8);
            assert_eq!(s.position.alpha, 0.0);
        }
    }

    #[test]
    fn test_zaxis_modes() {
        let hkl = general_hkl();
        for set in [
            constraints(&[("betain_eq_betaout", None)]),
            constraints(&[("betain", Some(5.0))]),
            constraints(&[("betaout", Some(10.0))]),
        ] {
            let s = solve("zaxis", hkl, &set, None).unwrap();
            assert_reaches(&s, hkl);
            assert_eq!(s.position.chi, 0.0);
            assert_eq!(s.position.phi, 0.0);
            // Reference along the omega axis
            assert!((s.position.alpha - s.virtual_angles.betain).abs() < 1e-8);
            assert!((s.position.gamma - s.virtual_angles.betaout).abs() < 1e-8);
        }
    }

    #[test]
    fn test_sixc_modes_with_detector_relations() {
        let hkl = general_hkl();
        let s = solve(
            "sixc",
            hkl,
            &constraints(&[("gamma", Some(2.0)), ("alpha_eq_betain", None), ("betain", Some(3.0))]),
            None,
        )
        .unwrap();
        assert_reaches(&s, hkl);
        assert!(close_deg(s.position.alpha, 3.0));
        assert!(close_deg(s.position.gamma, 2.0));
        assert!(close_deg(s.virtual_angles.betain, 3.0));

        let s = solve(
            "sixc",
            hkl,
            &constraints(&[("chi", Some(0.0)), ("phi", Some(0.0)), ("betain_eq_betaout", None)]),
            None,
        )
        .unwrap();
        assert_reaches(&s, hkl);
        assert!((s.position.alpha - s.position.gamma).abs() < 1e-8);
    }

    // ======================== REACHABILITY ========================

    #[test]
    fn test_reachability_boundary() {
        let set = constraints(&[("phi", Some(0.0))]);
        // |Q| = 4π/λ is exact back-scattering
        let s = solve("fourc", Vector3::new(2.0, 0.0, 0.0), &set, None).unwrap();
        assert!(close_deg(s.virtual_angles.two_theta, 180.0));
        assert!(close_deg(s.position.delta.abs(), 180.0));
        assert_reaches(&s, Vector3::new(2.0, 0.0, 0.0));

        let err = solve("fourc", Vector3::new(2.01, 0.0, 0.0), &set, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnreachableReflection);
    }

    #[test]
    fn test_unsatisfiable_incidence() {
        // Exit at 80° leaves no consistent incidence for a low-angle reflection
        let set = constraints(&[("alpha_eq_betain", None), ("betaout", Some(80.0))]);
        let err = solve("fivec", Vector3::new(0.2, 0.0, 0.1), &set, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnreachableReflection);
    }

    #[test]
    fn test_hardware_limits_reject_every_branch() {
        let geometry = geometry_from_name("fourc").unwrap();
        let mut limits = HardwareLimits::new();
        limits.set(Axis::Delta, Some(-10.0), Some(10.0));
        let set = constraints(&[("betain_eq_betaout", None)]);
        let err = solve_on(geometry.as_ref(), &limits, Vector3::new(1.0, 1.0, 0.0), &set, None)
            .unwrap_err();
        assert!(matches!(
            err,
            DiffcalcError::PositionUnreachable { branches: 4, .. }
        ));
    }

    #[test]
    fn test_limits_pick_the_allowed_branch() {
        let geometry = geometry_from_name("fourc").unwrap();
        let mut limits = HardwareLimits::new();
        limits.set(Axis::Delta, Some(-180.0), Some(0.0));
        let set = constraints(&[("betain_eq_betaout", None)]);
        let s = solve_on(geometry.as_ref(), &limits, Vector3::new(1.0, 1.0, 0.0), &set, None)
            .unwrap();
        assert!(close_deg(s.position.delta, -90.0));
    }

    // ======================== REJECTIONS ========================

    #[test]
    fn test_constraint_count_on_sixc() {
        let hkl = general_hkl();
        let two = constraints(&[("alpha", Some(0.0)), ("gamma", Some(0.0))]);
        let four = constraints(&[
            ("alpha", Some(0.0)),
            ("gamma", Some(0.0)),
            ("betain", Some(1.0)),
            ("phi", Some(0.0)),
        ]);
        for set in [two, four] {
            let err = solve("sixc", hkl, &set, None).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ConstraintCount);
        }
        let three = constraints(&[("alpha", Some(0.0)), ("gamma", Some(0.0)), ("betain", Some(1.0))]);
        assert!(solve("sixc", hkl, &three, None).is_ok());
    }

    #[test]
    fn test_unsupported_combinations() {
        let hkl = general_hkl();
        let cases = [
            ("sixc", constraints(&[("alpha", Some(0.0)), ("gamma", Some(0.0)), ("chi", Some(10.0))])),
            ("sixc", constraints(&[("alpha", Some(0.0)), ("betain", Some(1.0)), ("betaout", Some(1.0))])),
            ("fivec", constraints(&[("alpha_eq_betain", None), ("psi", Some(10.0))])),
            ("fourc", constraints(&[("chi", Some(10.0))])),
        ];
        for (geometry, set) in cases {
            let err = solve(geometry, hkl, &set, None).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnsupportedMode, "{geometry}: {}", set.describe());
        }
    }

    #[test]
    fn test_hardware_fixed_axis_cannot_be_constrained() {
        let set = constraints(&[("alpha", Some(0.0))]);
        let err = solve("fourc", general_hkl(), &set, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedMode);
    }

    #[test]
    fn test_degenerate_inputs() {
        let set = constraints(&[("betain_eq_betaout", None)]);
        let err = solve("fourc", Vector3::zeros(), &set, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DegenerateGeometry);

        // Q along the reference leaves the azimuth free
        let err = solve("fourc", Vector3::new(0.0, 0.0, 1.0), &set, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DegenerateGeometry);
    }

    #[test]
    fn test_singular_ub_rejected() {
        let geometry = geometry_from_name("fourc").unwrap();
        let limits = HardwareLimits::new();
        let context = SolveContext::new(geometry.as_ref(), &limits);
        let set = constraints(&[("betain_eq_betaout", None)]);
        let err = hkl_to_angles(&general_hkl(), 1.0, &Matrix3::zeros(), &set, &context)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    // ======================== DECOMPOSITION ========================

    #[test]
    fn test_decompose_sample_rotation() {
        let p = Position::from_degrees(0.0, 0.0, 0.0, 40.0, 65.0, -120.0);
        let branches = decompose_sample_rotation(&sample_rotation(&p), 0.0);
        assert_eq!(branches.len(), 2);
        for (omega, chi, phi) in &branches {
            let q = Position::new(0.0, 0.0, 0.0, *omega, *chi, *phi);
            assert!((sample_rotation(&q) - sample_rotation(&p)).norm() < 1e-12);
        }
        assert!(branches.iter().any(|(_, chi, _)| close_deg(*chi, 65.0)));
    }

    #[test]
    fn test_decompose_gimbal_lock_keeps_phi() {
        let p = Position::from_degrees(0.0, 0.0, 0.0, 30.0, 0.0, 50.0);
        let branches = decompose_sample_rotation(&sample_rotation(&p), 50f64.to_radians());
        assert_eq!(branches.len(), 1);
        let (omega, chi, phi) = branches[0];
        assert!(close_deg(omega, 30.0) && close_deg(chi, 0.0) && close_deg(phi, 50.0));

        let p = Position::from_degrees(0.0, 0.0, 0.0, 30.0, 180.0, 50.0);
        let (omega, chi, phi) = decompose_sample_rotation(&sample_rotation(&p), 50f64.to_radians())[0];
        let q = Position::new(0.0, 0.0, 0.0, omega, chi, phi);
        assert!((sample_rotation(&q) - sample_rotation(&p)).norm() < 1e-12);
        assert!(close_deg(phi, 50.0));
    }
}
