#[cfg(test)]
mod _tests_hardware_limits {
    use super::super::geometry_adapter::{FourCircle, SixCircle};
    use super::super::hardware_limits::HardwareLimits;
    use super::super::position::{Axis, Position};
    use crate::config::SessionConfig;
    use crate::error::ErrorKind;

    #[test]
    fn test_cut_without_limits_wraps() {
        let limits = HardwareLimits::new();
        let cut = limits.cut(Axis::Phi, 270.0_f64.to_radians()).unwrap();
        assert!((cut.to_degrees() + 90.0).abs() < 1e-10);
    }

    #[test]
    fn test_cut_shifts_into_range() {
        let mut limits = HardwareLimits::new();
        limits.set(Axis::Phi, Some(0.0), Some(360.0));
        let cut = limits.cut(Axis::Phi, (-90.0_f64).to_radians()).unwrap();
        assert!((cut.to_degrees() - 270.0).abs() < 1e-10);

        limits.set(Axis::Chi, Some(-10.0), Some(10.0));
        assert!(limits.cut(Axis::Chi, 90.0_f64.to_radians()).is_none());
    }

    #[test]
    fn test_fit_skips_hardware_fixed_axes() {
        let mut limits = HardwareLimits::new();
        // Would reject alpha = 0 if it were checked
        limits.set(Axis::Alpha, Some(5.0), Some(10.0));
        limits.set(Axis::Delta, Some(0.0), Some(120.0));
        let p = Position::from_degrees(0.0, 60.0, 0.0, 30.0, 0.0, 0.0);
        assert!(limits.fit(&p, &FourCircle::default()).is_some());
        assert!(limits.fit(&p, &SixCircle::default()).is_none());
    }

    #[test]
    fn test_from_config_accepts_physical_names() {
        let config = SessionConfig::default()
            .with_limit("eta", Some(-10.0), Some(100.0))
            .with_limit("delta", Some(0.0), None);
        let limits = HardwareLimits::from_config(&config.limits, &SixCircle::default()).unwrap();
        let range = limits.range(Axis::Omega).unwrap();
        assert!((range.upper.unwrap().to_degrees() - 100.0).abs() < 1e-10);
        assert!(limits.range(Axis::Delta).unwrap().upper.is_none());
    }

    #[test]
    fn test_from_config_rejects_bad_entries() {
        let config = SessionConfig::default().with_limit("theta", None, None);
        let err = HardwareLimits::from_config(&config.limits, &SixCircle::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let config = SessionConfig::default().with_limit("chi", Some(10.0), Some(-10.0));
        assert!(HardwareLimits::from_config(&config.limits, &SixCircle::default()).is_err());
    }
}
