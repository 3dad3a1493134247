#[cfg(test)]
mod _tests_mode_selector {
    use super::super::mode_selector::*;
    use super::super::mode_table::{Mode, ModeGroup, MODES};
    use crate::error::ErrorKind;
    use crate::geometry::geometry_from_name;

    #[test]
    fn test_table_ids_are_unique_and_sorted() {
        let ids: Vec<u32> = MODES.iter().map(|m| m.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(ids, sorted);
        assert_eq!(Mode::from_id(21).unwrap().name, "6czBin");
        assert!(Mode::from_id(6).is_none());
        assert_eq!(Mode::lookup("13").unwrap().name, "5caBeq");
        assert_eq!(Mode::lookup("4cphi").unwrap().id, 5);
    }

    #[test]
    fn test_list_modes_per_geometry() {
        let fourc = geometry_from_name("fourc").unwrap();
        let listed = list_modes(fourc.as_ref());
        assert_eq!(listed.len(), 6);
        assert!(listed.iter().all(|m| m.group == ModeGroup::FourCircle));

        let fivec = geometry_from_name("fivec").unwrap();
        assert_eq!(list_modes(fivec.as_ref()).len(), 9);

        let zaxis = geometry_from_name("zaxis").unwrap();
        let ids: Vec<u32> = list_modes(zaxis.as_ref()).iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![20, 21, 22]);

        let sixc = geometry_from_name("sixc").unwrap();
        assert_eq!(list_modes(sixc.as_ref()).len(), MODES.len());
    }

    #[test]
    fn test_select_errors_leave_selection_unchanged() {
        let fourc = geometry_from_name("fourc").unwrap();
        let mut selector = ModeSelector::new();
        selector.select_by_name("4cBin", fourc.as_ref()).unwrap();

        let err = selector.select_by_name("6czBeq", fourc.as_ref()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedMode);

        let err = selector.select_by_name("nosuchmode", fourc.as_ref()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownMode);

        let err = selector.select_by_id(99, fourc.as_ref()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownMode);

        // Listed but not implemented
        let err = selector.select_by_id(0, fourc.as_ref()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedMode);

        assert_eq!(selector.current().unwrap().name, "4cBin");
    }

    #[test]
    fn test_required_parameters_drop_fixed_axes() {
        let bin = Mode::from_name("4cBin").unwrap();
        let fourc = geometry_from_name("fourc").unwrap();
        assert_eq!(required_parameters(bin, fourc.as_ref()), vec!["betain"]);

        let fivec = geometry_from_name("fivec").unwrap();
        assert_eq!(required_parameters(bin, fivec.as_ref()), vec!["alpha", "betain"]);

        let sixc = geometry_from_name("sixc").unwrap();
        assert_eq!(
            required_parameters(bin, sixc.as_ref()),
            vec!["alpha", "gamma", "betain"]
        );

        let gbeq = Mode::from_name("5cgBeq").unwrap();
        assert!(required_parameters(gbeq, fivec.as_ref()).is_empty());
    }
}
