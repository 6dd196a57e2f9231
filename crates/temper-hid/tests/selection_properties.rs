//! Property tests for device selection.

use proptest::prelude::*;
use tempersensor_hid::{HidDeviceInfo, select_device};

fn candidate() -> impl Strategy<Value = HidDeviceInfo> {
    (
        prop_oneof![Just(0x0c45u16), Just(0x413du16), Just(0x046du16)],
        any::<u16>(),
        0u8..20,
    )
        .prop_map(|(vid, pid, n)| HidDeviceInfo::new(vid, pid, format!("/dev/hidraw{n}")))
}

fn any_of_vendor(vid: u16) -> impl Fn(u16, u16) -> bool {
    move |v, _| v == vid || v == 0x413d
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(300))]

    /// The selection is always one of the supported candidates.
    #[test]
    fn prop_selection_is_supported(candidates in prop::collection::vec(candidate(), 0..8)) {
        let supported = any_of_vendor(0x0c45);
        if let Some(selected) = select_device(candidates.clone(), &supported) {
            prop_assert!(supported(selected.vendor_id, selected.product_id));
            prop_assert!(candidates.contains(&selected));
        } else {
            prop_assert!(!candidates.iter().any(|c| supported(c.vendor_id, c.product_id)));
        }
    }

    /// The selection has the vendor of the first supported candidate and the
    /// smallest path among that vendor's candidates.
    #[test]
    fn prop_first_vendor_smallest_path(candidates in prop::collection::vec(candidate(), 1..8)) {
        let supported = any_of_vendor(0x0c45);
        let first = candidates.iter().find(|c| supported(c.vendor_id, c.product_id));
        let selected = select_device(candidates.clone(), &supported);
        match (first, selected) {
            (Some(first), Some(selected)) => {
                prop_assert_eq!(selected.vendor_id, first.vendor_id);
                let smallest = candidates
                    .iter()
                    .filter(|c| c.vendor_id == first.vendor_id)
                    .map(|c| c.path.clone())
                    .min();
                prop_assert_eq!(Some(selected.path), smallest);
            }
            (None, None) => {}
            (first, selected) => prop_assert!(false, "{first:?} vs {selected:?}"),
        }
    }
}
