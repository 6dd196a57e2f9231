//! Candidate discovery and selection.
//!
//! Discovery only lists what `hidapi` reports; choosing which candidate to
//! talk to is a pure function over that list so it can be tested without
//! hardware.

use hidapi::HidApi;
use tracing::{debug, info};

use crate::{HidDeviceInfo, TransportError, TransportResult};

/// Initialise `hidapi`.
pub fn open_api() -> TransportResult<HidApi> {
    HidApi::new().map_err(|e| TransportError::Enumeration(e.to_string()))
}

/// Every HID device the host currently reports.
pub fn discover(api: &HidApi) -> Vec<HidDeviceInfo> {
    let devices: Vec<_> = api.device_list().map(HidDeviceInfo::from_hidapi).collect();
    debug!(count = devices.len(), "enumerated HID devices");
    devices
}

/// Pick the device to use from `candidates`.
///
/// The first supported candidate fixes the vendor. Later candidates of the
/// same vendor replace the selection when their path sorts lower; other
/// vendors are ignored. The tie-break is a legacy convention, not a
/// property of the hardware.
///
/// Other TEMPer tools keep the lexically *larger* path instead. Neither rule
/// knows which interface carries the sensor: a `0c45:7401` stick exposes two
/// hidraw nodes and the lower one is usually its keyboard interface. Pass an
/// explicit path (`--device`) in that case; `interface_number` is recorded on
/// every candidate if a smarter hint is ever needed.
pub fn select_device<I, F>(candidates: I, is_supported: F) -> Option<HidDeviceInfo>
where
    I: IntoIterator<Item = HidDeviceInfo>,
    F: Fn(u16, u16) -> bool,
{
    let mut selected: Option<HidDeviceInfo> = None;
    for candidate in candidates {
        if !is_supported(candidate.vendor_id, candidate.product_id) {
            continue;
        }
        let replace = match &selected {
            None => true,
            Some(current) if current.vendor_id != candidate.vendor_id => {
                debug!(
                    path = %candidate.path,
                    device = %candidate.id_string(),
                    "ignoring candidate from another vendor"
                );
                false
            }
            Some(current) => candidate.path < current.path,
        };
        if replace {
            debug!(path = %candidate.path, device = %candidate.id_string(), "candidate");
            selected = Some(candidate);
        }
    }
    if let Some(device) = &selected {
        info!(path = %device.path, device = %device.id_string(), "selected device");
    }
    selected
}

/// Candidate at exactly `path`, supported or not.
pub fn find_by_path<I>(candidates: I, path: &str) -> TransportResult<HidDeviceInfo>
where
    I: IntoIterator<Item = HidDeviceInfo>,
{
    candidates
        .into_iter()
        .find(|c| c.path == path)
        .ok_or_else(|| TransportError::Open {
            path: path.to_string(),
            reason: "no HID device at this path".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dev(vid: u16, pid: u16, path: &str) -> HidDeviceInfo {
        HidDeviceInfo::new(vid, pid, path)
    }

    fn temper_only(vid: u16, pid: u16) -> bool {
        tempersensor_protocol::is_supported(vid, pid)
    }

    #[test]
    fn given_no_supported_devices_when_selecting_then_none() {
        let candidates = vec![dev(0x046d, 0xc52b, "/dev/hidraw0")];
        assert_eq!(select_device(candidates, temper_only), None);
    }

    #[test]
    fn given_single_supported_device_when_selecting_then_it_is_chosen() {
        let candidates = vec![
            dev(0x046d, 0xc52b, "/dev/hidraw0"),
            dev(0x0c45, 0x7401, "/dev/hidraw1"),
        ];
        let selected = select_device(candidates, temper_only);
        assert_eq!(selected.map(|d| d.path), Some("/dev/hidraw1".to_string()));
    }

    #[test]
    fn given_same_vendor_twice_when_selecting_then_smallest_path_wins() {
        let candidates = vec![
            dev(0x0c45, 0x7401, "/dev/hidraw5"),
            dev(0x0c45, 0x7401, "/dev/hidraw2"),
            dev(0x0c45, 0x7401, "/dev/hidraw4"),
        ];
        let selected = select_device(candidates, temper_only);
        assert_eq!(selected.map(|d| d.path), Some("/dev/hidraw2".to_string()));
    }

    #[test]
    fn given_two_interfaces_of_one_stick_when_selecting_then_lower_path_wins() {
        let candidates = vec![
            dev(0x0c45, 0x7401, "/dev/hidraw3").with_interface(1),
            dev(0x0c45, 0x7401, "/dev/hidraw2").with_interface(0),
        ];
        let selected = select_device(candidates, temper_only);
        assert_eq!(
            selected.map(|d| (d.path, d.interface_number)),
            Some(("/dev/hidraw2".to_string(), Some(0)))
        );
    }

    #[test]
    fn given_other_vendor_later_when_selecting_then_first_vendor_kept() {
        let candidates = vec![
            dev(0x413d, 0x2107, "/dev/hidraw7"),
            dev(0x0c45, 0x7401, "/dev/hidraw1"),
        ];
        let selected = select_device(candidates, temper_only);
        assert_eq!(selected.map(|d| d.vendor_id), Some(0x413d));
    }

    #[test]
    fn given_rejected_pair_when_selecting_then_it_is_still_chosen() {
        let candidates = vec![dev(0x1a86, 0x5523, "/dev/hidraw0")];
        assert!(select_device(candidates, temper_only).is_some());
    }

    #[test]
    fn given_explicit_path_when_finding_then_exact_match_required() {
        let candidates = vec![
            dev(0x0c45, 0x7401, "/dev/hidraw1"),
            dev(0x0c45, 0x7401, "/dev/hidraw10"),
        ];
        let found = find_by_path(candidates.clone(), "/dev/hidraw10");
        assert_eq!(found.map(|d| d.path), Ok("/dev/hidraw10".to_string()));
        assert!(matches!(
            find_by_path(candidates, "/dev/hidraw9"),
            Err(TransportError::Open { .. })
        ));
    }
}
