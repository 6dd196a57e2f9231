//! Picking and opening the physical device.

use hidapi::HidApi;
use tempersensor_hid::{
    HidDeviceInfo, HidapiTransport, TransportError, TransportResult, discover, find_by_path,
    select_device,
};
use tempersensor_protocol::{REJECTED_DEVICES, is_supported};
use tracing::debug;

/// How a listed device relates to the profile table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    Supported,
    Rejected(&'static str),
}

pub fn support_of(info: &HidDeviceInfo) -> Option<Support> {
    if let Some(rejected) = REJECTED_DEVICES
        .iter()
        .find(|r| info.matches(r.vendor_id, r.product_id))
    {
        return Some(Support::Rejected(rejected.reason));
    }
    is_supported(info.vendor_id, info.product_id).then_some(Support::Supported)
}

/// Every enumerated device with a known VID/PID pair.
pub fn known_devices(api: &HidApi) -> Vec<(HidDeviceInfo, Support)> {
    discover(api)
        .into_iter()
        .filter_map(|info| support_of(&info).map(|support| (info, support)))
        .collect()
}

/// Open the device at `path`, or the automatically selected one.
pub fn open(api: &HidApi, path: Option<&str>) -> TransportResult<HidapiTransport> {
    let candidates = discover(api);
    let info = match path {
        Some(path) => {
            debug!(path, "using explicitly requested device");
            find_by_path(candidates, path)?
        }
        None => select_device(candidates, is_supported).ok_or(TransportError::NotFound)?,
    };
    HidapiTransport::open(api, &info)
}
