//! USB vendor and product IDs of the TEMPer thermometer family.
//!
//! TEMPer sticks are sold by RDing / PCsensor under several USB identities.
//! The same VID/PID pair is reused across hardware generations, so the
//! firmware string reported by the device (see [`crate::profile`]) is what
//! finally decides how a response is decoded.
//!
//! ## Verification status
//!
//! | VID:PID     | Firmware reports        | Status            |
//! |-------------|-------------------------|-------------------|
//! | `0c45:7401` | `TEMPer1F_V1.3r1F`      | tested            |
//! | `0c45:7401` | `TEMPerF1.4`            | partially tested  |
//! | `1130:660c` | (not checked)           | untested          |
//! | `413d:2107` | `TEMPerGold_V3.1`       | untested          |
//! | `413d:2107` | `TEMPerX_V3.1`          | untested          |
//! | `413d:2107` | `TEMPerX_V3.3`          | tested            |
//! | `1a86:e025` | `TEMPerHUM_V3.9`        | community reports |
//! | `1a86:5523` | `TEMPerX232_V2.0`       | rejected          |

/// Microdia vendor ID, used by the classic TEMPer1F sticks.
pub const VENDOR_MICRODIA: u16 = 0x0C45;

/// TEMPer / TEMPer1F product ID under [`VENDOR_MICRODIA`].
pub const PRODUCT_TEMPER1: u16 = 0x7401;

/// Tenx Technology vendor ID ("Foot Pedal/Thermometer").
pub const VENDOR_TENX: u16 = 0x1130;

/// Tenx thermometer product ID under [`VENDOR_TENX`].
pub const PRODUCT_TENX_THERMOMETER: u16 = 0x660C;

/// Vendor ID used by the newer TEMPerGold / TEMPerX / TEMPerHUM range.
pub const VENDOR_PCSENSOR: u16 = 0x413D;

/// TEMPerGold / TEMPerX product ID under [`VENDOR_PCSENSOR`].
pub const PRODUCT_TEMPERX: u16 = 0x2107;

/// QinHeng (WCH) vendor ID, used by USB-serial based and later HUM models.
pub const VENDOR_QINHENG: u16 = 0x1A86;

/// TEMPerHUM V3.9 product ID under [`VENDOR_QINHENG`].
pub const PRODUCT_TEMPERHUM: u16 = 0xE025;

/// TEMPerX232 product ID under [`VENDOR_QINHENG`].
///
/// This model talks over a serial bridge instead of 8-byte HID frames and is
/// rejected by the profile table.
pub const PRODUCT_TEMPERX232: u16 = 0x5523;

/// Every VID/PID pair discovery is allowed to pick.
///
/// The TEMPerX232 is listed on purpose: selecting it lets the profile table
/// report a precise rejection instead of "no supported device found".
pub const SUPPORTED_IDS: &[(u16, u16)] = &[
    (VENDOR_TENX, PRODUCT_TENX_THERMOMETER),
    (VENDOR_MICRODIA, PRODUCT_TEMPER1),
    (VENDOR_PCSENSOR, PRODUCT_TEMPERX),
    (VENDOR_QINHENG, PRODUCT_TEMPERX232),
    (VENDOR_QINHENG, PRODUCT_TEMPERHUM),
];

/// Returns `true` if the VID/PID pair is one discovery should consider.
pub fn is_supported(vid: u16, pid: u16) -> bool {
    SUPPORTED_IDS.contains(&(vid, pid))
}

/// Marketing name for a known VID/PID pair, or `None`.
pub fn product_name(vid: u16, pid: u16) -> Option<&'static str> {
    match (vid, pid) {
        (VENDOR_MICRODIA, PRODUCT_TEMPER1) => Some("TEMPer / TEMPer1F"),
        (VENDOR_TENX, PRODUCT_TENX_THERMOMETER) => Some("Tenx Foot Pedal/Thermometer"),
        (VENDOR_PCSENSOR, PRODUCT_TEMPERX) => Some("TEMPerGold / TEMPerX / TEMPerHUM"),
        (VENDOR_QINHENG, PRODUCT_TEMPERHUM) => Some("TEMPerHUM"),
        (VENDOR_QINHENG, PRODUCT_TEMPERX232) => Some("TEMPerX232"),
        _ => None,
    }
}
