//! Device profile table.
//!
//! A [`DeviceProfile`] tells the query engine how many frames a value query
//! returns, which conversion rule applies, and which sensor slot each 2-byte
//! field of each frame feeds.
//!
//! # Lookup
//! The VID/PID pair must match exactly. Within a pair the firmware string is
//! matched by prefix; the compared length is fixed per variant and mirrors
//! what each firmware is known to report (e.g. only `TEMPer1F_V1.3` of
//! `TEMPer1F_V1.3r1F` is compared).
//!
//! | VID:PID     | Firmware prefix (len)   | Frames | Rule     | Layout                       | Default in / out |
//! |-------------|-------------------------|--------|----------|------------------------------|------------------|
//! | `0c45:7401` | `TEMPer1F_V1.3r1F` (13) | 1      | fraction | `[-, et]`                    | et / et          |
//! | `0c45:7401` | `TEMPerF1.4` (10)       | 1      | fraction | `[it, -]`                    | it / it          |
//! | `1130:660c` | any                     | 1      | fraction | `[-, it]`                    | it / it          |
//! | `413d:2107` | `TEMPerGold_V3.1` (15)  | 1      | scaled   | `[it, -]`                    | it / it          |
//! | `413d:2107` | `TEMPerX_V3.1` (12)     | 2      | scaled   | `[it, ih]`, `[et, eh]`       | ih / it          |
//! | `413d:2107` | `TEMPerX_V3.3` (12)     | 1      | scaled   | `[it, ih]`                   | ih / it          |
//! | `1a86:e025` | `TEMPerHUM_V3.9` (14)   | 1      | scaled   | `[it, ih]`                   | ih / it          |
//! | `1a86:5523` | rejected                | -      | -        | -                            | -                |

use core::fmt;

use serde::Serialize;

use crate::commands::{FirmwareString, Frame, SENSOR_OFFSETS, field_at};
use crate::decode::{ConversionRule, decode};
use crate::ids::{
    PRODUCT_TEMPER1, PRODUCT_TEMPERHUM, PRODUCT_TEMPERX, PRODUCT_TEMPERX232,
    PRODUCT_TENX_THERMOMETER, VENDOR_MICRODIA, VENDOR_PCSENSOR, VENDOR_QINHENG, VENDOR_TENX,
};
use crate::readings::SensorSlot::{ExternalHumidity, ExternalTemp, InternalHumidity, InternalTemp};
use crate::readings::{SensorReadings, SensorSlot};

/// Sensor assignment of the two sub-value positions of one response frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameLayout {
    positions: [Option<SensorSlot>; 2],
}

impl FrameLayout {
    pub const fn new(first: Option<SensorSlot>, second: Option<SensorSlot>) -> Self {
        Self {
            positions: [first, second],
        }
    }

    pub fn positions(&self) -> [Option<SensorSlot>; 2] {
        self.positions
    }

    /// `(byte offset, slot)` for every position that carries a sensor.
    pub fn sensors(&self) -> impl Iterator<Item = (usize, SensorSlot)> + '_ {
        SENSOR_OFFSETS
            .iter()
            .zip(self.positions.iter())
            .filter_map(|(offset, slot)| slot.map(|slot| (*offset, slot)))
    }
}

/// Known hardware variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DeviceVariant {
    Temper1FV13,
    TemperF14,
    TenxThermometer,
    TemperGoldV31,
    TemperXV31,
    TemperXV33,
    TemperHumV39,
}

impl DeviceVariant {
    pub fn name(self) -> &'static str {
        match self {
            DeviceVariant::Temper1FV13 => "TEMPer1F_V1.3",
            DeviceVariant::TemperF14 => "TEMPerF1.4",
            DeviceVariant::TenxThermometer => "Tenx Technology, Inc. Foot Pedal/Thermometer",
            DeviceVariant::TemperGoldV31 => "TEMPerGold_V3.1",
            DeviceVariant::TemperXV31 => "TEMPerX_V3.1",
            DeviceVariant::TemperXV33 => "TEMPerX_V3.3",
            DeviceVariant::TemperHumV39 => "TEMPerHUM_V3.9",
        }
    }

    /// Whether the variant has been verified against real hardware.
    pub fn is_tested(self) -> bool {
        matches!(
            self,
            DeviceVariant::Temper1FV13
                | DeviceVariant::TemperF14
                | DeviceVariant::TemperXV33
                | DeviceVariant::TemperHumV39
        )
    }
}

impl fmt::Display for DeviceVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How to talk to one identified device variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceProfile {
    pub variant: DeviceVariant,
    pub conversion_rule: ConversionRule,
    /// One entry per response frame of a value query.
    pub layout: &'static [FrameLayout],
    pub default_in: SensorSlot,
    pub default_out: SensorSlot,
}

impl DeviceProfile {
    /// Number of frames a value query returns.
    pub fn response_count(&self) -> usize {
        self.layout.len()
    }

    /// Replace the conversion rule when an override is given.
    ///
    /// Layout and frame count are never overridden.
    pub fn with_conversion_override(self, rule: Option<ConversionRule>) -> Self {
        Self {
            conversion_rule: rule.unwrap_or(self.conversion_rule),
            ..self
        }
    }

    /// Decode the sensors declared for frame `index` into `readings`.
    ///
    /// Returns the number of slots written. Undeclared positions are skipped.
    pub fn decode_frame(&self, index: usize, frame: &Frame, readings: &mut SensorReadings) -> usize {
        let Some(layout) = self.layout.get(index) else {
            return 0;
        };
        let mut written = 0;
        for (offset, slot) in layout.sensors() {
            if let Some(raw) = field_at(frame, offset) {
                readings.set(slot, decode(raw, self.conversion_rule));
                written += 1;
            }
        }
        written
    }

    /// Every slot this profile can populate, in frame order.
    pub fn declared_slots(&self) -> impl Iterator<Item = SensorSlot> + '_ {
        self.layout.iter().flat_map(|frame| frame.positions().into_iter().flatten())
    }
}

/// Firmware condition of a table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirmwareMatch {
    /// The pair is identified without looking at the firmware.
    Any,
    /// The first `compared` bytes of `reported` must prefix the firmware.
    Prefix {
        reported: &'static str,
        compared: usize,
    },
}

impl FirmwareMatch {
    pub fn matches(&self, firmware: &FirmwareString) -> bool {
        match *self {
            FirmwareMatch::Any => true,
            FirmwareMatch::Prefix { reported, compared } => reported
                .as_bytes()
                .get(..compared)
                .is_some_and(|prefix| firmware.as_bytes().starts_with(prefix)),
        }
    }
}

/// One row of [`PROFILE_TABLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileEntry {
    pub vendor_id: u16,
    pub product_id: u16,
    pub firmware: FirmwareMatch,
    pub profile: DeviceProfile,
}

/// A VID/PID pair that is recognised but cannot be driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectedDevice {
    pub vendor_id: u16,
    pub product_id: u16,
    pub reason: &'static str,
}

const LAYOUT_EXTERNAL_SECOND: &[FrameLayout] = &[FrameLayout::new(None, Some(ExternalTemp))];
const LAYOUT_INTERNAL_FIRST: &[FrameLayout] = &[FrameLayout::new(Some(InternalTemp), None)];
const LAYOUT_INTERNAL_SECOND: &[FrameLayout] = &[FrameLayout::new(None, Some(InternalTemp))];
const LAYOUT_INTERNAL_HUM: &[FrameLayout] =
    &[FrameLayout::new(Some(InternalTemp), Some(InternalHumidity))];
const LAYOUT_INTERNAL_EXTERNAL_HUM: &[FrameLayout] = &[
    FrameLayout::new(Some(InternalTemp), Some(InternalHumidity)),
    FrameLayout::new(Some(ExternalTemp), Some(ExternalHumidity)),
];

/// Known device variants, in lookup order.
pub static PROFILE_TABLE: &[ProfileEntry] = &[
    ProfileEntry {
        vendor_id: VENDOR_MICRODIA,
        product_id: PRODUCT_TEMPER1,
        firmware: FirmwareMatch::Prefix {
            reported: "TEMPer1F_V1.3r1F",
            compared: 13,
        },
        profile: DeviceProfile {
            variant: DeviceVariant::Temper1FV13,
            conversion_rule: ConversionRule::TwosComplementFraction,
            layout: LAYOUT_EXTERNAL_SECOND,
            default_in: ExternalTemp,
            default_out: ExternalTemp,
        },
    },
    ProfileEntry {
        vendor_id: VENDOR_MICRODIA,
        product_id: PRODUCT_TEMPER1,
        firmware: FirmwareMatch::Prefix {
            reported: "TEMPerF1.4",
            compared: 10,
        },
        profile: DeviceProfile {
            variant: DeviceVariant::TemperF14,
            conversion_rule: ConversionRule::TwosComplementFraction,
            layout: LAYOUT_INTERNAL_FIRST,
            default_in: InternalTemp,
            default_out: InternalTemp,
        },
    },
    ProfileEntry {
        vendor_id: VENDOR_TENX,
        product_id: PRODUCT_TENX_THERMOMETER,
        firmware: FirmwareMatch::Any,
        profile: DeviceProfile {
            variant: DeviceVariant::TenxThermometer,
            conversion_rule: ConversionRule::TwosComplementFraction,
            layout: LAYOUT_INTERNAL_SECOND,
            default_in: InternalTemp,
            default_out: InternalTemp,
        },
    },
    ProfileEntry {
        vendor_id: VENDOR_PCSENSOR,
        product_id: PRODUCT_TEMPERX,
        firmware: FirmwareMatch::Prefix {
            reported: "TEMPerGold_V3.1",
            compared: 15,
        },
        profile: DeviceProfile {
            variant: DeviceVariant::TemperGoldV31,
            conversion_rule: ConversionRule::TwosComplementScaled100,
            layout: LAYOUT_INTERNAL_FIRST,
            default_in: InternalTemp,
            default_out: InternalTemp,
        },
    },
    ProfileEntry {
        vendor_id: VENDOR_PCSENSOR,
        product_id: PRODUCT_TEMPERX,
        firmware: FirmwareMatch::Prefix {
            reported: "TEMPerX_V3.1",
            compared: 12,
        },
        profile: DeviceProfile {
            variant: DeviceVariant::TemperXV31,
            conversion_rule: ConversionRule::TwosComplementScaled100,
            layout: LAYOUT_INTERNAL_EXTERNAL_HUM,
            default_in: InternalHumidity,
            default_out: InternalTemp,
        },
    },
    ProfileEntry {
        vendor_id: VENDOR_PCSENSOR,
        product_id: PRODUCT_TEMPERX,
        firmware: FirmwareMatch::Prefix {
            reported: "TEMPerX_V3.3",
            compared: 12,
        },
        profile: DeviceProfile {
            variant: DeviceVariant::TemperXV33,
            conversion_rule: ConversionRule::TwosComplementScaled100,
            layout: LAYOUT_INTERNAL_HUM,
            default_in: InternalHumidity,
            default_out: InternalTemp,
        },
    },
    ProfileEntry {
        vendor_id: VENDOR_QINHENG,
        product_id: PRODUCT_TEMPERHUM,
        firmware: FirmwareMatch::Prefix {
            reported: "TEMPerHUM_V3.9",
            compared: 14,
        },
        profile: DeviceProfile {
            variant: DeviceVariant::TemperHumV39,
            conversion_rule: ConversionRule::TwosComplementScaled100,
            layout: LAYOUT_INTERNAL_HUM,
            default_in: InternalHumidity,
            default_out: InternalTemp,
        },
    },
];

/// Pairs that are recognised but always fail lookup.
pub static REJECTED_DEVICES: &[RejectedDevice] = &[RejectedDevice {
    vendor_id: VENDOR_QINHENG,
    product_id: PRODUCT_TEMPERX232,
    reason: "TEMPerX232 / TEMPerX232_V2.0 uses a serial transport and is unsupported",
}];

/// Why no profile could be selected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// Neither the pair nor the firmware is known.
    #[error("Unknown device {vendor_id:04x}:{product_id:04x} (firmware '{firmware}')")]
    UnknownDevice {
        vendor_id: u16,
        product_id: u16,
        firmware: String,
    },

    /// The pair is known but none of its firmware prefixes matched.
    #[error("Unknown {vendor_id:04x}:{product_id:04x} device (firmware '{firmware}')")]
    UnknownFirmware {
        vendor_id: u16,
        product_id: u16,
        firmware: String,
    },

    /// The pair is known to need a different transport.
    #[error("{reason} ({vendor_id:04x}:{product_id:04x})")]
    Rejected {
        vendor_id: u16,
        product_id: u16,
        reason: &'static str,
    },
}

impl LookupError {
    /// Raw firmware string reported by the device, when it was consulted.
    pub fn firmware(&self) -> Option<&str> {
        match self {
            LookupError::UnknownDevice { firmware, .. }
            | LookupError::UnknownFirmware { firmware, .. } => Some(firmware),
            LookupError::Rejected { .. } => None,
        }
    }
}

/// Select the profile for a device.
pub fn lookup(
    vendor_id: u16,
    product_id: u16,
    firmware: &FirmwareString,
) -> Result<DeviceProfile, LookupError> {
    if let Some(rejected) = REJECTED_DEVICES
        .iter()
        .find(|r| r.vendor_id == vendor_id && r.product_id == product_id)
    {
        return Err(LookupError::Rejected {
            vendor_id,
            product_id,
            reason: rejected.reason,
        });
    }

    let mut pair_known = false;
    for entry in PROFILE_TABLE
        .iter()
        .filter(|e| e.vendor_id == vendor_id && e.product_id == product_id)
    {
        pair_known = true;
        if entry.firmware.matches(firmware) {
            return Ok(entry.profile);
        }
    }

    let firmware = firmware.to_string();
    if pair_known {
        Err(LookupError::UnknownFirmware {
            vendor_id,
            product_id,
            firmware,
        })
    } else {
        Err(LookupError::UnknownDevice {
            vendor_id,
            product_id,
            firmware,
        })
    }
}

/// [`lookup`] followed by an optional conversion rule override.
pub fn lookup_with_override(
    vendor_id: u16,
    product_id: u16,
    firmware: &FirmwareString,
    rule: Option<ConversionRule>,
) -> Result<DeviceProfile, LookupError> {
    lookup(vendor_id, product_id, firmware).map(|p| p.with_conversion_override(rule))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fw(s: &str) -> FirmwareString {
        FirmwareString::from(s)
    }

    #[test]
    fn layout_matches_response_count() {
        for entry in PROFILE_TABLE {
            let profile = entry.profile;
            assert!(profile.response_count() >= 1, "{}", profile.variant);
            for frame in profile.layout {
                assert!(frame.sensors().count() <= 2);
            }
        }
    }

    #[test]
    fn defaults_are_declared_slots() {
        for entry in PROFILE_TABLE {
            let profile = entry.profile;
            let declared: Vec<_> = profile.declared_slots().collect();
            assert!(declared.contains(&profile.default_in), "{}", profile.variant);
            assert!(declared.contains(&profile.default_out), "{}", profile.variant);
        }
    }

    #[test]
    fn temper1f_compares_thirteen_chars() -> Result<(), LookupError> {
        let profile = lookup(VENDOR_MICRODIA, PRODUCT_TEMPER1, &fw("TEMPer1F_V1.3r1F"))?;
        assert_eq!(profile.variant, DeviceVariant::Temper1FV13);
        let profile = lookup(VENDOR_MICRODIA, PRODUCT_TEMPER1, &fw("TEMPer1F_V1.3xxx"))?;
        assert_eq!(profile.variant, DeviceVariant::Temper1FV13);
        assert!(matches!(lookup(VENDOR_MICRODIA, PRODUCT_TEMPER1, &fw("TEMPer1F_V1.")), Err(_)));
        Ok(())
    }

    #[test]
    fn temperx_variants_distinguished() -> Result<(), LookupError> {
        let v31 = lookup(VENDOR_PCSENSOR, PRODUCT_TEMPERX, &fw("TEMPerX_V3.1"))?;
        assert_eq!(v31.variant, DeviceVariant::TemperXV31);
        assert_eq!(v31.response_count(), 2);
        let v33 = lookup(VENDOR_PCSENSOR, PRODUCT_TEMPERX, &fw("TEMPerX_V3.3"))?;
        assert_eq!(v33.variant, DeviceVariant::TemperXV33);
        assert_eq!(v33.response_count(), 1);
        let gold = lookup(VENDOR_PCSENSOR, PRODUCT_TEMPERX, &fw("TEMPerGold_V3.1"))?;
        assert_eq!(gold.variant, DeviceVariant::TemperGoldV31);
        Ok(())
    }

    #[test]
    fn tenx_ignores_firmware() -> Result<(), LookupError> {
        let profile = lookup(VENDOR_TENX, PRODUCT_TENX_THERMOMETER, &fw(""))?;
        assert_eq!(profile.variant, DeviceVariant::TenxThermometer);
        assert!(!profile.variant.is_tested());
        Ok(())
    }

    #[test]
    fn firmware_is_not_checked_across_pairs() {
        let err = lookup(VENDOR_QINHENG, PRODUCT_TEMPERHUM, &fw("TEMPerX_V3.3"));
        assert!(matches!(err, Err(LookupError::UnknownFirmware { .. })));
    }

    #[test]
    fn temperx232_rejected() {
        let err = lookup(VENDOR_QINHENG, PRODUCT_TEMPERX232, &fw("TEMPerX232_V2.0"));
        assert!(
            matches!(err, Err(LookupError::Rejected { reason, .. }) if reason.contains("TEMPerX232"))
        );
    }

    #[test]
    fn unknown_pair_keeps_firmware() {
        let err = lookup(0x1234, 0x5678, &fw("Mystery"));
        assert!(matches!(err, Err(LookupError::UnknownDevice { .. })));
        let err = err.err();
        assert_eq!(err.as_ref().and_then(LookupError::firmware), Some("Mystery"));
        assert_eq!(
            err.map(|e| e.to_string()).as_deref(),
            Some("Unknown device 1234:5678 (firmware 'Mystery')")
        );
    }

    #[test]
    fn override_changes_only_rule() -> Result<(), LookupError> {
        let base = lookup(VENDOR_PCSENSOR, PRODUCT_TEMPERX, &fw("TEMPerX_V3.1"))?;
        let overridden = lookup_with_override(
            VENDOR_PCSENSOR,
            PRODUCT_TEMPERX,
            &fw("TEMPerX_V3.1"),
            Some(ConversionRule::TwosComplementFraction),
        )?;
        assert_eq!(
            overridden.conversion_rule,
            ConversionRule::TwosComplementFraction
        );
        assert_eq!(overridden.layout, base.layout);
        assert_eq!(overridden.response_count(), base.response_count());
        assert_eq!(base.with_conversion_override(None), base);
        Ok(())
    }

    #[test]
    fn decode_frame_writes_declared_slots_only() -> Result<(), LookupError> {
        let profile = lookup(VENDOR_MICRODIA, PRODUCT_TEMPER1, &fw("TEMPer1F_V1.3r1F"))?;
        let mut readings = SensorReadings::new();
        let frame = [0x80, 0x04, 0x1a, 0x1a, 0x1a, 0x10, 0x00, 0x00];
        assert_eq!(profile.decode_frame(0, &frame, &mut readings), 1);
        assert_eq!(readings.get(SensorSlot::ExternalTemp), Some(26.0625));
        assert_eq!(readings.valid_count(), 1);
        assert_eq!(profile.decode_frame(1, &frame, &mut readings), 0);
        Ok(())
    }
}
