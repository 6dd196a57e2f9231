//! In/out sensor selection.

use tempersensor_protocol::{DeviceProfile, SensorSlot};

/// Caller's choice of which slots feed the "in" and "out" values.
///
/// Unset sides fall back to the identified profile's defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorSelection {
    pub report_in: Option<SensorSlot>,
    pub report_out: Option<SensorSlot>,
}

/// A selection with both sides decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSelection {
    pub report_in: SensorSlot,
    pub report_out: SensorSlot,
}

impl SensorSelection {
    pub fn new(report_in: Option<SensorSlot>, report_out: Option<SensorSlot>) -> Self {
        Self {
            report_in,
            report_out,
        }
    }

    /// Fill unset sides from `profile`; explicit choices are kept.
    pub fn fill_defaults(&mut self, profile: &DeviceProfile) {
        self.report_in.get_or_insert(profile.default_in);
        self.report_out.get_or_insert(profile.default_out);
    }

    pub fn resolve(&self, profile: &DeviceProfile) -> ResolvedSelection {
        ResolvedSelection {
            report_in: self.report_in.unwrap_or(profile.default_in),
            report_out: self.report_out.unwrap_or(profile.default_out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempersensor_protocol::{FirmwareString, LookupError, lookup};

    #[test]
    fn defaults_fill_only_unset_sides() -> Result<(), LookupError> {
        let profile = lookup(0x413d, 0x2107, &FirmwareString::from("TEMPerX_V3.1"))?;
        let mut selection = SensorSelection::new(Some(SensorSlot::ExternalTemp), None);
        selection.fill_defaults(&profile);
        assert_eq!(selection.report_in, Some(SensorSlot::ExternalTemp));
        assert_eq!(selection.report_out, Some(SensorSlot::InternalTemp));
        Ok(())
    }

    #[test]
    fn resolve_uses_profile_defaults() -> Result<(), LookupError> {
        let profile = lookup(0x0c45, 0x7401, &FirmwareString::from("TEMPer1F_V1.3r1F"))?;
        let resolved = SensorSelection::default().resolve(&profile);
        assert_eq!(resolved.report_in, SensorSlot::ExternalTemp);
        assert_eq!(resolved.report_out, SensorSlot::ExternalTemp);
        Ok(())
    }
}
