//! Logical sensor channels and the per-cycle reading container.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::decode::{INVALID_READING, is_valid_reading};

/// Number of logical sensor channels.
pub const SLOT_COUNT: usize = 4;

/// One logical measurement channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SensorSlot {
    InternalTemp,
    InternalHumidity,
    ExternalTemp,
    ExternalHumidity,
}

impl SensorSlot {
    /// All slots in storage order.
    pub const ALL: [SensorSlot; SLOT_COUNT] = [
        SensorSlot::InternalTemp,
        SensorSlot::InternalHumidity,
        SensorSlot::ExternalTemp,
        SensorSlot::ExternalHumidity,
    ];

    /// Position of this slot in [`SensorReadings::as_array`].
    pub fn index(self) -> usize {
        match self {
            SensorSlot::InternalTemp => 0,
            SensorSlot::InternalHumidity => 1,
            SensorSlot::ExternalTemp => 2,
            SensorSlot::ExternalHumidity => 3,
        }
    }

    /// Short code used on the command line (`it`, `ih`, `et`, `eh`).
    pub fn code(self) -> &'static str {
        match self {
            SensorSlot::InternalTemp => "it",
            SensorSlot::InternalHumidity => "ih",
            SensorSlot::ExternalTemp => "et",
            SensorSlot::ExternalHumidity => "eh",
        }
    }

    pub fn is_temperature(self) -> bool {
        matches!(self, SensorSlot::InternalTemp | SensorSlot::ExternalTemp)
    }

    pub fn is_humidity(self) -> bool {
        !self.is_temperature()
    }
}

impl fmt::Display for SensorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SensorSlot::InternalTemp => "internal temperature",
            SensorSlot::InternalHumidity => "internal humidity",
            SensorSlot::ExternalTemp => "external temperature",
            SensorSlot::ExternalHumidity => "external humidity",
        };
        f.write_str(name)
    }
}

/// Error returned when a sensor code is not one of `it`, `ih`, `et`, `eh`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid sensor '{0}', expected one of it, ih, et, eh")]
pub struct InvalidSensorCode(pub String);

impl FromStr for SensorSlot {
    type Err = InvalidSensorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SensorSlot::ALL
            .into_iter()
            .find(|slot| slot.code() == s)
            .ok_or_else(|| InvalidSensorCode(s.to_string()))
    }
}

/// Values of all four slots for one query cycle.
///
/// Every slot starts out as [`INVALID_READING`]; decoding overwrites only the
/// slots the device profile declares.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReadings {
    values: [f32; SLOT_COUNT],
}

impl SensorReadings {
    /// All slots invalid.
    pub fn new() -> Self {
        Self {
            values: [INVALID_READING; SLOT_COUNT],
        }
    }

    pub fn from_array(values: [f32; SLOT_COUNT]) -> Self {
        Self { values }
    }

    /// Raw slot value, possibly the sentinel.
    pub fn raw(&self, slot: SensorSlot) -> f32 {
        self.values
            .get(slot.index())
            .copied()
            .unwrap_or(INVALID_READING)
    }

    /// Slot value, or `None` for the sentinel.
    pub fn get(&self, slot: SensorSlot) -> Option<f32> {
        Some(self.raw(slot)).filter(|v| is_valid_reading(*v))
    }

    pub fn set(&mut self, slot: SensorSlot, value: f32) {
        if let Some(entry) = self.values.get_mut(slot.index()) {
            *entry = value;
        }
    }

    pub fn as_array(&self) -> [f32; SLOT_COUNT] {
        self.values
    }

    /// Number of slots holding a real measurement.
    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| is_valid_reading(**v)).count()
    }
}

impl Default for SensorReadings {
    fn default() -> Self {
        Self::new()
    }
}
