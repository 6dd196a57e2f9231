//! Unit conversion, calibration offsets and value formatting.

use tempersensor_engine::Measurement;
use tempersensor_protocol::{SensorSlot, is_valid_reading};

/// Token printed in place of a value that could not be read.
pub const UNKNOWN: &str = "UNKNOWN";

pub fn fahrenheit(celsius: f32) -> f32 {
    celsius * (9.0 / 5.0) + 32.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    In,
    Out,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Calibration {
    pub offset_in: f32,
    pub offset_out: f32,
    /// Report temperature slots in Fahrenheit. Humidity is never converted.
    pub fahrenheit: bool,
    /// Decimal places.
    pub precision: usize,
}

/// Calibrated in/out pair; `None` marks an invalid reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibratedPair {
    pub value_in: Option<f32>,
    pub value_out: Option<f32>,
}

impl Calibration {
    fn offset(&self, side: Side) -> f32 {
        match side {
            Side::In => self.offset_in,
            Side::Out => self.offset_out,
        }
    }

    /// Convert and offset one raw slot value.
    pub fn apply(&self, slot: SensorSlot, raw: f32, side: Side) -> Option<f32> {
        if !is_valid_reading(raw) {
            return None;
        }
        let value = if self.fahrenheit && slot.is_temperature() {
            fahrenheit(raw)
        } else {
            raw
        };
        Some(value + self.offset(side))
    }

    pub fn calibrate(&self, measurement: &Measurement) -> CalibratedPair {
        let selection = measurement.selection;
        let readings = &measurement.readings;
        CalibratedPair {
            value_in: self.apply(
                selection.report_in,
                readings.raw(selection.report_in),
                Side::In,
            ),
            value_out: self.apply(
                selection.report_out,
                readings.raw(selection.report_out),
                Side::Out,
            ),
        }
    }

    pub fn format(&self, value: Option<f32>) -> String {
        value.map_or_else(
            || UNKNOWN.to_string(),
            |v| format!("{v:.precision$}", precision = self.precision),
        )
    }

    /// `value` rounded to the configured precision, for JSON output.
    pub fn rounded(&self, value: Option<f32>) -> Option<f64> {
        value.and_then(|v| self.format(Some(v)).parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempersensor_protocol::INVALID_READING;

    fn close(a: Option<f32>, b: f32) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-4)
    }

    #[test]
    fn fahrenheit_conversion() {
        assert!((fahrenheit(0.0) - 32.0).abs() < 1e-4);
        assert!((fahrenheit(100.0) - 212.0).abs() < 1e-4);
        assert!((fahrenheit(-17.75) - 0.05).abs() < 1e-4);
    }

    #[test]
    fn sentinel_is_never_calibrated() {
        let calibration = Calibration {
            offset_in: 5.0,
            fahrenheit: true,
            ..Calibration::default()
        };
        let value = calibration.apply(SensorSlot::ExternalTemp, INVALID_READING, Side::In);
        assert_eq!(value, None);
        assert_eq!(calibration.format(value), UNKNOWN);
    }

    #[test]
    fn offset_follows_side() {
        let calibration = Calibration {
            offset_in: 1.0,
            offset_out: -2.0,
            ..Calibration::default()
        };
        assert!(close(
            calibration.apply(SensorSlot::InternalTemp, 20.0, Side::In),
            21.0
        ));
        assert!(close(
            calibration.apply(SensorSlot::InternalTemp, 20.0, Side::Out),
            18.0
        ));
    }

    #[test]
    fn fahrenheit_skips_humidity() {
        let calibration = Calibration {
            fahrenheit: true,
            offset_in: 0.5,
            ..Calibration::default()
        };
        assert!(close(
            calibration.apply(SensorSlot::InternalHumidity, 42.0, Side::In),
            42.5
        ));
        assert!(close(
            calibration.apply(SensorSlot::InternalTemp, 20.0, Side::In),
            68.5
        ));
    }

    #[test]
    fn formatting_uses_precision() {
        let mut calibration = Calibration::default();
        assert_eq!(calibration.format(Some(20.0625)), "20");
        calibration.precision = 2;
        assert_eq!(calibration.format(Some(20.0625)), "20.06");
        assert_eq!(calibration.format(Some(-1.0)), "-1.00");
        assert_eq!(calibration.rounded(Some(24.06)), Some(24.06));
        assert_eq!(calibration.rounded(None), None);
    }
}
