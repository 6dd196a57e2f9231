//! Built-in decoder self-test (`--test`).
//!
//! Decodes a table of captured value frames and compares them with the
//! temperature the device displayed at the time.

use std::io::{self, Write};

use tempersensor_protocol::{
    ConversionRule, Frame, INVALID_READING, decode, field_at, is_valid_reading,
};

use crate::calibration::fahrenheit;

const TOLERANCE: f32 = 1e-4;

/// One captured frame and the value it must decode to.
#[derive(Debug, Clone, Copy)]
pub struct Fixture {
    pub frame: Frame,
    pub offset: usize,
    pub rule: ConversionRule,
    pub fahrenheit: bool,
    pub expected: f32,
}

const FRACTION: ConversionRule = ConversionRule::TwosComplementFraction;
const SCALED: ConversionRule = ConversionRule::TwosComplementScaled100;

const fn celsius(frame: Frame, offset: usize, rule: ConversionRule, expected: f32) -> Fixture {
    Fixture {
        frame,
        offset,
        rule,
        fahrenheit: false,
        expected,
    }
}

const fn in_fahrenheit(frame: Frame, expected: f32) -> Fixture {
    Fixture {
        frame,
        offset: 4,
        rule: FRACTION,
        fahrenheit: true,
        expected,
    }
}

pub const FIXTURES: &[Fixture] = &[
    celsius([0x80, 0x04, 0x00, 0x00, 0xff, 0xff, 0x00, 0x00], 4, FRACTION, INVALID_READING),
    celsius([0x80, 0x04, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00], 2, FRACTION, INVALID_READING),
    celsius([0x80, 0x04, 0x1a, 0x1a, 0x1a, 0x10, 0x00, 0x00], 4, FRACTION, 26.0625),
    celsius([0x80, 0x04, 0x14, 0x14, 0x14, 0xd0, 0x00, 0x00], 4, FRACTION, 20.8125),
    celsius([0x80, 0x04, 0x01, 0x01, 0x01, 0x60, 0x00, 0x00], 4, FRACTION, 1.375),
    celsius([0x80, 0x04, 0x00, 0x00, 0x00, 0x60, 0x00, 0x00], 4, FRACTION, 0.375),
    celsius([0x80, 0x04, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00], 4, FRACTION, 0.0625),
    celsius([0x80, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], 4, FRACTION, 0.0),
    celsius([0x80, 0x04, 0x00, 0x00, 0xff, 0xf0, 0x00, 0x00], 4, FRACTION, -0.0625),
    celsius([0x80, 0x04, 0xff, 0xff, 0xff, 0x40, 0x00, 0x00], 4, FRACTION, -0.75),
    celsius([0x80, 0x04, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00], 4, FRACTION, -1.0),
    celsius([0x80, 0x04, 0xfe, 0xfe, 0xfe, 0xf0, 0x00, 0x00], 4, FRACTION, -1.0625),
    celsius([0x80, 0x04, 0xfe, 0xfe, 0xfe, 0x00, 0x00, 0x00], 4, FRACTION, -2.0),
    celsius([0x80, 0x04, 0xfd, 0xfd, 0xfd, 0xf0, 0x00, 0x00], 4, FRACTION, -2.0625),
    celsius([0x80, 0x04, 0xfe, 0xfe, 0x01, 0x00, 0x00, 0x00], 4, FRACTION, 1.0),
    celsius([0x80, 0x04, 0xfe, 0xfe, 0x00, 0x00, 0x00, 0x00], 4, FRACTION, 0.0),
    celsius([0x80, 0x04, 0xfe, 0xfe, 0xff, 0x00, 0x00, 0x00], 4, FRACTION, -1.0),
    celsius([0x80, 0x04, 0xfe, 0xfe, 0xfe, 0x00, 0x00, 0x00], 4, FRACTION, -2.0),
    celsius([0x80, 0x04, 0xfe, 0xfe, 0xfd, 0x00, 0x00, 0x00], 4, FRACTION, -3.0),
    in_fahrenheit([0x80, 0x04, 0xee, 0xee, 0xee, 0x40, 0x00, 0x00], 0.05),
    in_fahrenheit([0x80, 0x04, 0xee, 0xee, 0xee, 0x30, 0x00, 0x00], -0.0625),
    in_fahrenheit([0x80, 0x04, 0xfe, 0xfe, 0x00, 0x00, 0x00, 0x00], 32.0),
    in_fahrenheit([0x80, 0x04, 0x23, 0x23, 0x23, 0x90, 0x00, 0x00], 96.0125),
    // TEMPerF1.4
    celsius([0x80, 0x02, 0x1a, 0x90, 0x65, 0x72, 0x46, 0x31], 2, FRACTION, 26.5625),
    // TEMPerX_V3.3
    celsius([0x80, 0x04, 0x09, 0x66, 0x00, 0x00, 0x00, 0x00], 2, SCALED, 24.06),
    celsius([0x80, 0x04, 0xf6, 0x9a, 0x00, 0x00, 0x00, 0x00], 2, SCALED, -24.06),
    celsius([0x80, 0x04, 0x05, 0x90, 0x00, 0x00, 0x00, 0x00], 2, SCALED, 14.24),
    celsius([0x80, 0x04, 0xfa, 0x70, 0x00, 0x00, 0x00, 0x00], 2, SCALED, -14.24),
];

impl Fixture {
    pub fn evaluate(&self) -> f32 {
        let value = field_at(&self.frame, self.offset)
            .map_or(INVALID_READING, |raw| decode(raw, self.rule));
        if self.fahrenheit && is_valid_reading(value) {
            fahrenheit(value)
        } else {
            value
        }
    }

    pub fn passes(&self) -> bool {
        (self.evaluate() - self.expected).abs() < TOLERANCE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelfTestReport {
    pub passed: usize,
    pub failed: usize,
}

impl SelfTestReport {
    pub fn total(&self) -> usize {
        self.passed.saturating_add(self.failed)
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Evaluate every fixture, writing one line per fixture to `out`.
pub fn run(out: &mut impl Write) -> io::Result<SelfTestReport> {
    let mut report = SelfTestReport {
        passed: 0,
        failed: 0,
    };
    for fixture in FIXTURES {
        let temp = fixture.evaluate();
        let expected = if is_valid_reading(fixture.expected) {
            format!("{:.4}", fixture.expected)
        } else {
            format!("error ({INVALID_READING:.2})")
        };
        let verdict = if fixture.passes() {
            report.passed = report.passed.saturating_add(1);
            "ok"
        } else {
            report.failed = report.failed.saturating_add(1);
            "FAILED"
        };
        writeln!(out, "temp: {temp:.4} / expected: {expected} {verdict}")?;
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_fixture_passes() {
        for fixture in FIXTURES {
            assert!(
                fixture.passes(),
                "{:02x?} decoded to {}, expected {}",
                fixture.frame,
                fixture.evaluate(),
                fixture.expected
            );
        }
    }

    #[test]
    fn run_reports_all_fixtures() -> io::Result<()> {
        let mut out = Vec::new();
        let report = run(&mut out)?;
        assert!(report.is_success());
        assert_eq!(report.total(), FIXTURES.len());
        let text = String::from_utf8_lossy(&out);
        assert_eq!(text.lines().count(), FIXTURES.len());
        assert!(text.contains("temp: 26.0625 / expected: 26.0625 ok"));
        assert!(text.contains("expected: error (-999.00)"));
        Ok(())
    }
}
