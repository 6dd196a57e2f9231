//! Raw sensor field decoding.
//!
//! A sensor sub-value is a 2-byte big-endian field with the sign in bit 15.
//! Two encodings are in the wild:
//!
//! | Rule                        | Method | Encoding                                     |
//! |-----------------------------|--------|----------------------------------------------|
//! | [`ConversionRule::TwosComplementFraction`]  | 1 | 12-bit two's complement, 4 fraction bits, low nibble of byte 2 is an error flag |
//! | [`ConversionRule::TwosComplementScaled100`] | 2 | 16-bit two's complement, value × 100 |
//!
//! The two's complement is resolved by hand (subtract one, invert, negate)
//! so the result never depends on the host's signed integer layout.
//!
//! # Reference fixtures
//! - `1a 10` (fraction) → 26.0625
//! - `fe f0` (fraction) → -1.0625
//! - `09 66` (scaled)   → 24.06
//! - `f6 9a` (scaled)   → -24.06

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sentinel stored in a sensor slot that holds no valid reading.
pub const INVALID_READING: f32 = -999.0;

/// Returns `true` if `value` is a real measurement rather than the sentinel.
pub fn is_valid_reading(value: f32) -> bool {
    value > INVALID_READING
}

/// Numeric encoding of a raw 2-byte sensor field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConversionRule {
    /// Fixed point, 12 significant bits of which 4 are fraction.
    TwosComplementFraction,
    /// Plain 16-bit integer scaled by 100.
    TwosComplementScaled100,
}

impl ConversionRule {
    /// Map the numeric method code used on the command line (1 or 2).
    pub fn from_method(method: u8) -> Option<Self> {
        match method {
            1 => Some(Self::TwosComplementFraction),
            2 => Some(Self::TwosComplementScaled100),
            _ => None,
        }
    }

    /// Numeric method code of this rule.
    pub fn method(self) -> u8 {
        match self {
            Self::TwosComplementFraction => 1,
            Self::TwosComplementScaled100 => 2,
        }
    }

    /// Decode one raw field with this rule.
    pub fn decode(self, raw: [u8; 2]) -> f32 {
        decode(raw, self)
    }
}

impl fmt::Display for ConversionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TwosComplementFraction => f.write_str("two's complement with 4 fraction bits"),
            Self::TwosComplementScaled100 => f.write_str("two's complement scaled by 100"),
        }
    }
}

/// Error returned when a conversion method code is not 1 or 2.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid conversion method '{0}', expected 1 or 2")]
pub struct InvalidConversionMethod(pub String);

impl FromStr for ConversionRule {
    type Err = InvalidConversionMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(Self::from_method)
            .ok_or_else(|| InvalidConversionMethod(s.to_string()))
    }
}

/// Decode a raw big-endian field into a calibrated value.
///
/// Returns [`INVALID_READING`] when the device flagged the field as invalid.
pub fn decode(raw: [u8; 2], rule: ConversionRule) -> f32 {
    let [hi, lo] = raw;
    let field = u16::from_be_bytes(raw);
    let negative = hi & 0x80 != 0;

    match rule {
        ConversionRule::TwosComplementFraction => {
            // Unused fraction bits double as the error flag.
            if lo & 0x0F != 0 {
                return INVALID_READING;
            }
            let shifted = field >> 4;
            if negative {
                -f32::from(shifted.wrapping_sub(1) ^ 0x0FFF) / 16.0
            } else {
                f32::from(shifted) / 16.0
            }
        }
        ConversionRule::TwosComplementScaled100 => {
            if negative {
                -f32::from(field.wrapping_sub(1) ^ 0xFFFF) / 100.0
            } else {
                f32::from(field) / 100.0
            }
        }
    }
}

/// Decode using a numeric method code; unknown codes yield [`INVALID_READING`].
pub fn decode_method(raw: [u8; 2], method: u8) -> f32 {
    ConversionRule::from_method(method).map_or(INVALID_READING, |rule| decode(raw, rule))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn fraction_fixtures() {
        let cases: &[([u8; 2], f32)] = &[
            ([0x1a, 0x10], 26.0625),
            ([0x14, 0x10], 20.0625),
            ([0x14, 0xd0], 20.8125),
            ([0x01, 0x60], 1.375),
            ([0x00, 0x60], 0.375),
            ([0x00, 0x10], 0.0625),
            ([0x00, 0x00], 0.0),
            ([0xff, 0xf0], -0.0625),
            ([0xff, 0x40], -0.75),
            ([0xff, 0x00], -1.0),
            ([0xfe, 0xf0], -1.0625),
            ([0xfe, 0x00], -2.0),
            ([0xfd, 0xf0], -2.0625),
            ([0x1a, 0x90], 26.5625),
        ];
        for (raw, want) in cases {
            let got = decode(*raw, ConversionRule::TwosComplementFraction);
            assert!(close(got, *want), "{raw:02x?}: got {got}, want {want}");
        }
    }

    #[test]
    fn fraction_uses_all_twelve_bits() {
        // 0x1a1 sixteenths, the high byte is not a whole-degree count on its own
        let got = decode([0x1a, 0x10], ConversionRule::TwosComplementFraction);
        assert!(close(got, 417.0 / 16.0));
        assert!(!close(got, 20.0625));
    }

    #[test]
    fn fraction_error_flag_yields_sentinel() {
        let got = decode([0xff, 0xff], ConversionRule::TwosComplementFraction);
        assert!(close(got, INVALID_READING));
        let got = decode([0x1a, 0x11], ConversionRule::TwosComplementFraction);
        assert!(close(got, INVALID_READING));
    }

    #[test]
    fn fraction_extremes() {
        let min = decode([0x80, 0x00], ConversionRule::TwosComplementFraction);
        assert!(close(min, -128.0));
        let max = decode([0x7f, 0xf0], ConversionRule::TwosComplementFraction);
        assert!(close(max, 127.9375));
    }

    #[test]
    fn scaled_fixtures() {
        let cases: &[([u8; 2], f32)] = &[
            ([0x09, 0x66], 24.06),
            ([0xf6, 0x9a], -24.06),
            ([0x05, 0x90], 14.24),
            ([0xfa, 0x70], -14.24),
            ([0x80, 0x00], -327.68),
            ([0x7f, 0xff], 327.67),
        ];
        for (raw, want) in cases {
            let got = decode(*raw, ConversionRule::TwosComplementScaled100);
            assert!(close(got, *want), "{raw:02x?}: got {got}, want {want}");
        }
    }

    #[test]
    fn scaled_ignores_low_nibble() {
        // 0x0963 = 2403, a valid humidity-style reading
        let got = decode([0x09, 0x63], ConversionRule::TwosComplementScaled100);
        assert!(close(got, 24.03));
    }

    #[test]
    fn method_codes() {
        assert_eq!(
            ConversionRule::from_method(1),
            Some(ConversionRule::TwosComplementFraction)
        );
        assert_eq!(
            ConversionRule::from_method(2),
            Some(ConversionRule::TwosComplementScaled100)
        );
        assert_eq!(ConversionRule::from_method(0), None);
        assert_eq!(ConversionRule::from_method(3), None);
        assert_eq!(ConversionRule::TwosComplementScaled100.method(), 2);
    }

    #[test]
    fn unknown_method_yields_sentinel() {
        assert!(close(decode_method([0x09, 0x66], 7), INVALID_READING));
        assert!(close(decode_method([0x09, 0x66], 2), 24.06));
    }

    #[test]
    fn parse_from_str() {
        assert_eq!(
            "1".parse::<ConversionRule>(),
            Ok(ConversionRule::TwosComplementFraction)
        );
        assert_eq!(
            " 2 ".parse::<ConversionRule>(),
            Ok(ConversionRule::TwosComplementScaled100)
        );
        assert!(matches!("3".parse::<ConversionRule>(), Err(_)));
        assert!(matches!("two".parse::<ConversionRule>(), Err(_)));
    }

    #[test]
    fn sentinel_is_not_valid() {
        assert!(!is_valid_reading(INVALID_READING));
        assert!(is_valid_reading(-998.5));
        assert!(is_valid_reading(0.0));
    }
}
