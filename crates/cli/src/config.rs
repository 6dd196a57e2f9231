//! Runtime options assembled from the command line.

use tempersensor_engine::{SensorSelection, SessionConfig};
use tempersensor_protocol::ConversionRule;

use crate::Cli;
use crate::calibration::Calibration;
use crate::error::CliError;

/// Crates whose log output `-d` controls.
const LOG_TARGETS: [&str; 4] = [
    "tempersensor",
    "tempersensor_engine",
    "tempersensor_hid",
    "tempersensor_protocol",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Mrtg,
    Json,
}

/// Everything a run needs, decided once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeOptions {
    pub calibration: Calibration,
    pub conversion_override: Option<ConversionRule>,
    pub selection: SensorSelection,
    pub device_path: Option<String>,
    pub format: OutputFormat,
    pub verbosity: u8,
}

impl RuntimeOptions {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            conversion_override: self.conversion_override,
            selection: self.selection,
            ..SessionConfig::default()
        }
    }
}

impl From<&Cli> for RuntimeOptions {
    fn from(cli: &Cli) -> Self {
        Self {
            calibration: Calibration {
                offset_in: cli.calibration_in.unwrap_or(0.0),
                offset_out: cli.calibration_out.unwrap_or(0.0),
                fahrenheit: cli.fahrenheit,
                precision: cli.precision,
            },
            conversion_override: cli.conversion_method,
            selection: SensorSelection::new(cli.report_in, cli.report_out),
            device_path: cli.device.clone(),
            format: if cli.json {
                OutputFormat::Json
            } else {
                OutputFormat::Mrtg
            },
            verbosity: cli.debug,
        }
    }
}

/// Parse a calibration offset such as `-1.5`.
///
/// A decimal comma is rejected outright rather than silently truncated.
pub fn parse_calibration(value: &str) -> Result<f32, CliError> {
    if value.contains(',') {
        return Err(CliError::CalibrationComma(value.to_string()));
    }
    value
        .trim()
        .parse::<f32>()
        .map_err(|e| CliError::NotAFloat {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Default `EnvFilter` directive for a `-d` count.
pub fn log_directive(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calibration_accepts_signed_floats() -> Result<(), CliError> {
        assert!((parse_calibration("-1.5")? + 1.5).abs() < f32::EPSILON);
        assert!((parse_calibration("2")? - 2.0).abs() < f32::EPSILON);
        assert!((parse_calibration(" 0.25 ")? - 0.25).abs() < f32::EPSILON);
        Ok(())
    }

    #[test]
    fn calibration_rejects_decimal_comma() {
        assert_eq!(
            parse_calibration("1,5"),
            Err(CliError::CalibrationComma("1,5".to_string()))
        );
    }

    #[test]
    fn calibration_rejects_garbage() {
        assert!(matches!(
            parse_calibration("warm"),
            Err(CliError::NotAFloat { .. })
        ));
    }

    #[test]
    fn log_directive_levels() {
        assert!(log_directive(0).starts_with("tempersensor=warn,"));
        assert!(log_directive(1).contains("tempersensor_hid=debug"));
        assert!(log_directive(5).ends_with("tempersensor_protocol=trace"));
    }
}
