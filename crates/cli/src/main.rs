//! tempersensor - TEMPer USB thermometer reader for MRTG
//!
//! Reads one set of values from a TEMPer stick and prints them in the
//! four-line format MRTG expects from an external script.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod calibration;
mod config;
mod device;
mod error;
mod mrtg;
mod output;
mod selftest;

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tempersensor_engine::{Measurement, SensorError, measure};
use tempersensor_hid::{TransportError, open_api};
use tempersensor_protocol::{ConversionRule, SensorSlot};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{OutputFormat, RuntimeOptions};
use crate::error::CliError;
use crate::mrtg::MrtgReport;

#[derive(Parser, Debug)]
#[command(name = "tempersensor")]
#[command(about = "Read temperature and humidity from TEMPer USB sticks in MRTG format")]
#[command(version)]
#[command(long_about = "
tempersensor queries a TEMPer USB thermometer and prints four lines for MRTG:
the \"in\" value, the \"out\" value, the host uptime and the program signature.
Values that cannot be read are printed as UNKNOWN.

Sensor codes for --report-in/--report-out:
  it  internal temperature     ih  internal humidity
  et  external temperature     eh  external humidity
")]
struct Cli {
    /// Offset added to the IN value
    #[arg(
        long,
        value_name = "[-]N.N",
        value_parser = config::parse_calibration,
        allow_negative_numbers = true
    )]
    calibration_in: Option<f32>,

    /// Offset added to the OUT value
    #[arg(
        long,
        value_name = "[-]N.N",
        value_parser = config::parse_calibration,
        allow_negative_numbers = true
    )]
    calibration_out: Option<f32>,

    /// Force the value conversion method (1 or 2) instead of the detected one
    #[arg(long, value_name = "METHOD")]
    conversion_method: Option<ConversionRule>,

    /// Debug output on stderr, repeat for more detail
    #[arg(short, long, action = clap::ArgAction::Count)]
    debug: u8,

    /// Report temperatures in Fahrenheit
    #[arg(short, long)]
    fahrenheit: bool,

    /// Number of decimal places
    #[arg(short, long, default_value_t = 0, value_name = "LEN")]
    precision: usize,

    /// Sensor reported as IN (it, ih, et, eh)
    #[arg(long, value_name = "SENSOR")]
    report_in: Option<SensorSlot>,

    /// Sensor reported as OUT (it, ih, et, eh)
    #[arg(long, value_name = "SENSOR")]
    report_out: Option<SensorSlot>,

    /// Run the built-in decoder self-test and exit
    #[arg(short, long)]
    test: bool,

    /// Use the HID device at this path instead of auto-selecting one
    #[arg(long, env = "TEMPERSENSOR_DEVICE", value_name = "PATH")]
    device: Option<String>,

    /// List connected TEMPer devices and exit
    #[arg(long, conflicts_with = "test")]
    list_devices: bool,

    /// Output in JSON format for machine parsing
    #[arg(long)]
    json: bool,
}

fn init_logging(verbosity: u8) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config::log_directive(verbosity).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);
    let options = RuntimeOptions::from(&cli);

    let result = if cli.test {
        run_self_test()
    } else if cli.list_devices {
        list_devices(&options)
    } else {
        run_measurement(&options)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => ExitCode::from(exit_code(&e)),
    }
}

fn exit_code(error: &anyhow::Error) -> u8 {
    if let Some(TransportError::NotFound) = error.downcast_ref::<TransportError>() {
        return 2;
    }
    match error.downcast_ref::<SensorError>() {
        Some(SensorError::Unsupported(_)) => return 3,
        Some(_) => return 1,
        None => {}
    }
    match error.downcast_ref::<CliError>() {
        Some(CliError::SelfTestFailed { .. }) => 4,
        _ => 1,
    }
}

fn report_error(error: &anyhow::Error, json: bool) {
    if json {
        output::print_error_json(error);
    } else {
        output::print_error_human(error);
    }
}

fn run_self_test() -> Result<()> {
    let report = selftest::run(&mut io::stdout().lock()).context("Failed to write self-test")?;
    if report.is_success() {
        return Ok(());
    }
    let e = anyhow::Error::new(CliError::SelfTestFailed {
        failed: report.failed,
        total: report.total(),
    });
    output::print_error_human(&e);
    Err(e)
}

fn list_devices(options: &RuntimeOptions) -> Result<()> {
    let json = options.format == OutputFormat::Json;
    let api = match open_api().context("Failed to initialize HID access") {
        Ok(api) => api,
        Err(e) => {
            report_error(&e, json);
            return Err(e);
        }
    };
    output::print_device_list(&device::known_devices(&api), json);
    Ok(())
}

/// Identify the device and read it once; the transport is closed on return.
fn measure_once(options: &RuntimeOptions) -> Result<Measurement> {
    let api = open_api().context("Failed to initialize HID access")?;
    let mut transport = device::open(&api, options.device_path.as_deref())?;
    let measurement = measure(&mut transport, &options.session_config())?;
    Ok(measurement)
}

fn run_measurement(options: &RuntimeOptions) -> Result<()> {
    let calibration = &options.calibration;
    match measure_once(options) {
        Ok(measurement) => {
            let pair = calibration.calibrate(&measurement);
            info!(
                firmware = %measurement.identification.firmware,
                value_in = ?pair.value_in,
                value_out = ?pair.value_out,
                "measurement complete"
            );
            match options.format {
                OutputFormat::Mrtg => output::print_mrtg(&MrtgReport::values(
                    calibration.format(pair.value_in),
                    calibration.format(pair.value_out),
                )),
                OutputFormat::Json => {
                    output::print_measurement_json(&measurement, &pair, calibration)
                }
            }
            Ok(())
        }
        Err(e) => {
            error!("{e:#}");
            match options.format {
                OutputFormat::Mrtg => output::print_mrtg(&MrtgReport::failure(format!("{e:#}"))),
                OutputFormat::Json => output::print_error_json(&e),
            }
            Err(e)
        }
    }
}
