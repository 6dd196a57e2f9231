//! Output formatting for CLI responses

use anyhow::Error;
use colored::*;
use serde_json::{Map, Value, json};
use tempersensor_engine::Measurement;
use tempersensor_hid::HidDeviceInfo;
use tempersensor_protocol::SensorSlot;

use crate::calibration::{CalibratedPair, Calibration};
use crate::device::Support;
use crate::mrtg::MrtgReport;

fn print_json(value: &Value, what: &str) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Failed to format {} as JSON: {}", what, e),
    }
}

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    print_json(
        &json!({
            "success": false,
            "error": {
                "message": format!("{error:#}"),
            }
        }),
        "error",
    );
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

pub fn print_mrtg(report: &MrtgReport) {
    print!("{}", report.render());
}

/// Raw slot values keyed by sensor code, `null` for invalid slots.
fn readings_json(measurement: &Measurement) -> Value {
    let mut readings = Map::new();
    for slot in SensorSlot::ALL {
        let value = measurement
            .readings
            .get(slot)
            .and_then(|v| v.to_string().parse::<f64>().ok());
        readings.insert(slot.code().to_string(), json!(value));
    }
    Value::Object(readings)
}

pub fn measurement_json(
    measurement: &Measurement,
    pair: &CalibratedPair,
    calibration: &Calibration,
) -> Value {
    let id = &measurement.identification;
    json!({
        "success": true,
        "in": calibration.rounded(pair.value_in),
        "out": calibration.rounded(pair.value_out),
        "report_in": measurement.selection.report_in.code(),
        "report_out": measurement.selection.report_out.code(),
        "unit": if calibration.fahrenheit { "F" } else { "C" },
        "device": format!("{:04x}:{:04x}", id.vendor_id, id.product_id),
        "firmware": id.firmware.to_string(),
        "variant": id.profile.variant.name(),
        "readings": readings_json(measurement),
    })
}

pub fn print_measurement_json(
    measurement: &Measurement,
    pair: &CalibratedPair,
    calibration: &Calibration,
) {
    print_json(&measurement_json(measurement, pair, calibration), "measurement");
}

/// Print device list in specified format
pub fn print_device_list(devices: &[(HidDeviceInfo, Support)], json: bool) {
    if json {
        let devices: Vec<Value> = devices
            .iter()
            .map(|(info, support)| {
                json!({
                    "id": info.id_string(),
                    "name": info.display_name(),
                    "path": info.path,
                    "serial": info.serial_number,
                    "supported": matches!(support, Support::Supported),
                    "reason": match support {
                        Support::Supported => None,
                        Support::Rejected(reason) => Some(*reason),
                    },
                })
            })
            .collect();
        print_json(
            &json!({
                "success": true,
                "devices": devices
            }),
            "device list",
        );
        return;
    }

    if devices.is_empty() {
        println!("{}", "No TEMPer devices found".yellow());
        return;
    }

    println!("{}", "TEMPer Devices:".bold());
    for (info, support) in devices {
        let marker = match support {
            Support::Supported => "●".green(),
            Support::Rejected(_) => "●".red(),
        };
        println!(
            "  {} {} ({}) {}",
            marker,
            info.display_name().bold(),
            info.id_string().dimmed(),
            info.path
        );
        if let Support::Rejected(reason) = support {
            println!("    {}", reason.dimmed());
        }
    }
}
