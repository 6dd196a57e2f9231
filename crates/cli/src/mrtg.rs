//! MRTG external-script output.
//!
//! MRTG expects exactly four lines on stdout:
//!
//! 1. the "in" value
//! 2. the "out" value
//! 3. the host uptime (or a timestamp when uptime is unavailable)
//! 4. the target name, here the program signature

use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;
use sysinfo::System;

use crate::calibration::UNKNOWN;

pub const PROGRAM_NAME: &str = "tempersensor";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Uptime units, largest first, with the separator that follows each.
const UPTIME_UNITS: [(&str, u64, &str); 4] = [
    ("week", 7 * 24 * 60 * 60, ", "),
    ("day", 24 * 60 * 60, ", "),
    ("hour", 60 * 60, ", "),
    ("minute", 60, " and "),
];

fn push_unit(out: &mut String, count: u64, unit: &str) {
    let plural = if count == 1 { "" } else { "s" };
    out.push_str(&format!("{count} {unit}{plural}"));
}

/// Human readable uptime: `1 week, 2 days, 3 hours, 4 minutes and 5 seconds`.
///
/// Zero units are left out, seconds are always printed.
pub fn pretty_uptime(seconds: u64) -> String {
    let mut out = String::new();
    let mut rest = seconds;
    for (unit, size, separator) in UPTIME_UNITS {
        let count = rest / size;
        rest %= size;
        if count != 0 {
            push_unit(&mut out, count, unit);
            out.push_str(separator);
        }
    }
    push_unit(&mut out, rest, "second");
    out
}

/// Third MRTG line for a given uptime; falls back to `now` when uptime is 0.
pub fn uptime_or_timestamp<Tz>(uptime: u64, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if uptime == 0 {
        now.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        pretty_uptime(uptime)
    }
}

/// Third MRTG line for this host, right now.
pub fn uptime_line() -> String {
    uptime_or_timestamp(System::uptime(), &Local::now())
}

/// Four-line report for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MrtgReport {
    pub value_in: String,
    pub value_out: String,
    pub uptime: String,
    pub error: Option<String>,
}

impl MrtgReport {
    pub fn values(value_in: String, value_out: String) -> Self {
        Self {
            value_in,
            value_out,
            uptime: uptime_line(),
            error: None,
        }
    }

    /// Both values unknown, `reason` appended to the signature.
    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            value_in: UNKNOWN.to_string(),
            value_out: UNKNOWN.to_string(),
            uptime: uptime_line(),
            error: Some(reason.into()),
        }
    }

    pub fn signature(&self) -> String {
        match &self.error {
            Some(reason) => format!("{PROGRAM_NAME} {VERSION} ({reason})"),
            None => format!("{PROGRAM_NAME} {VERSION}"),
        }
    }

    pub fn render(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}\n",
            self.value_in,
            self.value_out,
            self.uptime,
            self.signature()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use insta::assert_snapshot;

    impl MrtgReport {
        fn with_uptime(mut self, uptime: &str) -> Self {
            self.uptime = uptime.to_string();
            self
        }
    }

    #[test]
    fn uptime_all_units() {
        let seconds = 604_800 + 2 * 86_400 + 3 * 3_600 + 4 * 60 + 5;
        assert_eq!(
            pretty_uptime(seconds),
            "1 week, 2 days, 3 hours, 4 minutes and 5 seconds"
        );
    }

    #[test]
    fn uptime_singular_units() {
        let seconds = 604_800 + 86_400 + 3_600 + 60 + 1;
        assert_eq!(
            pretty_uptime(seconds),
            "1 week, 1 day, 1 hour, 1 minute and 1 second"
        );
    }

    #[test]
    fn uptime_skips_zero_units() {
        assert_eq!(pretty_uptime(3_600 + 5), "1 hour, 5 seconds");
        assert_eq!(pretty_uptime(120), "2 minutes and 0 seconds");
        assert_eq!(pretty_uptime(0), "0 seconds");
    }

    #[test]
    fn zero_uptime_falls_back_to_timestamp() -> Result<(), Box<dyn std::error::Error>> {
        let now = Utc
            .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
            .single()
            .ok_or("ambiguous timestamp")?;
        assert_eq!(uptime_or_timestamp(0, &now), "2024-01-02 03:04:05");
        assert_eq!(uptime_or_timestamp(59, &now), "59 seconds");
        Ok(())
    }

    #[test]
    fn success_report() {
        let report = MrtgReport::values("20".to_string(), "21".to_string())
            .with_uptime("5 seconds");
        let rendered = report.render().replace(VERSION, "<version>");
        assert_snapshot!(rendered, @r"
        20
        21
        5 seconds
        tempersensor <version>
        ");
    }

    #[test]
    fn failure_report() {
        let report = MrtgReport::failure("No supported device found").with_uptime("5 seconds");
        let rendered = report.render().replace(VERSION, "<version>");
        assert_snapshot!(rendered, @r"
        UNKNOWN
        UNKNOWN
        5 seconds
        tempersensor <version> (No supported device found)
        ");
    }
}
