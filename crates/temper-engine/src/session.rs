//! One measurement cycle: identify, query, select.

use std::time::Duration;

use tempersensor_hid::{DEFAULT_READ_TIMEOUT, FrameTransport};
use tempersensor_protocol::{ConversionRule, SensorReadings};
use tracing::debug;

use crate::identify::{DeviceIdentifier, Identification};
use crate::query::QueryEngine;
use crate::retry::RetryPolicy;
use crate::selection::{ResolvedSelection, SensorSelection};
use crate::SensorResult;

/// Everything a measurement cycle needs besides the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub conversion_override: Option<ConversionRule>,
    pub selection: SensorSelection,
    pub retry: RetryPolicy,
    pub read_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            conversion_override: None,
            selection: SensorSelection::default(),
            retry: RetryPolicy::default(),
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Result of one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub identification: Identification,
    pub selection: ResolvedSelection,
    pub readings: SensorReadings,
}

impl Measurement {
    /// Uncalibrated "in" value, `None` for an invalid reading.
    pub fn value_in(&self) -> Option<f32> {
        self.readings.get(self.selection.report_in)
    }

    /// Uncalibrated "out" value, `None` for an invalid reading.
    pub fn value_out(&self) -> Option<f32> {
        self.readings.get(self.selection.report_out)
    }
}

/// Identify the device and read one set of values from it.
pub fn measure<T: FrameTransport + ?Sized>(
    transport: &mut T,
    config: &SessionConfig,
) -> SensorResult<Measurement> {
    let info = transport.device_info();
    let identification = DeviceIdentifier::new(info.vendor_id, info.product_id)
        .with_read_timeout(config.read_timeout)
        .with_conversion_override(config.conversion_override)
        .run(transport)?;

    let mut selection = config.selection;
    selection.fill_defaults(&identification.profile);
    let selection = selection.resolve(&identification.profile);
    debug!(
        report_in = selection.report_in.code(),
        report_out = selection.report_out.code(),
        "sensor selection"
    );

    let readings = QueryEngine::new(config.retry)
        .with_read_timeout(config.read_timeout)
        .query_values(&identification.profile, transport)?;

    Ok(Measurement {
        identification,
        selection,
        readings,
    })
}
