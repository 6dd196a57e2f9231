//! Device identification.
//!
//! Single pass, terminal on the first failure:
//!
//! ```text
//! Idle -> FirmwareRequested -> FirmwareReceived -> ProfileResolved
//!   \            \                    \
//!    +------------+--------------------+--> Failed
//! ```
//!
//! Identification is not retried; a device that cannot answer the firmware
//! query on its first try is treated as unusable.

use std::time::Duration;

use tempersensor_hid::{DEFAULT_READ_TIMEOUT, FrameTransport};
use tempersensor_protocol::{
    Command, ConversionRule, DeviceProfile, FIRMWARE_FRAMES, FirmwareString, hex,
    lookup_with_override,
};
use tracing::{debug, info, warn};

use crate::{SensorError, SensorResult};

/// Outcome of a successful identification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identification {
    pub vendor_id: u16,
    pub product_id: u16,
    pub firmware: FirmwareString,
    pub profile: DeviceProfile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifyState {
    Idle,
    FirmwareRequested,
    FirmwareReceived(FirmwareString),
    ProfileResolved(Identification),
    Failed(SensorError),
}

impl IdentifyState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            IdentifyState::ProfileResolved(_) | IdentifyState::Failed(_)
        )
    }
}

/// Drives [`IdentifyState`] against one transport.
#[derive(Debug, Clone)]
pub struct DeviceIdentifier {
    vendor_id: u16,
    product_id: u16,
    read_timeout: Duration,
    conversion_override: Option<ConversionRule>,
    state: IdentifyState,
}

impl DeviceIdentifier {
    pub fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
            read_timeout: DEFAULT_READ_TIMEOUT,
            conversion_override: None,
            state: IdentifyState::Idle,
        }
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_conversion_override(mut self, rule: Option<ConversionRule>) -> Self {
        self.conversion_override = rule;
        self
    }

    pub fn state(&self) -> &IdentifyState {
        &self.state
    }

    /// Perform one transition. Terminal states are left unchanged.
    pub fn step<T: FrameTransport + ?Sized>(&mut self, transport: &mut T) -> &IdentifyState {
        let current = std::mem::replace(&mut self.state, IdentifyState::Idle);
        self.state = match current {
            IdentifyState::Idle => self.request_firmware(transport),
            IdentifyState::FirmwareRequested => self.receive_firmware(transport),
            IdentifyState::FirmwareReceived(firmware) => self.resolve(firmware),
            terminal => terminal,
        };
        &self.state
    }

    /// Step until a terminal state is reached.
    pub fn run<T: FrameTransport + ?Sized>(mut self, transport: &mut T) -> SensorResult<Identification> {
        loop {
            self.step(transport);
            match std::mem::replace(&mut self.state, IdentifyState::Idle) {
                IdentifyState::ProfileResolved(identification) => return Ok(identification),
                IdentifyState::Failed(error) => return Err(error),
                pending => self.state = pending,
            }
        }
    }

    fn request_firmware<T: FrameTransport + ?Sized>(&self, transport: &mut T) -> IdentifyState {
        let command = Command::QueryFirmware;
        debug!(command = %command, frame = %hex(command.payload()), "send");
        match transport.send(command.payload()) {
            Ok(()) => IdentifyState::FirmwareRequested,
            Err(e) => IdentifyState::Failed(SensorError::send(command, e)),
        }
    }

    fn receive_firmware<T: FrameTransport + ?Sized>(&self, transport: &mut T) -> IdentifyState {
        let mut firmware = FirmwareString::new();
        for index in 0..FIRMWARE_FRAMES {
            match transport.receive_frame(self.read_timeout) {
                Ok(frame) => {
                    debug!(index, frame = %hex(&frame), "firmware frame");
                    firmware.push_frame(&frame);
                }
                Err(e) => {
                    return IdentifyState::Failed(SensorError::read(Command::QueryFirmware, e));
                }
            }
        }
        debug!(firmware = %firmware, "firmware");
        IdentifyState::FirmwareReceived(firmware)
    }

    fn resolve(&self, firmware: FirmwareString) -> IdentifyState {
        match lookup_with_override(
            self.vendor_id,
            self.product_id,
            &firmware,
            self.conversion_override,
        ) {
            Ok(profile) => {
                info!(
                    variant = %profile.variant,
                    firmware = %firmware,
                    frames = profile.response_count(),
                    rule = profile.conversion_rule.method(),
                    "identified device"
                );
                if !profile.variant.is_tested() {
                    warn!(variant = %profile.variant, "device variant has not been verified on hardware");
                }
                IdentifyState::ProfileResolved(Identification {
                    vendor_id: self.vendor_id,
                    product_id: self.product_id,
                    firmware,
                    profile,
                })
            }
            Err(e) => IdentifyState::Failed(e.into()),
        }
    }
}

/// Identify the device behind `transport` using its reported VID/PID.
pub fn identify<T: FrameTransport + ?Sized>(
    transport: &mut T,
    conversion_override: Option<ConversionRule>,
) -> SensorResult<Identification> {
    let info = transport.device_info();
    DeviceIdentifier::new(info.vendor_id, info.product_id)
        .with_conversion_override(conversion_override)
        .run(transport)
}
