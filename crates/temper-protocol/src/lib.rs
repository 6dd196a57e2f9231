//! TEMPer USB thermometer wire protocol.
//!
//! TEMPer sticks answer two fixed 8-byte commands over plain HID reads and
//! writes: a firmware query whose reply identifies the hardware variant, and a
//! value query whose reply carries one or two big-endian sensor fields per
//! frame. This crate holds everything that can be decided without touching a
//! device:
//!
//! - [`ids`]: VID/PID constants and the discovery allow-list
//! - [`commands`]: command payloads, frame helpers, firmware string assembly
//! - [`decode`]: the two raw-field conversion rules and the invalid-reading sentinel
//! - [`readings`]: logical sensor slots and the per-cycle reading container
//! - [`profile`]: the device profile table and lookup
//!
//! # Example
//! ```
//! use tempersensor_protocol::{FirmwareString, SensorSlot, SensorReadings, lookup};
//!
//! let firmware = FirmwareString::from("TEMPer1F_V1.3r1F");
//! let profile = lookup(0x0c45, 0x7401, &firmware)?;
//! let mut readings = SensorReadings::new();
//! profile.decode_frame(0, &[0x80, 0x04, 0x1a, 0x1a, 0x1a, 0x10, 0x00, 0x00], &mut readings);
//! assert_eq!(readings.get(SensorSlot::ExternalTemp), Some(26.0625));
//! # Ok::<(), tempersensor_protocol::LookupError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]

pub mod commands;
pub mod decode;
pub mod ids;
pub mod profile;
pub mod readings;

pub use commands::{
    Command, FIRMWARE_CAPACITY, FIRMWARE_FRAMES, FRAME_LEN, FirmwareString, Frame, QUERY_FIRMWARE,
    QUERY_VALUES, field_at, hex,
};
pub use decode::{
    ConversionRule, INVALID_READING, InvalidConversionMethod, decode, decode_method,
    is_valid_reading,
};
pub use ids::{SUPPORTED_IDS, is_supported, product_name};
pub use profile::{
    DeviceProfile, DeviceVariant, FirmwareMatch, FrameLayout, LookupError, PROFILE_TABLE,
    ProfileEntry, REJECTED_DEVICES, RejectedDevice, lookup, lookup_with_override,
};
pub use readings::{InvalidSensorCode, SLOT_COUNT, SensorReadings, SensorSlot};
