//! HID transport layer for TEMPer thermometers.
//!
//! The protocol engine only needs to send one 8-byte frame and receive 8-byte
//! frames with a bounded wait. [`FrameTransport`] is that seam; this crate
//! provides the `hidapi` backed implementation, a scripted
//! [`mock::MockTransport`] for tests, and device discovery.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod device_info;
pub mod discovery;
pub mod hidapi_transport;
pub mod transport;

pub use device_info::*;
pub use discovery::*;
pub use hidapi_transport::*;
pub use transport::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("No supported device found")]
    NotFound,

    #[error("Failed to open device {path}: {reason}")]
    Open { path: String, reason: String },

    #[error("Failed to enumerate HID devices: {0}")]
    Enumeration(String),

    #[error("Failed to write to device: {0}")]
    Write(String),

    #[error("Failed to read from device: {0}")]
    Read(String),

    #[error("Timeout")]
    Timeout { timeout_ms: u64 },

    #[error("Short frame: got {got} bytes, expected {expected}")]
    ShortFrame { got: usize, expected: usize },

    #[error("Device disconnected")]
    Disconnected,
}

impl TransportError {
    /// Returns `true` for a read that ran out of time rather than failing.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout { .. })
    }
}

pub type TransportResult<T> = Result<T, TransportError>;
