//! Engine error type.

use core::fmt;

use tempersensor_hid::TransportError;
use tempersensor_protocol::{Command, LookupError};
use thiserror::Error;

/// Coarse classification of a [`SensorError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    TransportSend,
    TransportRead,
    TransportTimeout,
    UnsupportedDevice,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::TransportSend => "send error",
            ErrorKind::TransportRead => "read error",
            ErrorKind::TransportTimeout => "timeout",
            ErrorKind::UnsupportedDevice => "unknown device",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SensorError {
    #[error("Error sending '{command}': {source}")]
    Send {
        command: Command,
        source: TransportError,
    },

    #[error("Error reading response to '{command}': {source}")]
    Read {
        command: Command,
        source: TransportError,
    },

    #[error("Error reading response to '{command}': Timeout")]
    Timeout { command: Command, timeout_ms: u64 },

    #[error(transparent)]
    Unsupported(#[from] LookupError),
}

impl SensorError {
    pub fn send(command: Command, source: TransportError) -> Self {
        SensorError::Send { command, source }
    }

    /// Wrap a failed read, keeping timeouts distinguishable.
    pub fn read(command: Command, source: TransportError) -> Self {
        match source {
            TransportError::Timeout { timeout_ms } => SensorError::Timeout {
                command,
                timeout_ms,
            },
            source => SensorError::Read { command, source },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SensorError::Send { .. } => ErrorKind::TransportSend,
            SensorError::Read { .. } => ErrorKind::TransportRead,
            SensorError::Timeout { .. } => ErrorKind::TransportTimeout,
            SensorError::Unsupported(_) => ErrorKind::UnsupportedDevice,
        }
    }

    /// Transport failures may clear up on a later attempt; lookups never do.
    pub fn is_retryable(&self) -> bool {
        self.kind() != ErrorKind::UnsupportedDevice
    }

    /// Command in flight when the error happened.
    pub fn command(&self) -> Option<Command> {
        match self {
            SensorError::Send { command, .. }
            | SensorError::Read { command, .. }
            | SensorError::Timeout { command, .. } => Some(*command),
            SensorError::Unsupported(_) => None,
        }
    }
}

pub type SensorResult<T> = Result<T, SensorError>;

#[cfg(test)]
mod tests {
    use super::*;
    use tempersensor_protocol::FirmwareString;

    #[test]
    fn timeout_reads_are_classified_separately() {
        let err = SensorError::read(
            Command::QueryValues,
            TransportError::Timeout { timeout_ms: 1000 },
        );
        assert_eq!(err.kind(), ErrorKind::TransportTimeout);
        assert_eq!(
            err.to_string(),
            "Error reading response to 'query values': Timeout"
        );

        let err = SensorError::read(
            Command::QueryFirmware,
            TransportError::Read("I/O error".to_string()),
        );
        assert_eq!(err.kind(), ErrorKind::TransportRead);
        assert_eq!(err.command(), Some(Command::QueryFirmware));
    }

    #[test]
    fn lookup_failures_are_not_retryable() -> Result<(), &'static str> {
        let lookup = tempersensor_protocol::lookup(0x1a86, 0x5523, &FirmwareString::new());
        let Err(lookup) = lookup else {
            return Err("rejected pair resolved to a profile");
        };
        let err = SensorError::from(lookup);
        assert_eq!(err.kind(), ErrorKind::UnsupportedDevice);
        assert!(!err.is_retryable());
        assert_eq!(err.command(), None);
        Ok(())
    }

    #[test]
    fn transport_failures_are_retryable() {
        let err = SensorError::send(Command::QueryValues, TransportError::Disconnected);
        assert!(err.is_retryable());
        assert_eq!(
            err.to_string(),
            "Error sending 'query values': Device disconnected"
        );
    }
}
