//! `hidapi` backed [`FrameTransport`].
//!
//! Frames are written as-is: the leading `0x01` of every command doubles as
//! the report ID, which is what the hidraw backend passes straight through.
//! Frame contents are logged by the engine, not here.

use std::ffi::CString;
use std::time::Duration;

use hidapi::{HidApi, HidDevice};
use tempersensor_protocol::{FRAME_LEN, Frame};
use tracing::{debug, trace};

use crate::{FrameTransport, HidDeviceInfo, TransportError, TransportResult};

/// An open hidraw handle. Closed when dropped.
pub struct HidapiTransport {
    device: HidDevice,
    info: HidDeviceInfo,
}

impl HidapiTransport {
    pub fn open(api: &HidApi, info: &HidDeviceInfo) -> TransportResult<Self> {
        let open_error = |reason: String| TransportError::Open {
            path: info.path.clone(),
            reason,
        };
        let path = CString::new(info.path.as_str()).map_err(|e| open_error(e.to_string()))?;
        let device = api.open_path(&path).map_err(|e| open_error(e.to_string()))?;
        debug!(path = %info.path, device = %info.id_string(), "opened device");
        Ok(Self {
            device,
            info: info.clone(),
        })
    }
}

fn timeout_ms(timeout: Duration) -> i32 {
    i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX)
}

impl FrameTransport for HidapiTransport {
    fn send(&mut self, frame: &Frame) -> TransportResult<()> {
        let written = self
            .device
            .write(frame)
            .map_err(|e| TransportError::Write(e.to_string()))?;
        if written < FRAME_LEN {
            return Err(TransportError::Write(format!(
                "short write: {written} of {FRAME_LEN} bytes"
            )));
        }
        Ok(())
    }

    fn receive_frame(&mut self, timeout: Duration) -> TransportResult<Frame> {
        let mut frame = [0u8; FRAME_LEN];
        let read = self
            .device
            .read_timeout(&mut frame, timeout_ms(timeout))
            .map_err(|e| TransportError::Read(e.to_string()))?;
        match read {
            0 => {
                trace!(timeout_ms = timeout_ms(timeout), "read timed out");
                Err(TransportError::Timeout {
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                })
            }
            n if n < FRAME_LEN => Err(TransportError::ShortFrame {
                got: n,
                expected: FRAME_LEN,
            }),
            _ => Ok(frame),
        }
    }

    fn device_info(&self) -> &HidDeviceInfo {
        &self.info
    }
}

impl Drop for HidapiTransport {
    fn drop(&mut self) {
        debug!(path = %self.info.path, "closing device");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_conversion_saturates() {
        assert_eq!(timeout_ms(Duration::from_secs(1)), 1000);
        assert_eq!(timeout_ms(Duration::from_millis(0)), 0);
        assert_eq!(timeout_ms(Duration::from_secs(u64::MAX)), i32::MAX);
    }
}
