//! Frame transport trait

use std::time::Duration;

use tempersensor_protocol::Frame;

use crate::{HidDeviceInfo, TransportResult};

/// Default bounded wait for one frame read.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// An open handle able to exchange fixed 8-byte frames with one device.
///
/// A failed read must say whether it timed out
/// ([`TransportError::Timeout`](crate::TransportError::Timeout)) or failed
/// outright.
pub trait FrameTransport {
    fn send(&mut self, frame: &Frame) -> TransportResult<()>;

    fn receive_frame(&mut self, timeout: Duration) -> TransportResult<Frame>;

    fn device_info(&self) -> &HidDeviceInfo;
}

impl<T: FrameTransport + ?Sized> FrameTransport for Box<T> {
    fn send(&mut self, frame: &Frame) -> TransportResult<()> {
        (**self).send(frame)
    }

    fn receive_frame(&mut self, timeout: Duration) -> TransportResult<Frame> {
        (**self).receive_frame(timeout)
    }

    fn device_info(&self) -> &HidDeviceInfo {
        (**self).device_info()
    }
}

pub mod mock {
    use super::*;
    use crate::TransportError;
    use std::collections::VecDeque;
    use tempersensor_protocol::{FIRMWARE_FRAMES, FRAME_LEN};

    /// Split a firmware string over the two NUL padded reply frames.
    pub fn firmware_frames(firmware: &str) -> [Frame; FIRMWARE_FRAMES] {
        let mut frames = [[0u8; FRAME_LEN]; FIRMWARE_FRAMES];
        for (dst, src) in frames.iter_mut().flatten().zip(firmware.bytes()) {
            *dst = src;
        }
        frames
    }

    /// Scripted transport.
    ///
    /// Reads are served from a queue; an empty queue behaves like a device
    /// that never answers. Sends succeed unless a failure was queued.
    pub struct MockTransport {
        info: HidDeviceInfo,
        read_queue: VecDeque<TransportResult<Frame>>,
        send_queue: VecDeque<TransportResult<()>>,
        write_history: Vec<Frame>,
        reads_served: usize,
        connected: bool,
    }

    impl MockTransport {
        pub fn new(vendor_id: u16, product_id: u16, path: impl Into<String>) -> Self {
            Self {
                info: HidDeviceInfo::new(vendor_id, product_id, path),
                read_queue: VecDeque::new(),
                send_queue: VecDeque::new(),
                write_history: Vec::new(),
                reads_served: 0,
                connected: true,
            }
        }

        /// Queue the two frames of a firmware reply.
        pub fn with_firmware(mut self, firmware: &str) -> Self {
            for frame in firmware_frames(firmware) {
                self.queue_frame(frame);
            }
            self
        }

        pub fn queue_frame(&mut self, frame: Frame) {
            self.read_queue.push_back(Ok(frame));
        }

        pub fn queue_read_error(&mut self, error: TransportError) {
            self.read_queue.push_back(Err(error));
        }

        pub fn queue_timeout(&mut self) {
            self.queue_read_error(TransportError::Timeout { timeout_ms: 1000 });
        }

        /// Fail the next unscripted send.
        pub fn queue_send_error(&mut self, error: TransportError) {
            self.send_queue.push_back(Err(error));
        }

        /// Let the next unscripted send succeed; used to position later send failures.
        pub fn queue_send_ok(&mut self) {
            self.send_queue.push_back(Ok(()));
        }

        /// Frames successfully written, in order.
        pub fn write_history(&self) -> &[Frame] {
            &self.write_history
        }

        pub fn pending_reads(&self) -> usize {
            self.read_queue.len()
        }

        /// Number of read calls answered, including failures.
        pub fn reads_served(&self) -> usize {
            self.reads_served
        }

        pub fn disconnect(&mut self) {
            self.connected = false;
        }

        pub fn reconnect(&mut self) {
            self.connected = true;
        }

        pub fn is_connected(&self) -> bool {
            self.connected
        }
    }

    impl FrameTransport for MockTransport {
        fn send(&mut self, frame: &Frame) -> TransportResult<()> {
            if !self.connected {
                return Err(TransportError::Disconnected);
            }
            self.send_queue.pop_front().unwrap_or(Ok(()))?;
            self.write_history.push(*frame);
            Ok(())
        }

        fn receive_frame(&mut self, timeout: Duration) -> TransportResult<Frame> {
            if !self.connected {
                return Err(TransportError::Disconnected);
            }
            self.reads_served += 1;
            self.read_queue.pop_front().unwrap_or_else(|| {
                Err(TransportError::Timeout {
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                })
            })
        }

        fn device_info(&self) -> &HidDeviceInfo {
            &self.info
        }
    }
}
