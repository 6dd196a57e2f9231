//! Value query with bounded retries.

use std::time::Duration;

use tempersensor_hid::{DEFAULT_READ_TIMEOUT, FrameTransport};
use tempersensor_protocol::{Command, DeviceProfile, SensorReadings, hex};
use tracing::debug;

use crate::retry::{Attempt, RetryPolicy};
use crate::{SensorError, SensorResult};

/// Issues the value query and decodes the reply frames of one profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryEngine {
    policy: RetryPolicy,
    read_timeout: Duration,
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl QueryEngine {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Query all slots the profile declares.
    ///
    /// Transport failures restart the whole exchange. Readings that decode to
    /// the invalid sentinel are returned as-is.
    pub fn query_values<T: FrameTransport + ?Sized>(
        &self,
        profile: &DeviceProfile,
        transport: &mut T,
    ) -> SensorResult<SensorReadings> {
        self.policy
            .run(|attempt| self.attempt(profile, transport, attempt))
    }

    fn attempt<T: FrameTransport + ?Sized>(
        &self,
        profile: &DeviceProfile,
        transport: &mut T,
        attempt: Attempt,
    ) -> SensorResult<SensorReadings> {
        let command = Command::QueryValues;
        let mut readings = SensorReadings::new();

        debug!(attempt = attempt.number, frame = %hex(command.payload()), "send");
        transport
            .send(command.payload())
            .map_err(|e| SensorError::send(command, e))?;

        for index in 0..profile.response_count() {
            let frame = transport
                .receive_frame(self.read_timeout)
                .map_err(|e| SensorError::read(command, e))?;
            let decoded = profile.decode_frame(index, &frame, &mut readings);
            debug!(
                attempt = attempt.number,
                index,
                frame = %hex(&frame),
                decoded,
                "value frame"
            );
        }
        Ok(readings)
    }
}
