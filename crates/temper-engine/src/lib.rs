//! TEMPer protocol engine.
//!
//! Runs the two exchanges a TEMPer stick understands against any
//! [`FrameTransport`](tempersensor_hid::FrameTransport):
//!
//! 1. [`identify`]: firmware query, then profile lookup. Never retried.
//! 2. [`QueryEngine::query_values`]: value query, retried as a whole on
//!    transport failure (10 attempts by default).
//!
//! [`measure`] chains both for a one-shot measurement.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod identify;
pub mod query;
pub mod retry;
pub mod selection;
pub mod session;

pub use error::{ErrorKind, SensorError, SensorResult};
pub use identify::{DeviceIdentifier, Identification, IdentifyState, identify};
pub use query::QueryEngine;
pub use retry::{Attempt, DEFAULT_MAX_ATTEMPTS, RetryPolicy};
pub use selection::{ResolvedSelection, SensorSelection};
pub use session::{Measurement, SessionConfig, measure};
