//! Error types for the tempersensor CLI

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    #[error("'{0}' must not contain ','")]
    CalibrationComma(String),

    #[error("'{value}' is not a float: {reason}")]
    NotAFloat { value: String, reason: String },

    #[error("self-test failed: {failed} of {total} fixtures out of tolerance")]
    SelfTestFailed { failed: usize, total: usize },
}
