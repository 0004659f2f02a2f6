//! Defines experiment errors.

use std::{error, fmt};

/// An alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// An error type for all operations in the experiment harness.
#[derive(Clone, Debug)]
pub enum Error {
    /// A parameter was outside its valid domain. Detected eagerly, before any
    /// random draw or training step.
    InvalidParameter(String),
    /// Training failed inside the model capability, e.g., the loss became
    /// non-finite. Never retried or replaced with a sentinel value.
    Training(String),
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter(s) => write!(f, "Invalid parameter: {}.", s),
            Self::Training(s) => write!(f, "Training failed: {}.", s),
        }
    }
}
