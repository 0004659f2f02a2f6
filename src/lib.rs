//! Demonstrates the instability of hold-out validation: repeatedly split a synthetic two-class
//! dataset, train a small feed-forward network on each split, and compare the resulting test
//! errors across splits and initializations.

#![deny(unsafe_code, rust_2018_idioms, rust_2021_compatibility)]
#![warn(missing_docs)]

pub mod autodiff;
pub mod dataset;
pub mod error;
pub mod harness;
pub mod model;
pub mod summary;
pub mod sweep;

pub use error::{Error, Result};
