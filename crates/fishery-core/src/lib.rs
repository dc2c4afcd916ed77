//! Core types and utilities for the fishery ecosystem simulation.

pub mod types;
pub mod config;
pub mod error;
pub mod stats;

pub use error::{Error, Result, SettingViolation};
pub use types::*;
pub use config::*;
pub use stats::*;
