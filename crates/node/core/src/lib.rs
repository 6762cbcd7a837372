//! Node infrastructure for the GEPN backend.
//!
//! - [`args`] - CLI argument groups
//! - [`config`] - Layered configuration loading
//! - [`constants`] - Default values
//! - [`logging`] - Logging initialization
//! - [`version`] - Version information

pub mod args;
pub mod config;
pub mod constants;
pub mod logging;
pub mod version;
