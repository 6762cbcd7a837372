//! Version information for the GEPN node.

/// The version string from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The user agent reported in logs.
pub const USER_AGENT: &str = concat!("gepn/", env!("CARGO_PKG_VERSION"));
