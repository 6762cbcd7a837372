//! Default values for node settings.
//!
//! The secret defaults are for development only; the node logs a warning
//! whenever one of them is in effect.

/// Default HTTP listen address (all interfaces).
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0";

/// Default HTTP listen port.
pub const DEFAULT_HTTP_PORT: u16 = gepn_rpc_server::DEFAULT_HTTP_PORT;

/// Default credential store URI.
pub const DEFAULT_DB_URI: &str = "memory://";

/// Default database name.
pub const DEFAULT_DB_NAME: &str = "gepn";

/// Default deadline of a single store call, in seconds.
pub const DEFAULT_DB_TIMEOUT_SECS: u64 = gepn_storage::DEFAULT_STORE_TIMEOUT.as_secs();

/// Development token signing secret.
pub const DEFAULT_JWT_SECRET: &str = "gepn-secret-key-change-in-production";

/// Development super-administrator password.
pub const DEFAULT_ADMIN_PASSWORD: &str = "Admin123!";

/// Default officer and patrol token lifetime, in hours.
pub const DEFAULT_OFFICER_TTL_HOURS: u64 = 12;

/// Default administrator and citizen token lifetime, in hours.
pub const DEFAULT_ADMIN_TTL_HOURS: u64 = 24;

/// Interval between revocation list sweeps, in seconds.
pub const REVOCATION_SWEEP_INTERVAL_SECS: u64 = 300;

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "GEPN_";

/// Placeholder shown instead of secrets.
pub const REDACTED: &str = "<redacted>";
