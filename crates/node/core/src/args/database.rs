//! Credential store CLI arguments.

use clap::Args;

use super::set;
use crate::config::DatabaseConfig;

#[derive(Debug, Args, Clone, Default)]
#[command(next_help_heading = "Database")]
pub struct DatabaseArgs {
    /// Store URI: `memory://` or `file://<dir>`.
    #[arg(long = "db.uri", env = "GEPN_DB_URI", value_name = "URI")]
    pub uri: Option<String>,

    /// Database name. The file backend stores `<dir>/<name>.json`.
    #[arg(long = "db.name", env = "GEPN_DB_NAME", value_name = "NAME")]
    pub name: Option<String>,

    /// Deadline of a single store call, in seconds.
    #[arg(long = "db.timeout", value_name = "SECS")]
    pub timeout_secs: Option<u64>,
}

impl DatabaseArgs {
    pub fn apply_to(&self, config: &mut DatabaseConfig) {
        set(&mut config.uri, &self.uri);
        set(&mut config.name, &self.name);
        set(&mut config.timeout_secs, &self.timeout_secs);
    }
}
