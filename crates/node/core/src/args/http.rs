//! HTTP server CLI arguments.

use clap::Args;

use super::set;
use crate::config::HttpConfig;

#[derive(Debug, Args, Clone, Default)]
#[command(next_help_heading = "HTTP")]
pub struct HttpArgs {
    /// Listen address.
    #[arg(long = "http.addr", value_name = "ADDR")]
    pub addr: Option<String>,

    /// Listen port.
    #[arg(long = "http.port", env = "PORT", value_name = "PORT")]
    pub port: Option<u16>,
}

impl HttpArgs {
    pub fn apply_to(&self, config: &mut HttpConfig) {
        set(&mut config.addr, &self.addr);
        set(&mut config.port, &self.port);
    }
}
