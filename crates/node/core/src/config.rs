//! Figment-based configuration loading.
//!
//! Configuration priority (highest wins):
//! 1. CLI arguments and their legacy environment variables (`PORT`,
//!    `JWT_SECRET`, `GEPN_DB_URI`, ...), applied after load
//! 2. Config file (TOML)
//! 3. Environment variables (`GEPN_` prefix, `__` between sections)
//! 4. Defaults

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::Path,
    time::Duration,
};

use eyre::{Result, WrapErr};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use gepn_auth::AuthConfig;
use gepn_rpc_server::HttpServerConfig;
use serde::{Deserialize, Serialize};

use crate::{
    args::{AuthArgs, DatabaseArgs, HttpArgs},
    constants::*,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub addr: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_HTTP_ADDR.to_owned(),
            port: DEFAULT_HTTP_PORT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub uri: String,
    pub name: String,
    pub timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_DB_URI.to_owned(),
            name: DEFAULT_DB_NAME.to_owned(),
            timeout_secs: DEFAULT_DB_TIMEOUT_SECS,
        }
    }
}

impl DatabaseConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub officer_ttl_hours: u64,
    pub admin_ttl_hours: u64,
    pub citizen_ttl_hours: u64,
    pub patrol_ttl_hours: u64,
    pub degraded_mode: bool,
    pub super_username: String,
    pub admin_password: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_owned(),
            officer_ttl_hours: DEFAULT_OFFICER_TTL_HOURS,
            admin_ttl_hours: DEFAULT_ADMIN_TTL_HOURS,
            citizen_ttl_hours: DEFAULT_ADMIN_TTL_HOURS,
            patrol_ttl_hours: DEFAULT_OFFICER_TTL_HOURS,
            degraded_mode: false,
            super_username: gepn_auth::DEFAULT_SUPER_USERNAME.to_owned(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_owned(),
        }
    }
}

impl AuthSettings {
    pub fn auth_config(&self) -> AuthConfig {
        let hours = |h: u64| Duration::from_secs(h.saturating_mul(3600));
        AuthConfig {
            officer_ttl: hours(self.officer_ttl_hours),
            admin_ttl: hours(self.admin_ttl_hours),
            citizen_ttl: hours(self.citizen_ttl_hours),
            patrol_ttl: hours(self.patrol_ttl_hours),
            degraded_mode: self.degraded_mode,
            super_username: self.super_username.clone(),
        }
    }
}

/// Complete node configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GepnConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthSettings,
}

impl GepnConfig {
    /// Load configuration from defaults, environment, and config file.
    /// CLI overrides are applied separately with [`Self::apply_args`].
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        if let Some(path) = config_path {
            if !path.exists() {
                eyre::bail!("config file not found: {}", path.display());
            }
            figment = figment.merge(Toml::file(path));
        }

        figment.extract().wrap_err("Failed to load configuration")
    }

    pub fn apply_args(&mut self, http: &HttpArgs, database: &DatabaseArgs, auth: &AuthArgs) {
        http.apply_to(&mut self.http);
        database.apply_to(&mut self.database);
        auth.apply_to(&mut self.auth);
    }

    /// Get the HTTP server socket address.
    pub fn http_socket_addr(&self) -> SocketAddr {
        SocketAddr::new(
            self.http
                .addr
                .parse()
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            self.http.port,
        )
    }

    pub fn http_server_config(&self) -> HttpServerConfig {
        HttpServerConfig {
            addr: self.http_socket_addr(),
        }
    }

    /// Names of secret settings still at their development defaults.
    pub fn insecure_defaults(&self) -> Vec<&'static str> {
        let mut insecure = Vec::new();
        if self.auth.jwt_secret == DEFAULT_JWT_SECRET {
            insecure.push("auth.jwt_secret");
        }
        if self.auth.admin_password == DEFAULT_ADMIN_PASSWORD {
            insecure.push("auth.admin_password");
        }
        insecure
    }

    /// A copy with secrets replaced by a placeholder.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.auth.jwt_secret = REDACTED.to_owned();
        config.auth.admin_password = REDACTED.to_owned();
        config
    }

    /// The redacted configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(&self.redacted()).wrap_err("Failed to serialize configuration")
    }
}
