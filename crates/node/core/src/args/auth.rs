//! Authentication CLI arguments.

use clap::Args;

use super::set;
use crate::config::AuthSettings;

#[derive(Debug, Args, Clone, Default)]
#[command(next_help_heading = "Authentication")]
pub struct AuthArgs {
    /// Token signing secret.
    #[arg(long = "auth.jwt-secret", env = "JWT_SECRET", hide_env_values = true, value_name = "SECRET")]
    pub jwt_secret: Option<String>,

    /// Officer token lifetime, in hours.
    #[arg(long = "auth.officer-ttl", value_name = "HOURS")]
    pub officer_ttl_hours: Option<u64>,

    /// Administrator token lifetime, in hours.
    #[arg(long = "auth.admin-ttl", value_name = "HOURS")]
    pub admin_ttl_hours: Option<u64>,

    /// Citizen token lifetime, in hours.
    #[arg(long = "auth.citizen-ttl", value_name = "HOURS")]
    pub citizen_ttl_hours: Option<u64>,

    /// Patrol token lifetime, in hours.
    #[arg(long = "auth.patrol-ttl", value_name = "HOURS")]
    pub patrol_ttl_hours: Option<u64>,

    /// Authorize from the token snapshot when the live identity cannot be
    /// fetched. Off by default.
    #[arg(long = "auth.degraded-mode")]
    pub degraded_mode: bool,

    /// Username of the super-administrator.
    #[arg(long = "auth.super-admin", env = "GEPN_SUPER_ADMIN", value_name = "USERNAME")]
    pub super_username: Option<String>,

    /// Password given to the super-administrator when it is first created.
    #[arg(long = "auth.admin-password", env = "GEPN_ADMIN_PASSWORD", hide_env_values = true, value_name = "PASSWORD")]
    pub admin_password: Option<String>,
}

impl AuthArgs {
    pub fn apply_to(&self, config: &mut AuthSettings) {
        set(&mut config.jwt_secret, &self.jwt_secret);
        set(&mut config.officer_ttl_hours, &self.officer_ttl_hours);
        set(&mut config.admin_ttl_hours, &self.admin_ttl_hours);
        set(&mut config.citizen_ttl_hours, &self.citizen_ttl_hours);
        set(&mut config.patrol_ttl_hours, &self.patrol_ttl_hours);
        set(&mut config.super_username, &self.super_username);
        set(&mut config.admin_password, &self.admin_password);
        if self.degraded_mode {
            config.degraded_mode = true;
        }
    }
}
