use std::time::Duration;

use gepn_primitives::IdentityKind;

use crate::gate::DEFAULT_SUPER_USERNAME;

/// Runtime authentication settings, fixed at startup.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub officer_ttl: Duration,
    pub admin_ttl: Duration,
    pub citizen_ttl: Duration,
    pub patrol_ttl: Duration,
    /// Fall back to the token snapshot when the live identity cannot be
    /// fetched.
    pub degraded_mode: bool,
    pub super_username: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            officer_ttl: Duration::from_secs(12 * 60 * 60),
            admin_ttl: Duration::from_secs(24 * 60 * 60),
            citizen_ttl: Duration::from_secs(24 * 60 * 60),
            patrol_ttl: Duration::from_secs(12 * 60 * 60),
            degraded_mode: false,
            super_username: DEFAULT_SUPER_USERNAME.to_owned(),
        }
    }
}

impl AuthConfig {
    /// Token lifetime for the given identity variant.
    pub const fn ttl(&self, kind: IdentityKind) -> Duration {
        match kind {
            IdentityKind::Funcionario => self.officer_ttl,
            IdentityKind::Master => self.admin_ttl,
            IdentityKind::Ciudadano => self.citizen_ttl,
            IdentityKind::Patrullaje => self.patrol_ttl,
        }
    }
}
