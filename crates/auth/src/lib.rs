//! Authentication and authorization for GEPN.
//!
//! - Secrets are hashed with Argon2id ([`Argon2Hasher`]) on the blocking pool.
//! - Sessions are HS256 tokens ([`TokenIssuer`], [`TokenVerifier`]) that can
//!   be revoked before expiry ([`RevocationStore`]).
//! - Every authenticated request re-fetches the live identity
//!   ([`AuthService::authenticate`]); the token is never trusted for
//!   permissions unless degraded mode is explicitly enabled.
//! - [`AuthorizationGate`] answers capability and regional scope checks.
//!
//! Login for the four identity variants runs through one state machine in
//! [`flow`].

mod bearer;
mod clock;
mod config;
mod error;
pub mod flow;
mod gate;
mod manage;
mod password;
mod registration;
mod revocation;
mod service;
mod session;
mod token;

pub use bearer::extract_bearer;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AuthConfig;
pub use error::{AuthError, UnauthorizedReason};
pub use gate::{AuthorizationGate, DEFAULT_SUPER_USERNAME};
pub use manage::{ModuleInfo, SetActiveRequest, UpdatePermissionsRequest, modules};
pub use password::{Argon2Hasher, SecretHasher};
pub use registration::{
    BootstrapOutcome, CitizenRegistrationRequest, CreateAdminRequest, MIN_PASSWORD_LEN,
    OfficerRegistrationRequest,
};
pub use revocation::{MemoryRevocationStore, RevocationStore};
pub use service::{AuthService, AuthServiceBuilder};
pub use session::Session;
pub use token::{Claims, IssuedToken, TokenError, TokenIssuer, TokenVerifier};
