//! Login flows.
//!
//! All four identity variants log in through the same state machine:
//!
//! ```text
//! Received -> LookedUp -> SecretVerified -> ActiveChecked -> Enriched -> Issued
//! ```
//!
//! A [`CredentialScheme`] supplies the variant-specific pieces: request
//! validation, lookup, digest selection, post-login side effects and the
//! response shape. An unknown login key and a wrong secret are
//! indistinguishable to the caller: both produce the scheme's rejection
//! message, and unknown keys are still verified against a dummy digest.

mod admin;
mod citizen;
mod officer;
mod patrol;

use async_trait::async_trait;
use gepn_primitives::{Identity, IdentityKind};
use gepn_storage::{CredentialStore, StoreError};
use tracing::{debug, info};

use crate::{AuthError, AuthService, Clock, IssuedToken};

pub use admin::{AdminLogin, AdminLoginRequest, AdminLoginResponse};
pub use citizen::{CitizenAuthResponse, CitizenLogin, CitizenLoginRequest};
pub use officer::{OfficerLogin, OfficerLoginRequest, OfficerLoginResponse};
pub use patrol::{PatrolLogin, PatrolLoginRequest, PatrolLoginResponse, validate_pin};

/// Stages of a login attempt, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::IntoStaticStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum LoginStage {
    Received,
    LookedUp,
    SecretVerified,
    ActiveChecked,
    Enriched,
    Issued,
}

/// What a scheme may touch while enriching a successful login.
pub struct FlowContext<'a> {
    pub store: &'a dyn CredentialStore,
    pub clock: &'a dyn Clock,
}

/// Variant-specific half of a login flow.
#[async_trait]
pub trait CredentialScheme: Send + Sync {
    type Request: Send + Sync;
    type Record: Send + Sync;
    /// Output of [`Self::enrich`], handed to [`Self::respond`].
    type Enrichment: Send;
    type Response;

    const KIND: IdentityKind;
    /// Message for an unknown key or a wrong secret.
    const REJECTION: &'static str;
    const INACTIVE: &'static str = "Usuario inactivo";

    /// Validates the request shape before anything is looked up.
    fn precheck(&self, request: &Self::Request) -> Result<(), AuthError>;

    fn login_key<'r>(&self, request: &'r Self::Request) -> &'r str;

    fn secret<'r>(&self, request: &'r Self::Request) -> &'r str;

    async fn lookup(
        &self,
        store: &dyn CredentialStore,
        key: &str,
    ) -> Result<Option<Self::Record>, StoreError>;

    fn identity(&self, record: &Self::Record) -> Identity;

    /// Picks the digest the secret is checked against.
    fn digest<'a>(&self, record: &'a Self::Record) -> Result<&'a str, AuthError>;

    /// Best-effort side effects of a successful login. Must not fail the login.
    async fn enrich(
        &self,
        ctx: FlowContext<'_>,
        record: &Self::Record,
        request: &Self::Request,
    ) -> Self::Enrichment;

    fn respond(
        &self,
        record: Self::Record,
        token: IssuedToken,
        enrichment: Self::Enrichment,
    ) -> Self::Response;
}

impl AuthService {
    /// Runs a login through `scheme`.
    pub async fn login<S: CredentialScheme>(
        &self,
        scheme: &S,
        request: S::Request,
    ) -> Result<S::Response, AuthError> {
        let kind = S::KIND;
        scheme.precheck(&request)?;

        let key = scheme.login_key(&request);
        let record = scheme.lookup(&*self.store, key).await?;
        let secret = scheme.secret(&request).to_owned();

        let Some(record) = record else {
            // Same work as a wrong secret.
            let _ = self.verify_secret(secret, self.dummy_digest.clone()).await;
            debug!(target: "gepn::auth", %kind, stage = %LoginStage::LookedUp, "login rejected: unknown key");
            return Err(AuthError::InvalidCredentials(S::REJECTION));
        };

        let digest = scheme.digest(&record)?.to_owned();
        if !self.verify_secret(secret, digest).await {
            debug!(target: "gepn::auth", %kind, stage = %LoginStage::SecretVerified, "login rejected: wrong secret");
            return Err(AuthError::InvalidCredentials(S::REJECTION));
        }

        let identity = scheme.identity(&record);
        if !identity.is_active() {
            info!(target: "gepn::auth", %kind, subject = %identity.id(), stage = %LoginStage::ActiveChecked, "login rejected: inactive");
            return Err(AuthError::Inactive(S::INACTIVE));
        }

        let ctx = FlowContext {
            store: &*self.store,
            clock: &*self.clock,
        };
        let enrichment = scheme.enrich(ctx, &record, &request).await;

        let token = self
            .issuer
            .issue(&identity.principal(), self.config.ttl(kind))?;
        info!(target: "gepn::auth", %kind, subject = %identity.id(), stage = %LoginStage::Issued, "login succeeded");

        Ok(scheme.respond(record, token, enrichment))
    }
}

/// Rejects blank required fields with `message`.
pub(crate) fn require_fields(fields: &[&str], message: &str) -> Result<(), AuthError> {
    if fields.iter().any(|f| f.trim().is_empty()) {
        return Err(AuthError::malformed(message));
    }
    Ok(())
}
