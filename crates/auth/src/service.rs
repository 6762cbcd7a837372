use std::sync::Arc;

use gepn_storage::CredentialStore;
use tracing::{debug, error};

use crate::{
    Argon2Hasher, AuthConfig, AuthError, AuthorizationGate, Clock, MemoryRevocationStore,
    RevocationStore, SecretHasher, SystemClock, TokenIssuer, TokenVerifier,
};

/// Plaintext behind the digest that unknown login keys are verified against.
const DUMMY_SECRET: &str = "gepn-unknown-login-key";

/// Authentication and authorization entry point.
///
/// Owns the token keys, the hasher and the authorization gate, and talks to
/// the credential store. Login flows live in [`crate::flow`], session
/// resolution in [`crate::session`], account management in
/// [`crate::registration`] and [`crate::manage`].
pub struct AuthService {
    pub(crate) store: Arc<dyn CredentialStore>,
    pub(crate) hasher: Arc<dyn SecretHasher>,
    pub(crate) issuer: TokenIssuer,
    pub(crate) verifier: TokenVerifier,
    pub(crate) revocations: Arc<dyn RevocationStore>,
    pub(crate) gate: AuthorizationGate,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: AuthConfig,
    pub(crate) dummy_digest: String,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("gate", &self.gate)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn builder(store: Arc<dyn CredentialStore>, secret: impl Into<Vec<u8>>) -> AuthServiceBuilder {
        AuthServiceBuilder::new(store, secret)
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn gate(&self) -> &AuthorizationGate {
        &self.gate
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Hashes a secret on the blocking pool.
    pub(crate) async fn hash_secret(&self, secret: String) -> Result<String, AuthError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&secret))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))?
    }

    /// Verifies a secret on the blocking pool. A failed task never matches.
    pub(crate) async fn verify_secret(&self, secret: String, digest: String) -> bool {
        let hasher = self.hasher.clone();
        match tokio::task::spawn_blocking(move || hasher.verify(&secret, &digest)).await {
            Ok(matched) => matched,
            Err(e) => {
                error!(target: "gepn::auth", error = %e, "secret verification task failed");
                false
            }
        }
    }

    /// Drops revocation entries whose tokens have expired.
    pub fn sweep_revocations(&self) -> usize {
        let evicted = self.revocations.evict_expired(self.clock.now());
        if evicted > 0 {
            debug!(target: "gepn::auth", evicted, "swept revocation list");
        }
        evicted
    }
}

/// Builder for [`AuthService`].
pub struct AuthServiceBuilder {
    store: Arc<dyn CredentialStore>,
    secret: Vec<u8>,
    hasher: Option<Arc<dyn SecretHasher>>,
    clock: Option<Arc<dyn Clock>>,
    revocations: Option<Arc<dyn RevocationStore>>,
    config: AuthConfig,
}

impl AuthServiceBuilder {
    pub fn new(store: Arc<dyn CredentialStore>, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            store,
            secret: secret.into(),
            hasher: None,
            clock: None,
            revocations: None,
            config: AuthConfig::default(),
        }
    }

    pub fn hasher(mut self, hasher: Arc<dyn SecretHasher>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn revocations(mut self, revocations: Arc<dyn RevocationStore>) -> Self {
        self.revocations = Some(revocations);
        self
    }

    pub fn config(mut self, config: AuthConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<AuthService, AuthError> {
        if self.secret.is_empty() {
            return Err(AuthError::Internal("token signing secret is empty".to_owned()));
        }

        let hasher = self
            .hasher
            .unwrap_or_else(|| Arc::new(Argon2Hasher::new()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let revocations = self
            .revocations
            .unwrap_or_else(|| Arc::new(MemoryRevocationStore::new()));
        let dummy_digest = hasher.hash(DUMMY_SECRET)?;

        Ok(AuthService {
            store: self.store,
            issuer: TokenIssuer::new(&self.secret, clock.clone()),
            verifier: TokenVerifier::new(&self.secret, clock.clone(), revocations.clone()),
            gate: AuthorizationGate::new(self.config.super_username.clone()),
            hasher,
            revocations,
            clock,
            config: self.config,
            dummy_digest,
        })
    }
}
