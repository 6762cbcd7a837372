//! Signed, expiring session tokens.
//!
//! Tokens are HS256 JWTs. The signing secret is fixed when the issuer and
//! verifier are built and never changes afterwards.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, TimeDelta, Utc};
use gepn_primitives::{CapabilitySet, IdentityId, IdentityKind, Principal, Region};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{AuthError, Clock, RevocationStore, UnauthorizedReason};

/// Claims carried by every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: IdentityId,
    pub kind: IdentityKind,
    /// Login key at issuance.
    pub key: String,
    /// Permission snapshot at issuance.
    pub perms: CapabilitySet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
}

impl Claims {
    /// The principal snapshot embedded in the token.
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.sub,
            kind: self.kind,
            login_key: self.key.clone(),
            permissions: self.perms.clone(),
            region: self.region.clone(),
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// A freshly issued token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
    #[error("token expired")]
    Expired,
    #[error("token revoked")]
    Revoked,
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        let reason = match err {
            TokenError::Invalid(_) => UnauthorizedReason::Invalid,
            TokenError::Expired => UnauthorizedReason::Expired,
            TokenError::Revoked => UnauthorizedReason::Revoked,
        };
        Self::Unauthorized(reason)
    }
}

/// Signs session tokens.
pub struct TokenIssuer {
    key: EncodingKey,
    header: Header,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer").finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(secret: &[u8], clock: Arc<dyn Clock>) -> Self {
        Self {
            key: EncodingKey::from_secret(secret),
            header: Header::new(Algorithm::HS256),
            clock,
        }
    }

    /// Issues a token for `principal` valid for `ttl`.
    pub fn issue(&self, principal: &Principal, ttl: Duration) -> Result<IssuedToken, AuthError> {
        let ttl = TimeDelta::from_std(ttl)
            .map_err(|e| AuthError::Internal(format!("token ttl out of range: {e}")))?;
        let issued_at = self.clock.now();
        let expires_at = issued_at + ttl;
        let jti = Uuid::new_v4();

        let claims = Claims {
            sub: principal.id,
            kind: principal.kind,
            key: principal.login_key.clone(),
            perms: principal.permissions.clone(),
            region: principal.region.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti,
        };
        let token = jsonwebtoken::encode(&self.header, &claims, &self.key)
            .map_err(|e| AuthError::Internal(format!("token signing failed: {e}")))?;

        Ok(IssuedToken {
            token,
            jti,
            issued_at,
            expires_at,
        })
    }
}

/// Checks signature, expiry and revocation of session tokens.
///
/// Expiry is evaluated against the injected [`Clock`] rather than by the JWT
/// library, so tests can move time.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
    revocations: Arc<dyn RevocationStore>,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier").finish_non_exhaustive()
    }
}

impl TokenVerifier {
    pub fn new(
        secret: &[u8],
        clock: Arc<dyn Clock>,
        revocations: Arc<dyn RevocationStore>,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
            clock,
            revocations,
        }
    }

    /// Returns the claims of a valid token.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation)?;
        let claims = data.claims;

        if self.clock.now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }
        if self.revocations.is_revoked(&claims.jti) {
            return Err(TokenError::Revoked);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ManualClock, MemoryRevocationStore};
    use assert_matches::assert_matches;
    use gepn_primitives::Capability;

    const SECRET: &[u8] = b"test-secret";

    fn principal() -> Principal {
        Principal {
            id: IdentityId::new(),
            kind: IdentityKind::Master,
            login_key: "regional".into(),
            permissions: CapabilitySet::from([Capability::Rrhh, Capability::Minutas]),
            region: Some(Region::new("Miranda")),
        }
    }

    fn pair(clock: Arc<ManualClock>) -> (TokenIssuer, TokenVerifier, Arc<MemoryRevocationStore>) {
        let revocations = Arc::new(MemoryRevocationStore::new());
        (
            TokenIssuer::new(SECRET, clock.clone()),
            TokenVerifier::new(SECRET, clock, revocations.clone()),
            revocations,
        )
    }

    #[test]
    fn round_trip() {
        let clock = Arc::new(ManualClock::default());
        let (issuer, verifier, _) = pair(clock.clone());
        let principal = principal();

        let issued = issuer.issue(&principal, Duration::from_secs(60)).unwrap();
        clock.advance(TimeDelta::seconds(1));

        let claims = verifier.verify(&issued.token).unwrap();
        assert_eq!(claims.principal(), principal);
        assert_eq!(claims.jti, issued.jti);
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn expiry_is_exclusive() {
        let clock = Arc::new(ManualClock::default());
        let (issuer, verifier, _) = pair(clock.clone());

        let issued = issuer.issue(&principal(), Duration::from_secs(60)).unwrap();
        clock.advance(TimeDelta::seconds(59));
        assert!(verifier.verify(&issued.token).is_ok());

        clock.advance(TimeDelta::seconds(1));
        assert_matches!(verifier.verify(&issued.token), Err(TokenError::Expired));
    }

    #[test]
    fn revoked_token_is_rejected() {
        let clock = Arc::new(ManualClock::default());
        let (issuer, verifier, revocations) = pair(clock);

        let issued = issuer.issue(&principal(), Duration::from_secs(60)).unwrap();
        revocations.revoke(issued.jti, issued.expires_at);
        assert_matches!(verifier.verify(&issued.token), Err(TokenError::Revoked));
    }

    #[test]
    fn forged_and_garbage_tokens_are_invalid() {
        let clock = Arc::new(ManualClock::default());
        let (_, verifier, _) = pair(clock.clone());
        let forger = TokenIssuer::new(b"another-secret", clock);

        let forged = forger.issue(&principal(), Duration::from_secs(60)).unwrap();
        assert_matches!(verifier.verify(&forged.token), Err(TokenError::Invalid(_)));
        assert_matches!(verifier.verify("not.a.token"), Err(TokenError::Invalid(_)));
        assert_matches!(verifier.verify(""), Err(TokenError::Invalid(_)));
    }

    #[test]
    fn unknown_permission_in_claims_is_invalid() {
        let clock = Arc::new(ManualClock::default());
        let (_, verifier, _) = pair(clock.clone());

        let now = clock.now().timestamp();
        let claims = serde_json::json!({
            "sub": IdentityId::new(),
            "kind": "master",
            "key": "admin",
            "perms": ["rrhh", "superuser"],
            "iat": now,
            "exp": now + 60,
            "jti": Uuid::new_v4(),
        });
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        assert_matches!(verifier.verify(&token), Err(TokenError::Invalid(_)));
    }
}
