//! Request authentication: bearer token to live session.

use chrono::{DateTime, Utc};
use gepn_primitives::{Identity, IdentityKind, Principal};
use gepn_storage::StoreError;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{AuthError, AuthService, Claims, UnauthorizedReason, extract_bearer};

const INACTIVE: &str = "Usuario inactivo";

/// An authenticated request context.
#[derive(Debug, Clone)]
pub struct Session {
    /// Live principal, or the token snapshot when `degraded` is set.
    pub principal: Principal,
    /// The live identity. `None` only in degraded mode.
    pub identity: Option<Identity>,
    pub token_id: Uuid,
    pub expires_at: DateTime<Utc>,
    /// True when the live identity could not be fetched and the token
    /// snapshot was used instead.
    pub degraded: bool,
}

impl Session {
    pub const fn kind(&self) -> IdentityKind {
        self.principal.kind
    }

    /// Fails unless the session belongs to one of `kinds`.
    pub fn ensure_kind(&self, kinds: &[IdentityKind]) -> Result<(), AuthError> {
        if kinds.contains(&self.principal.kind) {
            Ok(())
        } else {
            Err(AuthError::forbidden("Tipo de sesión no permitido para esta operación"))
        }
    }
}

impl AuthService {
    /// Resolves an `Authorization` header value into a session.
    ///
    /// The token must verify, be unexpired and unrevoked. The identity is then
    /// re-fetched so that permission changes and deactivation take effect
    /// immediately.
    pub async fn authenticate(&self, header: Option<&str>) -> Result<Session, AuthError> {
        let token = extract_bearer(header)?;
        let claims = self.verifier.verify(token).map_err(|e| {
            debug!(target: "gepn::auth", error = %e, "token rejected");
            AuthError::from(e)
        })?;

        match self.live_identity(&claims).await {
            Ok(Some(identity)) => {
                if !identity.is_active() {
                    debug!(target: "gepn::auth", subject = %claims.sub, kind = %claims.kind, "session for inactive identity");
                    return Err(AuthError::Inactive(INACTIVE));
                }
                Ok(Session {
                    principal: identity.principal(),
                    identity: Some(identity),
                    token_id: claims.jti,
                    expires_at: claims.expires_at(),
                    degraded: false,
                })
            }
            Ok(None) => self.degrade(claims, UnauthorizedReason::UnknownSubject),
            Err(e) => {
                warn!(target: "gepn::auth", subject = %claims.sub, error = %e, "live identity fetch failed");
                self.degrade(claims, UnauthorizedReason::StoreUnavailable)
            }
        }
    }

    /// Authenticates and requires an administrator session.
    pub async fn authenticate_admin(&self, header: Option<&str>) -> Result<Session, AuthError> {
        let session = self.authenticate(header).await?;
        self.gate.ensure_admin(&session.principal)?;
        Ok(session)
    }

    async fn live_identity(&self, claims: &Claims) -> Result<Option<Identity>, StoreError> {
        let id = claims.sub;
        Ok(match claims.kind {
            IdentityKind::Funcionario => self.store.officer_by_id(id).await?.map(Identity::Officer),
            IdentityKind::Patrullaje => self.store.officer_by_id(id).await?.map(Identity::PatrolUnit),
            IdentityKind::Master => self.store.admin_by_id(id).await?.map(Identity::Administrator),
            IdentityKind::Ciudadano => self.store.citizen_by_id(id).await?.map(Identity::Citizen),
        })
    }

    fn degrade(&self, claims: Claims, reason: UnauthorizedReason) -> Result<Session, AuthError> {
        if !self.config.degraded_mode {
            return Err(AuthError::Unauthorized(reason));
        }

        warn!(
            target: "gepn::auth",
            subject = %claims.sub,
            kind = %claims.kind,
            %reason,
            "DEGRADED MODE: live identity unavailable, authorizing from token snapshot"
        );
        Ok(Session {
            principal: claims.principal(),
            identity: None,
            token_id: claims.jti,
            expires_at: claims.expires_at(),
            degraded: true,
        })
    }

    /// Revokes the session's token until it would have expired.
    pub fn logout(&self, session: &Session) {
        self.revocations.revoke(session.token_id, session.expires_at);
        debug!(target: "gepn::auth", subject = %session.principal.id, "session ended");
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::*;
    use crate::{AuthConfig, service::testing::*};
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use chrono::TimeDelta;
    use gepn_primitives::{
        AdminRecord, Capability, CapabilitySet, CitizenRecord, DutyRecord, IdentityId,
        OfficerRecord,
    };
    use gepn_storage::{AdminUpdate, CredentialStore, TimeoutStore};

    fn bearer(token: &str) -> String {
        format!("Bearer {token}")
    }

    #[tokio::test]
    async fn live_permissions_replace_snapshot() {
        let h = harness();
        let admin = seed_admin(&h.store, "regional", "secreto1", &[Capability::Rrhh], None).await;

        let token = h
            .service
            .issuer
            .issue(&Identity::Administrator(admin.clone()).principal(), Duration::from_secs(600))
            .unwrap();

        h.store
            .update_admin(
                admin.id,
                AdminUpdate::Permissions(CapabilitySet::from([Capability::Minutas])),
            )
            .await
            .unwrap();

        let session = h.service.authenticate(Some(&bearer(&token.token))).await.unwrap();
        assert!(!session.degraded);
        assert!(!session.principal.permissions.contains(Capability::Rrhh));
        assert!(session.principal.permissions.contains(Capability::Minutas));
        assert!(!h.service.gate().require(&session.principal, Capability::Rrhh));
    }

    #[tokio::test]
    async fn deactivated_identity_is_forbidden() {
        let h = harness();
        let admin = seed_admin(&h.store, "regional", "secreto1", &[Capability::Rrhh], None).await;
        let token = h
            .service
            .issuer
            .issue(&Identity::Administrator(admin.clone()).principal(), Duration::from_secs(600))
            .unwrap();

        h.store.update_admin(admin.id, AdminUpdate::Active(false)).await.unwrap();
        assert_matches!(
            h.service.authenticate(Some(&token.token)).await,
            Err(AuthError::Inactive(_))
        );
    }

    #[tokio::test]
    async fn expired_token_is_unauthorized() {
        let h = harness();
        let citizen = seed_citizen(&h.store, "V1", "secreto1", true).await;
        let token = h
            .service
            .issuer
            .issue(&Identity::Citizen(citizen).principal(), Duration::from_secs(60))
            .unwrap();

        h.clock.advance(TimeDelta::seconds(60));
        assert_matches!(
            h.service.authenticate(Some(&token.token)).await,
            Err(AuthError::Unauthorized(UnauthorizedReason::Expired))
        );
    }

    #[tokio::test]
    async fn logout_revokes_token() {
        let h = harness();
        let citizen = seed_citizen(&h.store, "V1", "secreto1", true).await;
        let token = h
            .service
            .issuer
            .issue(&Identity::Citizen(citizen).principal(), Duration::from_secs(60))
            .unwrap();

        let session = h.service.authenticate(Some(&token.token)).await.unwrap();
        h.service.logout(&session);
        assert_matches!(
            h.service.authenticate(Some(&token.token)).await,
            Err(AuthError::Unauthorized(UnauthorizedReason::Revoked))
        );

        h.clock.advance(TimeDelta::seconds(61));
        assert_eq!(h.service.sweep_revocations(), 1);
    }

    #[tokio::test]
    async fn deleted_subject_is_unauthorized_without_degraded_mode() {
        let h = harness();
        let ghost = Principal {
            id: IdentityId::new(),
            kind: IdentityKind::Funcionario,
            login_key: "POL404".into(),
            permissions: CapabilitySet::empty(),
            region: None,
        };
        let token = h.service.issuer.issue(&ghost, Duration::from_secs(60)).unwrap();
        assert_matches!(
            h.service.authenticate(Some(&token.token)).await,
            Err(AuthError::Unauthorized(UnauthorizedReason::UnknownSubject))
        );
    }

    #[tokio::test]
    async fn degraded_mode_uses_snapshot() {
        let h = harness_with(AuthConfig {
            degraded_mode: true,
            ..AuthConfig::default()
        });
        let ghost = Principal {
            id: IdentityId::new(),
            kind: IdentityKind::Master,
            login_key: "regional".into(),
            permissions: CapabilitySet::from([Capability::Panico]),
            region: None,
        };
        let token = h.service.issuer.issue(&ghost, Duration::from_secs(60)).unwrap();

        let session = h.service.authenticate(Some(&token.token)).await.unwrap();
        assert!(session.degraded);
        assert!(session.identity.is_none());
        assert_eq!(session.principal, ghost);
    }

    #[tokio::test]
    async fn missing_header() {
        let h = harness();
        assert_matches!(
            h.service.authenticate(None).await,
            Err(AuthError::Unauthorized(UnauthorizedReason::Missing))
        );
        assert_matches!(
            h.service.authenticate(Some("Bearer garbage")).await,
            Err(AuthError::Unauthorized(UnauthorizedReason::Invalid))
        );
    }

    #[tokio::test]
    async fn citizen_is_not_admin() {
        let h = harness();
        let citizen = seed_citizen(&h.store, "V1", "secreto1", true).await;
        let token = h
            .service
            .issuer
            .issue(&Identity::Citizen(citizen).principal(), Duration::from_secs(60))
            .unwrap();
        assert_matches!(
            h.service.authenticate_admin(Some(&token.token)).await,
            Err(AuthError::Forbidden(_))
        );
    }

    /// A store whose admin lookups always fail.
    struct BrokenAdmins(Arc<gepn_storage::MemoryCredentialStore>);

    #[async_trait]
    impl CredentialStore for BrokenAdmins {
        async fn insert_officer(&self, r: OfficerRecord) -> Result<(), StoreError> {
            self.0.insert_officer(r).await
        }
        async fn officer_by_credential(&self, c: &str) -> Result<Option<OfficerRecord>, StoreError> {
            self.0.officer_by_credential(c).await
        }
        async fn officer_by_id(&self, id: IdentityId) -> Result<Option<OfficerRecord>, StoreError> {
            self.0.officer_by_id(id).await
        }
        async fn insert_admin(&self, r: AdminRecord) -> Result<(), StoreError> {
            self.0.insert_admin(r).await
        }
        async fn admin_by_username(&self, u: &str) -> Result<Option<AdminRecord>, StoreError> {
            self.0.admin_by_username(u).await
        }
        async fn admin_by_id(&self, _: IdentityId) -> Result<Option<AdminRecord>, StoreError> {
            Err(StoreError::Timeout(Duration::from_secs(5)))
        }
        async fn list_admins(&self) -> Result<Vec<AdminRecord>, StoreError> {
            self.0.list_admins().await
        }
        async fn update_admin(&self, id: IdentityId, u: AdminUpdate) -> Result<AdminRecord, StoreError> {
            self.0.update_admin(id, u).await
        }
        async fn insert_citizen(&self, r: CitizenRecord) -> Result<(), StoreError> {
            self.0.insert_citizen(r).await
        }
        async fn citizen_by_national_id(&self, n: &str) -> Result<Option<CitizenRecord>, StoreError> {
            self.0.citizen_by_national_id(n).await
        }
        async fn citizen_by_id(&self, id: IdentityId) -> Result<Option<CitizenRecord>, StoreError> {
            self.0.citizen_by_id(id).await
        }
        async fn open_duty(&self, r: DutyRecord) -> Result<(), StoreError> {
            self.0.open_duty(r).await
        }
        async fn close_active_duty(
            &self,
            id: IdentityId,
            at: DateTime<Utc>,
        ) -> Result<Option<DutyRecord>, StoreError> {
            self.0.close_active_duty(id, at).await
        }
        async fn active_duty(&self, id: IdentityId) -> Result<Option<DutyRecord>, StoreError> {
            self.0.active_duty(id).await
        }
    }

    #[tokio::test]
    async fn store_failure_fails_closed() {
        let inner = Arc::new(gepn_storage::MemoryCredentialStore::new());
        let store = Arc::new(TimeoutStore::new(BrokenAdmins(inner), Duration::from_secs(1)));
        let service = AuthService::builder(store, SECRET)
            .hasher(Arc::new(crate::password::test_hasher()))
            .build()
            .unwrap();

        let principal = Principal {
            id: IdentityId::new(),
            kind: IdentityKind::Master,
            login_key: "admin".into(),
            permissions: CapabilitySet::all(),
            region: None,
        };
        let token = service.issuer.issue(&principal, Duration::from_secs(60)).unwrap();
        assert_matches!(
            service.authenticate(Some(&token.token)).await,
            Err(AuthError::Unauthorized(UnauthorizedReason::StoreUnavailable))
        );
    }
}
