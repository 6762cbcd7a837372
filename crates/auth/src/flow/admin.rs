use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gepn_primitives::{AdminProfile, AdminRecord, Identity, IdentityKind};
use gepn_storage::{AdminUpdate, CredentialStore, StoreError};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{CredentialScheme, FlowContext, require_fields};
use crate::{AuthError, IssuedToken};

#[derive(Debug, Clone, Deserialize)]
pub struct AdminLoginRequest {
    #[serde(default)]
    pub usuario: String,
    #[serde(default, alias = "contraseña")]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminLoginResponse {
    pub token: String,
    pub expira: DateTime<Utc>,
    pub master: AdminProfile,
    pub mensaje: &'static str,
}

/// Administrator ("master") login.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminLogin;

#[async_trait]
impl CredentialScheme for AdminLogin {
    type Request = AdminLoginRequest;
    type Record = AdminRecord;
    /// The record with its refreshed last access time, when the update stuck.
    type Enrichment = Option<AdminRecord>;
    type Response = AdminLoginResponse;

    const KIND: IdentityKind = IdentityKind::Master;
    const REJECTION: &'static str = "Usuario o contraseña incorrectos";

    fn precheck(&self, request: &AdminLoginRequest) -> Result<(), AuthError> {
        require_fields(
            &[request.usuario.as_str(), request.password.as_str()],
            "Usuario y contraseña son requeridos",
        )
    }

    fn login_key<'r>(&self, request: &'r AdminLoginRequest) -> &'r str {
        request.usuario.trim()
    }

    fn secret<'r>(&self, request: &'r AdminLoginRequest) -> &'r str {
        &request.password
    }

    async fn lookup(
        &self,
        store: &dyn CredentialStore,
        key: &str,
    ) -> Result<Option<AdminRecord>, StoreError> {
        store.admin_by_username(key).await
    }

    fn identity(&self, record: &AdminRecord) -> Identity {
        Identity::Administrator(record.clone())
    }

    fn digest<'a>(&self, record: &'a AdminRecord) -> Result<&'a str, AuthError> {
        Ok(&record.password_hash)
    }

    async fn enrich(
        &self,
        ctx: FlowContext<'_>,
        record: &AdminRecord,
        _request: &AdminLoginRequest,
    ) -> Option<AdminRecord> {
        let now = ctx.clock.now();
        match ctx.store.update_admin(record.id, AdminUpdate::LastAccess(now)).await {
            Ok(updated) => Some(updated),
            Err(e) => {
                warn!(target: "gepn::auth", admin = %record.id, error = %e, "failed to record last access");
                None
            }
        }
    }

    fn respond(
        &self,
        record: AdminRecord,
        token: IssuedToken,
        updated: Option<AdminRecord>,
    ) -> AdminLoginResponse {
        let record = updated.unwrap_or(record);
        AdminLoginResponse {
            token: token.token,
            expira: token.expires_at,
            master: AdminProfile::from(&record),
            mensaje: "Login exitoso",
        }
    }
}
