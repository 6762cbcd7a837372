use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gepn_primitives::{CitizenProfile, CitizenRecord, Identity, IdentityKind};
use gepn_storage::{CredentialStore, StoreError};
use serde::{Deserialize, Serialize};

use super::{CredentialScheme, FlowContext, require_fields};
use crate::{AuthError, IssuedToken};

#[derive(Debug, Clone, Deserialize)]
pub struct CitizenLoginRequest {
    #[serde(default)]
    pub cedula: String,
    #[serde(default, rename = "contraseña", alias = "password")]
    pub contrasena: String,
}

/// Response of citizen login and registration.
#[derive(Debug, Clone, Serialize)]
pub struct CitizenAuthResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: CitizenProfile,
    pub token: String,
    pub expira: DateTime<Utc>,
}

impl CitizenAuthResponse {
    pub(crate) fn new(message: &'static str, record: &CitizenRecord, token: IssuedToken) -> Self {
        Self {
            success: true,
            message,
            data: CitizenProfile::from(record),
            token: token.token,
            expira: token.expires_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CitizenLogin;

#[async_trait]
impl CredentialScheme for CitizenLogin {
    type Request = CitizenLoginRequest;
    type Record = CitizenRecord;
    type Enrichment = ();
    type Response = CitizenAuthResponse;

    const KIND: IdentityKind = IdentityKind::Ciudadano;
    const REJECTION: &'static str = "Cédula o contraseña incorrectos";

    fn precheck(&self, request: &CitizenLoginRequest) -> Result<(), AuthError> {
        require_fields(
            &[request.cedula.as_str(), request.contrasena.as_str()],
            "Cédula y contraseña son requeridos",
        )
    }

    fn login_key<'r>(&self, request: &'r CitizenLoginRequest) -> &'r str {
        request.cedula.trim()
    }

    fn secret<'r>(&self, request: &'r CitizenLoginRequest) -> &'r str {
        &request.contrasena
    }

    async fn lookup(
        &self,
        store: &dyn CredentialStore,
        key: &str,
    ) -> Result<Option<CitizenRecord>, StoreError> {
        store.citizen_by_national_id(key).await
    }

    fn identity(&self, record: &CitizenRecord) -> Identity {
        Identity::Citizen(record.clone())
    }

    fn digest<'a>(&self, record: &'a CitizenRecord) -> Result<&'a str, AuthError> {
        Ok(&record.password_hash)
    }

    async fn enrich(&self, _: FlowContext<'_>, _: &CitizenRecord, _: &CitizenLoginRequest) {}

    fn respond(&self, record: CitizenRecord, token: IssuedToken, _: ()) -> CitizenAuthResponse {
        CitizenAuthResponse::new("Login exitoso", &record, token)
    }
}
