use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gepn_primitives::{Identity, IdentityKind, OfficerRecord, PatrolProfile};
use gepn_storage::{CredentialStore, StoreError};
use serde::{Deserialize, Serialize};

use super::{CredentialScheme, FlowContext, require_fields};
use crate::{AuthError, IssuedToken};

/// Length of a patrol PIN.
pub const PIN_LENGTH: usize = 6;

/// Checks that `pin` is exactly six ASCII digits.
pub fn validate_pin(pin: &str) -> Result<(), AuthError> {
    if pin.len() != PIN_LENGTH {
        return Err(AuthError::malformed("PIN debe tener 6 dígitos"));
    }
    if !pin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AuthError::malformed("PIN debe contener solo números"));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatrolLoginRequest {
    #[serde(default)]
    pub credencial: String,
    #[serde(default)]
    pub pin: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatrolLoginResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: PatrolProfile,
    pub token: String,
    pub expira: DateTime<Utc>,
}

/// Officer login from a patrol unit with credential and 6-digit PIN.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatrolLogin;

#[async_trait]
impl CredentialScheme for PatrolLogin {
    type Request = PatrolLoginRequest;
    type Record = OfficerRecord;
    type Enrichment = ();
    type Response = PatrolLoginResponse;

    const KIND: IdentityKind = IdentityKind::Patrullaje;
    const REJECTION: &'static str = "Credencial o PIN incorrectos";
    const INACTIVE: &'static str = "Funcionario inactivo";

    fn precheck(&self, request: &PatrolLoginRequest) -> Result<(), AuthError> {
        require_fields(
            &[request.credencial.as_str(), request.pin.as_str()],
            "Credencial y PIN son obligatorios",
        )?;
        validate_pin(&request.pin)
    }

    fn login_key<'r>(&self, request: &'r PatrolLoginRequest) -> &'r str {
        request.credencial.trim()
    }

    fn secret<'r>(&self, request: &'r PatrolLoginRequest) -> &'r str {
        &request.pin
    }

    async fn lookup(
        &self,
        store: &dyn CredentialStore,
        key: &str,
    ) -> Result<Option<OfficerRecord>, StoreError> {
        store.officer_by_credential(key).await
    }

    fn identity(&self, record: &OfficerRecord) -> Identity {
        Identity::PatrolUnit(record.clone())
    }

    fn digest<'a>(&self, record: &'a OfficerRecord) -> Result<&'a str, AuthError> {
        record
            .pin_hash
            .as_deref()
            .filter(|d| !d.is_empty())
            .ok_or(AuthError::PinNotConfigured)
    }

    async fn enrich(&self, _: FlowContext<'_>, _: &OfficerRecord, _: &PatrolLoginRequest) {}

    fn respond(&self, record: OfficerRecord, token: IssuedToken, _: ()) -> PatrolLoginResponse {
        PatrolLoginResponse {
            success: true,
            message: "Login exitoso",
            data: PatrolProfile::from(&record),
            token: token.token,
            expira: token.expires_at,
        }
    }
}
