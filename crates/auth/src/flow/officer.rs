use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gepn_primitives::{DutyRecord, Identity, IdentityKind, OfficerProfile, OfficerRecord};
use gepn_storage::{CredentialStore, StoreError};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{CredentialScheme, FlowContext, require_fields};
use crate::{AuthError, IssuedToken};

/// Officer login with credential and password (or PIN).
#[derive(Debug, Clone, Deserialize)]
pub struct OfficerLoginRequest {
    #[serde(default)]
    pub credencial: String,
    #[serde(default)]
    pub pin: Option<String>,
    #[serde(default, rename = "contraseña", alias = "password")]
    pub contrasena: Option<String>,
    #[serde(default)]
    pub latitud: f64,
    #[serde(default)]
    pub longitud: f64,
}

impl OfficerLoginRequest {
    /// The PIN field, falling back to the password.
    fn secret(&self) -> &str {
        self.pin
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.contrasena.as_deref())
            .unwrap_or_default()
    }

    fn has_position(&self) -> bool {
        self.latitud != 0.0 && self.longitud != 0.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OfficerLoginResponse {
    pub token: String,
    pub expira: DateTime<Utc>,
    pub usuario: OfficerProfile,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OfficerLogin;

#[async_trait]
impl CredentialScheme for OfficerLogin {
    type Request = OfficerLoginRequest;
    type Record = OfficerRecord;
    type Enrichment = Option<DutyRecord>;
    type Response = OfficerLoginResponse;

    const KIND: IdentityKind = IdentityKind::Funcionario;
    const REJECTION: &'static str = "Credenciales inválidas";

    fn precheck(&self, request: &Self::Request) -> Result<(), AuthError> {
        require_fields(&[request.credencial.as_str()], "La credencial es obligatoria")?;
        require_fields(&[request.secret()], "La contraseña es obligatoria")
    }

    fn login_key<'r>(&self, request: &'r Self::Request) -> &'r str {
        request.credencial.trim()
    }

    fn secret<'r>(&self, request: &'r Self::Request) -> &'r str {
        request.secret()
    }

    async fn lookup(
        &self,
        store: &dyn CredentialStore,
        key: &str,
    ) -> Result<Option<OfficerRecord>, StoreError> {
        store.officer_by_credential(key).await
    }

    fn identity(&self, record: &OfficerRecord) -> Identity {
        Identity::Officer(record.clone())
    }

    fn digest<'a>(&self, record: &'a OfficerRecord) -> Result<&'a str, AuthError> {
        Ok(&record.password_hash)
    }

    /// Opens a duty record when the device reported a position.
    async fn enrich(
        &self,
        ctx: FlowContext<'_>,
        record: &OfficerRecord,
        request: &OfficerLoginRequest,
    ) -> Option<DutyRecord> {
        if !request.has_position() {
            return None;
        }

        let duty = DutyRecord::open(record.id, request.latitud, request.longitud, ctx.clock.now());
        match ctx.store.open_duty(duty.clone()).await {
            Ok(()) => Some(duty),
            Err(e) => {
                warn!(target: "gepn::auth", officer = %record.id, error = %e, "failed to open duty record");
                None
            }
        }
    }

    fn respond(
        &self,
        record: OfficerRecord,
        token: IssuedToken,
        duty: Option<DutyRecord>,
    ) -> OfficerLoginResponse {
        let mut usuario = OfficerProfile::from(&record);
        if let Some(duty) = &duty {
            usuario = usuario.with_duty(duty);
        }
        OfficerLoginResponse {
            token: token.token,
            expira: token.expires_at,
            usuario,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{UnauthorizedReason, service::testing::*};
    use assert_matches::assert_matches;

    fn request(credencial: &str, password: &str) -> OfficerLoginRequest {
        OfficerLoginRequest {
            credencial: credencial.into(),
            pin: None,
            contrasena: Some(password.into()),
            latitud: 10.4806,
            longitud: -66.9036,
        }
    }

    #[tokio::test]
    async fn login_opens_duty_and_issues_token() {
        let h = harness();
        let officer = seed_officer(&h.store, "POL001", "secreto1", None, true).await;

        let response = h
            .service
            .login(&OfficerLogin, request("POL001", "secreto1"))
            .await
            .unwrap();

        assert_eq!(response.usuario.credencial, "POL001");
        assert!(response.usuario.en_guardia);
        assert_eq!(response.usuario.latitud, Some(10.4806));

        let duty = h.store.active_duty(officer.id).await.unwrap().unwrap();
        assert_eq!(duty.longitude, -66.9036);

        let session = h
            .service
            .authenticate(Some(&format!("Bearer {}", response.token)))
            .await
            .unwrap();
        assert_eq!(session.principal.id, officer.id);
        assert_eq!(session.kind(), IdentityKind::Funcionario);
        assert!(session.principal.permissions.is_empty());
    }

    #[tokio::test]
    async fn zero_position_skips_duty() {
        let h = harness();
        let officer = seed_officer(&h.store, "POL001", "secreto1", None, true).await;

        let mut req = request("POL001", "secreto1");
        req.latitud = 0.0;
        let response = h.service.login(&OfficerLogin, req).await.unwrap();

        assert!(!response.usuario.en_guardia);
        assert!(h.store.active_duty(officer.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn pin_field_is_accepted() {
        let h = harness();
        seed_officer(&h.store, "POL001", "123456", None, true).await;

        let req: OfficerLoginRequest =
            serde_json::from_str(r#"{"credencial":"POL001","pin":"123456"}"#).unwrap();
        assert!(h.service.login(&OfficerLogin, req).await.is_ok());
    }

    #[tokio::test]
    async fn pin_field_takes_precedence() {
        let h = harness();
        seed_officer(&h.store, "POL001", "secreto1", None, true).await;

        let req: OfficerLoginRequest = serde_json::from_str(
            r#"{"credencial":"POL001","pin":"secreto1","contraseña":"otra-clave"}"#,
        )
        .unwrap();
        assert!(h.service.login(&OfficerLogin, req).await.is_ok());

        let req: OfficerLoginRequest = serde_json::from_str(
            r#"{"credencial":"POL001","pin":"otra-clave","contraseña":"secreto1"}"#,
        )
        .unwrap();
        assert_matches!(
            h.service.login(&OfficerLogin, req).await,
            Err(AuthError::InvalidCredentials(_))
        );

        let req: OfficerLoginRequest = serde_json::from_str(
            r#"{"credencial":"POL001","pin":"","contraseña":"secreto1"}"#,
        )
        .unwrap();
        assert!(h.service.login(&OfficerLogin, req).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_key_and_wrong_secret_are_indistinguishable() {
        let h = harness();
        seed_officer(&h.store, "POL001", "secreto1", None, true).await;

        let wrong = h
            .service
            .login(&OfficerLogin, request("POL001", "incorrecta"))
            .await
            .unwrap_err();
        let unknown = h
            .service
            .login(&OfficerLogin, request("POL999", "incorrecta"))
            .await
            .unwrap_err();

        assert_eq!(wrong.code(), unknown.code());
        assert_eq!(wrong.client_message(), unknown.client_message());
        assert_matches!(wrong, AuthError::InvalidCredentials("Credenciales inválidas"));
    }

    #[tokio::test]
    async fn inactive_officer_is_forbidden() {
        let h = harness();
        seed_officer(&h.store, "POL001", "secreto1", None, false).await;

        assert_matches!(
            h.service.login(&OfficerLogin, request("POL001", "secreto1")).await,
            Err(AuthError::Inactive("Usuario inactivo"))
        );
    }

    #[tokio::test]
    async fn missing_password() {
        let h = harness();
        let req: OfficerLoginRequest = serde_json::from_str(r#"{"credencial":"POL001"}"#).unwrap();
        assert_matches!(
            h.service.login(&OfficerLogin, req).await,
            Err(AuthError::Malformed(ref m)) if m == "La contraseña es obligatoria"
        );
        assert_matches!(
            h.service.authenticate(None).await,
            Err(AuthError::Unauthorized(UnauthorizedReason::Missing))
        );
    }
}
