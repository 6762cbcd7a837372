//! Account creation: citizen self-registration, administrator creation, HR
//! officer registration and the super-administrator bootstrap.

use gepn_primitives::{
    AdminProfile, AdminRecord, Capability, CapabilitySet, CitizenRecord, Identity, IdentityId,
    OfficerProfile, OfficerRecord, Region, is_valid_rank,
};
use gepn_storage::AdminUpdate;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    AuthError, AuthService, Session,
    flow::{CitizenAuthResponse, require_fields, validate_pin},
};

/// Minimum length of a password, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::malformed(
            "La contraseña debe tener al menos 6 caracteres",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
pub struct CitizenRegistrationRequest {
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub cedula: String,
    #[serde(default)]
    pub telefono: String,
    #[serde(default, rename = "contraseña", alias = "password")]
    pub contrasena: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAdminRequest {
    #[serde(default)]
    pub usuario: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub nombre: String,
    #[serde(default, alias = "contraseña")]
    pub password: String,
    #[serde(default)]
    pub permisos: Vec<String>,
    #[serde(default)]
    pub estado: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OfficerRegistrationRequest {
    #[serde(default)]
    pub credencial: String,
    #[serde(default)]
    pub cedula: String,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub apellido: String,
    #[serde(default)]
    pub rango: String,
    #[serde(default)]
    pub unidad: Option<String>,
    #[serde(default)]
    pub estado: Option<String>,
    #[serde(default, rename = "contraseña", alias = "password")]
    pub contrasena: String,
    /// Optional patrol PIN.
    #[serde(default)]
    pub pin: Option<String>,
}

/// What the super-administrator bootstrap did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Created,
    Reactivated,
    Unchanged,
}

/// Parses permission tags, rejecting unknown ones with a client message.
pub(crate) fn parse_permissions(tags: &[String]) -> Result<CapabilitySet, AuthError> {
    if tags.is_empty() {
        return Err(AuthError::malformed("Debe asignar al menos un permiso"));
    }
    CapabilitySet::parse(tags).map_err(|e| AuthError::malformed(format!("Permiso inválido: {}", e.0)))
}

impl AuthService {
    /// Registers a citizen and logs them in.
    pub async fn register_citizen(
        &self,
        request: CitizenRegistrationRequest,
    ) -> Result<CitizenAuthResponse, AuthError> {
        require_fields(
            &[
                request.nombre.as_str(),
                request.cedula.as_str(),
                request.telefono.as_str(),
                request.contrasena.as_str(),
            ],
            "Todos los campos son requeridos",
        )?;
        validate_password(&request.contrasena)?;

        let record = CitizenRecord {
            id: IdentityId::new(),
            national_id: request.cedula.trim().to_owned(),
            name: request.nombre.trim().to_owned(),
            phone: request.telefono.trim().to_owned(),
            password_hash: self.hash_secret(request.contrasena).await?,
            active: true,
            created_at: self.clock.now(),
        };
        // Uniqueness is enforced by the store inside the insert.
        self.store.insert_citizen(record.clone()).await?;
        info!(target: "gepn::auth", citizen = %record.id, "citizen registered");

        let identity = Identity::Citizen(record.clone());
        let token = self
            .issuer
            .issue(&identity.principal(), self.config.ttl(identity.kind()))?;
        Ok(CitizenAuthResponse::new(
            "Usuario registrado correctamente",
            &record,
            token,
        ))
    }

    /// Creates an administrator. Only the super-identity may do this.
    pub async fn create_admin(
        &self,
        session: &Session,
        request: CreateAdminRequest,
    ) -> Result<AdminProfile, AuthError> {
        self.gate.ensure_super(&session.principal)?;

        require_fields(&[request.usuario.as_str()], "El nombre de usuario es obligatorio")?;
        require_fields(&[request.email.as_str()], "El email es obligatorio")?;
        validate_password(&request.password)?;
        let permissions = parse_permissions(&request.permisos)?;

        let username = request.usuario.trim().to_owned();
        let record = AdminRecord {
            id: IdentityId::new(),
            name: if request.nombre.trim().is_empty() {
                username.clone()
            } else {
                request.nombre.trim().to_owned()
            },
            username,
            email: request.email.trim().to_owned(),
            password_hash: self.hash_secret(request.password).await?,
            permissions,
            region: Region::from_optional(request.estado),
            active: true,
            created_by: Some(session.principal.login_key.clone()),
            created_at: self.clock.now(),
            last_access: None,
        };
        self.store.insert_admin(record.clone()).await?;
        info!(
            target: "gepn::auth",
            admin = %record.id,
            username = %record.username,
            created_by = %session.principal.login_key,
            "administrator created"
        );
        Ok(AdminProfile::from(&record))
    }

    /// Registers an officer. Requires the `rrhh` capability and scope over the
    /// officer's region.
    pub async fn register_officer(
        &self,
        session: &Session,
        request: OfficerRegistrationRequest,
    ) -> Result<OfficerProfile, AuthError> {
        self.gate.ensure_capability(&session.principal, Capability::Rrhh)?;

        require_fields(&[request.credencial.as_str()], "La credencial es obligatoria")?;
        require_fields(&[request.cedula.as_str()], "La cédula es obligatoria")?;
        validate_password(&request.contrasena)?;
        if !is_valid_rank(request.rango.trim()) {
            return Err(AuthError::malformed("Rango inválido"));
        }
        let pin = request.pin.filter(|p| !p.is_empty());
        if let Some(pin) = &pin {
            validate_pin(pin)?;
        }

        let region = Region::from_optional(request.estado);
        self.gate.ensure_scope(&session.principal, region.as_ref())?;

        let pin_hash = match pin {
            Some(pin) => Some(self.hash_secret(pin).await?),
            None => None,
        };
        let record = OfficerRecord {
            id: IdentityId::new(),
            credential: request.credencial.trim().to_owned(),
            national_id: request.cedula.trim().to_owned(),
            first_name: request.nombre.trim().to_owned(),
            last_name: request.apellido.trim().to_owned(),
            rank: request.rango.trim().to_owned(),
            unit: request.unidad.filter(|u| !u.trim().is_empty()),
            region,
            password_hash: self.hash_secret(request.contrasena).await?,
            pin_hash,
            active: true,
            created_at: self.clock.now(),
        };
        self.store.insert_officer(record.clone()).await?;
        info!(
            target: "gepn::auth",
            officer = %record.id,
            credential = %record.credential,
            registered_by = %session.principal.login_key,
            "officer registered"
        );
        Ok(OfficerProfile::from(&record))
    }

    /// Makes sure the super-administrator exists, is active and holds every
    /// capability.
    pub async fn bootstrap_super_admin(&self, password: &str) -> Result<BootstrapOutcome, AuthError> {
        let username = self.gate.super_username().to_owned();

        if let Some(existing) = self.store.admin_by_username(&username).await? {
            let mut outcome = BootstrapOutcome::Unchanged;
            if !existing.permissions.is_full() {
                self.store
                    .update_admin(existing.id, AdminUpdate::Permissions(CapabilitySet::all()))
                    .await?;
                outcome = BootstrapOutcome::Reactivated;
            }
            if !existing.active {
                self.store
                    .update_admin(existing.id, AdminUpdate::Active(true))
                    .await?;
                outcome = BootstrapOutcome::Reactivated;
            }
            if outcome == BootstrapOutcome::Reactivated {
                warn!(target: "gepn::auth", %username, "super administrator restored");
            }
            return Ok(outcome);
        }

        let record = AdminRecord {
            id: IdentityId::new(),
            username: username.clone(),
            email: format!("{username}@gepn.gob.ve"),
            name: "Administrador del Sistema".to_owned(),
            password_hash: self.hash_secret(password.to_owned()).await?,
            permissions: CapabilitySet::all(),
            region: None,
            active: true,
            created_by: None,
            created_at: self.clock.now(),
            last_access: None,
        };
        self.store.insert_admin(record).await?;
        info!(target: "gepn::auth", %username, "super administrator created");
        Ok(BootstrapOutcome::Created)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{flow::AdminLogin, flow::AdminLoginRequest, service::testing::*};
    use assert_matches::assert_matches;
    use gepn_storage::CredentialStore;

    fn citizen_request(cedula: &str) -> CitizenRegistrationRequest {
        CitizenRegistrationRequest {
            nombre: "Ana".into(),
            cedula: cedula.into(),
            telefono: "04141234567".into(),
            contrasena: "secreto1".into(),
        }
    }

    async fn admin_session(h: &Harness, username: &str, perms: &[Capability], region: Option<&str>) -> Session {
        let admin = seed_admin(&h.store, username, "secreto1", perms, region).await;
        let token = h
            .service
            .issuer
            .issue(&Identity::Administrator(admin).principal(), std::time::Duration::from_secs(600))
            .unwrap();
        h.service.authenticate(Some(&token.token)).await.unwrap()
    }

    fn officer_request(credencial: &str, estado: Option<&str>) -> OfficerRegistrationRequest {
        OfficerRegistrationRequest {
            credencial: credencial.into(),
            cedula: format!("V-{credencial}"),
            nombre: "Luis".into(),
            apellido: "Pérez".into(),
            rango: "Inspector".into(),
            unidad: None,
            estado: estado.map(str::to_owned),
            contrasena: "secreto1".into(),
            pin: Some("123456".into()),
        }
    }

    #[tokio::test]
    async fn citizen_registration_hashes_password() {
        let h = harness();
        let response = h.service.register_citizen(citizen_request("V1")).await.unwrap();
        assert!(response.success);

        let stored = h.store.citizen_by_national_id("V1").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "secreto1");
        assert!(stored.password_hash.starts_with("$argon2id$"));

        let session = h.service.authenticate(Some(&response.token)).await.unwrap();
        assert_eq!(session.principal.id, stored.id);
    }

    #[tokio::test]
    async fn citizen_registration_validates() {
        let h = harness();
        let mut req = citizen_request("V1");
        req.contrasena = "12345".into();
        assert_matches!(h.service.register_citizen(req).await, Err(AuthError::Malformed(_)));

        let mut req = citizen_request("V1");
        req.telefono = " ".into();
        assert_matches!(
            h.service.register_citizen(req).await,
            Err(AuthError::Malformed(ref m)) if m == "Todos los campos son requeridos"
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_registration_conflicts() {
        let h = harness();
        let service = Arc::new(h.service);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.register_citizen(citizen_request("V777")).await })
            })
            .collect();

        let mut successes = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(AuthError::Conflict(_)) => conflicts += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(conflicts, 7);
    }

    #[tokio::test]
    async fn create_admin_requires_super() {
        let h = harness();
        let regional = admin_session(&h, "regional", &[Capability::Rrhh], None).await;

        let request = CreateAdminRequest {
            usuario: "nuevo".into(),
            email: "nuevo@gepn.gob.ve".into(),
            nombre: String::new(),
            password: "secreto1".into(),
            permisos: vec!["minutas".into()],
            estado: Some("Lara".into()),
        };
        assert_matches!(
            h.service.create_admin(&regional, request.clone()).await,
            Err(AuthError::Forbidden(_))
        );

        let root = admin_session(&h, "admin", &[], None).await;
        let profile = h.service.create_admin(&root, request.clone()).await.unwrap();
        assert_eq!(profile.usuario, "nuevo");
        assert_eq!(profile.creado_por.as_deref(), Some("admin"));
        assert_eq!(profile.estado, Some(Region::new("Lara")));

        assert_matches!(
            h.service.create_admin(&root, request).await,
            Err(AuthError::Conflict(_))
        );
    }

    #[tokio::test]
    async fn create_admin_rejects_unknown_permission() {
        let h = harness();
        let root = admin_session(&h, "admin", &[], None).await;
        let request = CreateAdminRequest {
            usuario: "nuevo".into(),
            email: "nuevo@gepn.gob.ve".into(),
            nombre: "Nuevo".into(),
            password: "secreto1".into(),
            permisos: vec!["minutas".into(), "finanzas".into()],
            estado: None,
        };
        assert_matches!(
            h.service.create_admin(&root, request).await,
            Err(AuthError::Malformed(ref m)) if m == "Permiso inválido: finanzas"
        );
    }

    #[tokio::test]
    async fn officer_registration_requires_rrhh() {
        let h = harness();
        let without = admin_session(&h, "minutas", &[Capability::Minutas], None).await;
        assert_matches!(
            h.service.register_officer(&without, officer_request("POL001", None)).await,
            Err(AuthError::Forbidden(_))
        );

        let with = admin_session(&h, "rrhh", &[Capability::Rrhh], None).await;
        let profile = h
            .service
            .register_officer(&with, officer_request("POL001", None))
            .await
            .unwrap();
        assert_eq!(profile.rango, "Inspector");

        let stored = h.store.officer_by_credential("POL001").await.unwrap().unwrap();
        assert!(stored.pin_hash.is_some());

        assert_matches!(
            h.service.register_officer(&with, officer_request("POL001", None)).await,
            Err(AuthError::Conflict(ref m)) if m == "La credencial ya está registrada"
        );
    }

    #[tokio::test]
    async fn officer_registration_respects_scope() {
        let h = harness();
        let regional = admin_session(&h, "rrhh-miranda", &[Capability::Rrhh], Some("Miranda")).await;

        assert_matches!(
            h.service
                .register_officer(&regional, officer_request("POL001", Some("Zulia")))
                .await,
            Err(AuthError::Forbidden(_))
        );
        assert!(h
            .service
            .register_officer(&regional, officer_request("POL002", Some("Miranda")))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn officer_registration_validates_rank() {
        let h = harness();
        let root = admin_session(&h, "admin", &[], None).await;
        let mut request = officer_request("POL001", None);
        request.rango = "Sargento".into();
        assert_matches!(
            h.service.register_officer(&root, request).await,
            Err(AuthError::Malformed(ref m)) if m == "Rango inválido"
        );
    }

    #[tokio::test]
    async fn bootstrap_is_idempotent_and_reactivates() {
        let h = harness();
        assert_eq!(
            h.service.bootstrap_super_admin("Admin123!").await.unwrap(),
            BootstrapOutcome::Created
        );
        assert_eq!(
            h.service.bootstrap_super_admin("Admin123!").await.unwrap(),
            BootstrapOutcome::Unchanged
        );

        let admin = h.store.admin_by_username("admin").await.unwrap().unwrap();
        assert!(admin.permissions.is_full());
        h.store.update_admin(admin.id, AdminUpdate::Active(false)).await.unwrap();
        assert_eq!(
            h.service.bootstrap_super_admin("Admin123!").await.unwrap(),
            BootstrapOutcome::Reactivated
        );

        let login = h
            .service
            .login(
                &AdminLogin,
                AdminLoginRequest {
                    usuario: "admin".into(),
                    password: "Admin123!".into(),
                },
            )
            .await;
        assert!(login.is_ok());
    }
}
