//! Administrator management and duty closing.

use gepn_primitives::{AdminProfile, Capability, DutyRecord, IdentityId, IdentityKind};
use gepn_storage::AdminUpdate;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::info;

use crate::{AuthError, AuthService, Session, registration::parse_permissions};

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePermissionsRequest {
    #[serde(default)]
    pub permisos: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetActiveRequest {
    pub activo: bool,
}

/// A module guarded by a capability, as listed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleInfo {
    pub id: Capability,
    pub nombre: &'static str,
}

/// Every module, in declaration order.
pub fn modules() -> Vec<ModuleInfo> {
    Capability::iter()
        .map(|id| ModuleInfo {
            id,
            nombre: id.label(),
        })
        .collect()
}

fn not_found() -> AuthError {
    AuthError::NotFound("Usuario master no encontrado".to_owned())
}

impl AuthService {
    /// Lists administrators visible to the session.
    ///
    /// A regional administrator only sees administrators of its own region.
    pub async fn list_admins(&self, session: &Session) -> Result<Vec<AdminProfile>, AuthError> {
        self.gate.ensure_admin(&session.principal)?;
        let admins = self.store.list_admins().await?;

        let own = (!self.gate.is_super(&session.principal))
            .then_some(session.principal.region.as_ref())
            .flatten();
        Ok(admins
            .iter()
            .filter(|admin| own.is_none_or(|own| admin.region.as_ref() == Some(own)))
            .map(AdminProfile::from)
            .collect())
    }

    /// Replaces an administrator's capability set.
    pub async fn update_permissions(
        &self,
        session: &Session,
        id: IdentityId,
        request: UpdatePermissionsRequest,
    ) -> Result<AdminProfile, AuthError> {
        self.gate.ensure_super(&session.principal)?;
        let permissions = parse_permissions(&request.permisos)?;

        self.store.admin_by_id(id).await?.ok_or_else(not_found)?;
        let updated = self
            .store
            .update_admin(id, AdminUpdate::Permissions(permissions))
            .await?;
        info!(
            target: "gepn::auth",
            admin = %id,
            permissions = ?updated.permissions,
            by = %session.principal.login_key,
            "administrator permissions updated"
        );
        Ok(AdminProfile::from(&updated))
    }

    /// Activates or deactivates an administrator. An administrator cannot
    /// deactivate itself.
    pub async fn set_admin_active(
        &self,
        session: &Session,
        id: IdentityId,
        request: SetActiveRequest,
    ) -> Result<AdminProfile, AuthError> {
        self.gate.ensure_super(&session.principal)?;
        if id == session.principal.id && !request.activo {
            return Err(AuthError::forbidden("No puede desactivar su propia cuenta"));
        }

        self.store.admin_by_id(id).await?.ok_or_else(not_found)?;
        let updated = self
            .store
            .update_admin(id, AdminUpdate::Active(request.activo))
            .await?;
        info!(
            target: "gepn::auth",
            admin = %id,
            active = request.activo,
            by = %session.principal.login_key,
            "administrator status changed"
        );
        Ok(AdminProfile::from(&updated))
    }

    /// Ends an officer's duty and revokes the session token.
    ///
    /// Succeeds when there is no open duty.
    pub async fn finalize_duty(&self, session: &Session) -> Result<Option<DutyRecord>, AuthError> {
        session.ensure_kind(&[IdentityKind::Funcionario, IdentityKind::Patrullaje])?;

        let closed = self
            .store
            .close_active_duty(session.principal.id, self.clock.now())
            .await?;
        self.logout(session);
        info!(
            target: "gepn::auth",
            officer = %session.principal.id,
            closed = closed.is_some(),
            "duty finalized"
        );
        Ok(closed)
    }
}
