//! Capability and scope checks.
//!
//! Every check is a pure function of the principal and the gate's
//! configuration. Only administrators hold capabilities or a scope, so every
//! check denies other identity variants.

use gepn_primitives::{Capability, Principal, Region};

use crate::AuthError;

/// Default username of the super-administrator.
pub const DEFAULT_SUPER_USERNAME: &str = "admin";

#[derive(Debug, Clone)]
pub struct AuthorizationGate {
    super_username: String,
}

impl Default for AuthorizationGate {
    fn default() -> Self {
        Self::new(DEFAULT_SUPER_USERNAME)
    }
}

impl AuthorizationGate {
    pub fn new(super_username: impl Into<String>) -> Self {
        Self {
            super_username: super_username.into(),
        }
    }

    pub fn super_username(&self) -> &str {
        &self.super_username
    }

    /// True only for the configured super-administrator. Holding every
    /// capability does not lift an administrator's regional scope.
    pub fn is_super(&self, principal: &Principal) -> bool {
        principal.is_admin() && principal.login_key == self.super_username
    }

    /// True iff the principal may use the module guarded by `capability`.
    pub fn require(&self, principal: &Principal, capability: Capability) -> bool {
        principal.is_admin()
            && (self.is_super(principal) || principal.permissions.contains(capability))
    }

    /// True iff the principal may act on a resource labelled `resource`.
    ///
    /// An administrator without a region has global scope.
    pub fn require_scope(&self, principal: &Principal, resource: Option<&Region>) -> bool {
        if !principal.is_admin() {
            return false;
        }
        if self.is_super(principal) {
            return true;
        }
        match (&principal.region, resource) {
            (None, _) => true,
            (Some(own), Some(resource)) => own == resource,
            (Some(_), None) => false,
        }
    }

    pub fn ensure_admin(&self, principal: &Principal) -> Result<(), AuthError> {
        if principal.is_admin() {
            Ok(())
        } else {
            Err(AuthError::forbidden("Se requiere un usuario master"))
        }
    }

    pub fn ensure_super(&self, principal: &Principal) -> Result<(), AuthError> {
        if self.is_super(principal) {
            Ok(())
        } else {
            Err(AuthError::forbidden("Solo el administrador puede realizar esta acción"))
        }
    }

    pub fn ensure_capability(
        &self,
        principal: &Principal,
        capability: Capability,
    ) -> Result<(), AuthError> {
        if self.require(principal, capability) {
            Ok(())
        } else {
            Err(AuthError::forbidden(format!(
                "No tiene permisos para acceder al módulo {}",
                capability.as_str()
            )))
        }
    }

    pub fn ensure_scope(
        &self,
        principal: &Principal,
        resource: Option<&Region>,
    ) -> Result<(), AuthError> {
        if self.require_scope(principal, resource) {
            Ok(())
        } else {
            Err(AuthError::forbidden("No tiene acceso a este estado"))
        }
    }
}
