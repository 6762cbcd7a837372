use serde::{Deserialize, Serialize};

use crate::{AdminRecord, CapabilitySet, CitizenRecord, IdentityId, OfficerRecord, Region};

/// Which credential scheme an identity authenticated through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(strum::IntoStaticStr, strum::EnumString, strum::EnumIter, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IdentityKind {
    /// Officer password login.
    Funcionario,
    /// Administrator login.
    Master,
    Ciudadano,
    /// Officer PIN login from a patrol unit.
    Patrullaje,
}

impl IdentityKind {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// An authenticable identity, as loaded from the credential store.
#[derive(Clone, Debug, PartialEq)]
pub enum Identity {
    Officer(OfficerRecord),
    Administrator(AdminRecord),
    Citizen(CitizenRecord),
    /// The same officer record, reached through the patrol PIN scheme.
    PatrolUnit(OfficerRecord),
}

impl Identity {
    pub const fn kind(&self) -> IdentityKind {
        match self {
            Self::Officer(_) => IdentityKind::Funcionario,
            Self::Administrator(_) => IdentityKind::Master,
            Self::Citizen(_) => IdentityKind::Ciudadano,
            Self::PatrolUnit(_) => IdentityKind::Patrullaje,
        }
    }

    pub const fn id(&self) -> IdentityId {
        match self {
            Self::Officer(o) | Self::PatrolUnit(o) => o.id,
            Self::Administrator(a) => a.id,
            Self::Citizen(c) => c.id,
        }
    }

    /// The unique key this identity logs in with.
    pub fn login_key(&self) -> &str {
        match self {
            Self::Officer(o) | Self::PatrolUnit(o) => &o.credential,
            Self::Administrator(a) => &a.username,
            Self::Citizen(c) => &c.national_id,
        }
    }

    pub const fn is_active(&self) -> bool {
        match self {
            Self::Officer(o) | Self::PatrolUnit(o) => o.active,
            Self::Administrator(a) => a.active,
            Self::Citizen(c) => c.active,
        }
    }

    /// Projects the identity onto its authorization-relevant fields.
    ///
    /// Only administrators carry capability tags and a scope region.
    pub fn principal(&self) -> Principal {
        let (permissions, region) = match self {
            Self::Administrator(a) => (a.permissions.clone(), a.region.clone()),
            _ => (CapabilitySet::empty(), None),
        };
        Principal {
            id: self.id(),
            kind: self.kind(),
            login_key: self.login_key().to_owned(),
            permissions,
            region,
        }
    }
}

/// The authorization-relevant projection of an identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: IdentityId,
    pub kind: IdentityKind,
    pub login_key: String,
    pub permissions: CapabilitySet,
    pub region: Option<Region>,
}

impl Principal {
    pub const fn is_admin(&self) -> bool {
        matches!(self.kind, IdentityKind::Master)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Capability;
    use chrono::Utc;

    fn admin(region: Option<&str>) -> AdminRecord {
        AdminRecord {
            id: IdentityId::new(),
            username: "regional".into(),
            email: "regional@gepn.gob.ve".into(),
            name: "Regional".into(),
            password_hash: "digest".into(),
            permissions: CapabilitySet::from([Capability::Rrhh]),
            region: region.map(Region::from),
            active: true,
            created_by: None,
            created_at: Utc::now(),
            last_access: None,
        }
    }

    fn citizen() -> CitizenRecord {
        CitizenRecord {
            id: IdentityId::new(),
            national_id: "V12345678".into(),
            name: "Ana".into(),
            phone: "0414".into(),
            password_hash: "digest".into(),
            active: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn admin_principal_carries_permissions() {
        let record = admin(Some("Miranda"));
        let principal = Identity::Administrator(record.clone()).principal();
        assert!(principal.is_admin());
        assert_eq!(principal.kind, IdentityKind::Master);
        assert_eq!(principal.login_key, "regional");
        assert_eq!(principal.permissions, record.permissions);
        assert_eq!(principal.region, Some(Region::new("Miranda")));
    }

    #[test]
    fn citizen_principal_has_no_capabilities() {
        let identity = Identity::Citizen(citizen());
        let principal = identity.principal();
        assert!(!principal.is_admin());
        assert!(principal.permissions.is_empty());
        assert!(principal.region.is_none());
        assert!(!identity.is_active());
        assert_eq!(identity.login_key(), "V12345678");
    }

    #[test]
    fn kind_wire_names() {
        assert_eq!(IdentityKind::Patrullaje.as_str(), "patrullaje");
        assert_eq!(
            serde_json::to_string(&IdentityKind::Master).unwrap(),
            r#""master""#
        );
        assert_eq!("ciudadano".parse::<IdentityKind>().unwrap(), IdentityKind::Ciudadano);
    }
}
