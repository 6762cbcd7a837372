//! Sanitized views of identities.
//!
//! None of these types has a field for a secret digest, so a handler can only
//! ever serialize what is listed here.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    AdminRecord, CapabilitySet, CitizenRecord, DutyRecord, Identity, IdentityId, OfficerRecord,
    Region,
};

/// Unit label reported for patrol logins.
const PATROL_UNIT: &str = "Patrullaje";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OfficerProfile {
    pub id: IdentityId,
    pub credencial: String,
    pub cedula: String,
    pub nombre: String,
    pub apellido: String,
    pub rango: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unidad: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<Region>,
    pub activo: bool,
    pub en_guardia: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitud: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitud: Option<f64>,
}

impl OfficerProfile {
    /// Marks the profile as on duty at the duty record's coordinates.
    pub fn with_duty(mut self, duty: &DutyRecord) -> Self {
        self.en_guardia = duty.active;
        self.latitud = Some(duty.latitude);
        self.longitud = Some(duty.longitude);
        self
    }
}

impl From<&OfficerRecord> for OfficerProfile {
    fn from(o: &OfficerRecord) -> Self {
        Self {
            id: o.id,
            credencial: o.credential.clone(),
            cedula: o.national_id.clone(),
            nombre: o.first_name.clone(),
            apellido: o.last_name.clone(),
            rango: o.rank.clone(),
            unidad: o.unit.clone(),
            estado: o.region.clone(),
            activo: o.active,
            en_guardia: false,
            latitud: None,
            longitud: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AdminProfile {
    pub id: IdentityId,
    pub usuario: String,
    pub email: String,
    pub nombre: String,
    pub permisos: CapabilitySet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<Region>,
    pub activo: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creado_por: Option<String>,
    pub fecha_creacion: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ultimo_acceso: Option<DateTime<Utc>>,
}

impl From<&AdminRecord> for AdminProfile {
    fn from(a: &AdminRecord) -> Self {
        Self {
            id: a.id,
            usuario: a.username.clone(),
            email: a.email.clone(),
            nombre: a.name.clone(),
            permisos: a.permissions.clone(),
            estado: a.region.clone(),
            activo: a.active,
            creado_por: a.created_by.clone(),
            fecha_creacion: a.created_at,
            ultimo_acceso: a.last_access,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CitizenProfile {
    pub id: IdentityId,
    pub nombre: String,
    pub cedula: String,
    pub telefono: String,
}

impl From<&CitizenRecord> for CitizenProfile {
    fn from(c: &CitizenRecord) -> Self {
        Self {
            id: c.id,
            nombre: c.name.clone(),
            cedula: c.national_id.clone(),
            telefono: c.phone.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PatrolProfile {
    pub id: IdentityId,
    pub nombre: String,
    pub apellido: String,
    pub credencial: String,
    pub rango: String,
    pub unidad: &'static str,
}

impl From<&OfficerRecord> for PatrolProfile {
    fn from(o: &OfficerRecord) -> Self {
        Self {
            id: o.id,
            nombre: o.first_name.clone(),
            apellido: o.last_name.clone(),
            credencial: o.credential.clone(),
            rango: o.rank.clone(),
            unidad: PATROL_UNIT,
        }
    }
}

/// Profile of any identity variant.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IdentityProfile {
    Officer(OfficerProfile),
    Administrator(AdminProfile),
    Citizen(CitizenProfile),
    PatrolUnit(PatrolProfile),
}

impl From<&Identity> for IdentityProfile {
    fn from(identity: &Identity) -> Self {
        match identity {
            Identity::Officer(o) => Self::Officer(o.into()),
            Identity::Administrator(a) => Self::Administrator(a.into()),
            Identity::Citizen(c) => Self::Citizen(c.into()),
            Identity::PatrolUnit(o) => Self::PatrolUnit(o.into()),
        }
    }
}
