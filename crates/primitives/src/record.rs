//! Stored records.
//!
//! These carry secret digests and are only ever serialized to the credential
//! store. Outward views live in [`crate::profile`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CapabilitySet, IdentityId, Region};

/// Closed list of officer ranks accepted at registration.
pub const VALID_RANKS: &[&str] = &[
    "Oficial",
    "Primer Oficial",
    "Oficial Jefe",
    "Inspector",
    "Primer Inspector",
    "Inspector Jefe",
    "Comisario",
    "Primer Comisario",
    "Comisario Jefe",
    "Comisario General",
    "Comisario Mayor",
    "Comisario Superior",
    "Subcomisario",
    "Comisario General de Brigada",
    "Comisario General de División",
    "Comisario General Inspector",
    "Comisario General en Jefe",
];

/// Returns true if `rank` is one of [`VALID_RANKS`].
pub fn is_valid_rank(rank: &str) -> bool {
    VALID_RANKS.contains(&rank)
}

/// A police officer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerRecord {
    pub id: IdentityId,
    /// Badge credential, the login key. Unique.
    pub credential: String,
    /// National identity number. Unique.
    pub national_id: String,
    pub first_name: String,
    pub last_name: String,
    pub rank: String,
    /// Assigned unit or station.
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub region: Option<Region>,
    pub password_hash: String,
    /// Digest of the 6-digit patrol PIN, if one was configured.
    #[serde(default)]
    pub pin_hash: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// A system administrator ("master" user).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRecord {
    pub id: IdentityId,
    /// Login key. Unique.
    pub username: String,
    /// Unique.
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub permissions: CapabilitySet,
    #[serde(default)]
    pub region: Option<Region>,
    pub active: bool,
    /// Username of the administrator that created this one.
    #[serde(default)]
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_access: Option<DateTime<Utc>>,
}

/// A registered citizen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitizenRecord {
    pub id: IdentityId,
    /// National identity number, the login key. Unique.
    pub national_id: String,
    pub name: String,
    pub phone: String,
    pub password_hash: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// An officer's on-duty session, opened at login with coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DutyRecord {
    pub id: IdentityId,
    pub officer_id: IdentityId,
    pub started_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    pub active: bool,
}

impl DutyRecord {
    /// Opens a new active duty record.
    pub fn open(officer_id: IdentityId, latitude: f64, longitude: f64, now: DateTime<Utc>) -> Self {
        Self {
            id: IdentityId::new(),
            officer_id,
            started_at: now,
            latitude,
            longitude,
            ended_at: None,
            active: true,
        }
    }

    /// Marks the record finished.
    pub fn close(&mut self, now: DateTime<Utc>) {
        self.active = false;
        self.ended_at = Some(now);
    }
}
