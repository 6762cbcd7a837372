//! Record tables shared by the memory and file backends.
//!
//! All methods are synchronous and expect the caller to hold the backend's
//! write lock for mutations, which makes each check-then-insert atomic.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use gepn_primitives::{AdminRecord, CitizenRecord, DutyRecord, IdentityId, OfficerRecord};
use serde::{Deserialize, Serialize};

use crate::{AdminUpdate, StoreError};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub(crate) struct Tables {
    #[serde(default)]
    officers: HashMap<IdentityId, OfficerRecord>,
    #[serde(default)]
    admins: HashMap<IdentityId, AdminRecord>,
    #[serde(default)]
    citizens: HashMap<IdentityId, CitizenRecord>,
    #[serde(default)]
    duties: HashMap<IdentityId, DutyRecord>,
}

fn conflict(field: &'static str) -> StoreError {
    StoreError::Conflict { field }
}

impl Tables {
    pub(crate) fn insert_officer(&mut self, record: OfficerRecord) -> Result<(), StoreError> {
        for existing in self.officers.values() {
            if existing.credential == record.credential {
                return Err(conflict("credential"));
            }
            if existing.national_id == record.national_id {
                return Err(conflict("national_id"));
            }
        }
        self.officers.insert(record.id, record);
        Ok(())
    }

    pub(crate) fn officer_by_credential(&self, credential: &str) -> Option<OfficerRecord> {
        self.officers
            .values()
            .find(|o| o.credential == credential)
            .cloned()
    }

    pub(crate) fn officer_by_id(&self, id: IdentityId) -> Option<OfficerRecord> {
        self.officers.get(&id).cloned()
    }

    pub(crate) fn insert_admin(&mut self, record: AdminRecord) -> Result<(), StoreError> {
        for existing in self.admins.values() {
            if existing.username == record.username {
                return Err(conflict("username"));
            }
            if existing.email.eq_ignore_ascii_case(&record.email) {
                return Err(conflict("email"));
            }
        }
        self.admins.insert(record.id, record);
        Ok(())
    }

    pub(crate) fn admin_by_username(&self, username: &str) -> Option<AdminRecord> {
        self.admins
            .values()
            .find(|a| a.username == username)
            .cloned()
    }

    pub(crate) fn admin_by_id(&self, id: IdentityId) -> Option<AdminRecord> {
        self.admins.get(&id).cloned()
    }

    /// Administrators ordered by creation time.
    pub(crate) fn list_admins(&self) -> Vec<AdminRecord> {
        let mut admins: Vec<_> = self.admins.values().cloned().collect();
        admins.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        admins
    }

    pub(crate) fn update_admin(
        &mut self,
        id: IdentityId,
        update: AdminUpdate,
    ) -> Result<AdminRecord, StoreError> {
        let admin = self.admins.get_mut(&id).ok_or(StoreError::NotFound)?;
        match update {
            AdminUpdate::Permissions(permissions) => admin.permissions = permissions,
            AdminUpdate::Active(active) => admin.active = active,
            AdminUpdate::LastAccess(at) => admin.last_access = Some(at),
        }
        Ok(admin.clone())
    }

    pub(crate) fn insert_citizen(&mut self, record: CitizenRecord) -> Result<(), StoreError> {
        if self
            .citizens
            .values()
            .any(|c| c.national_id == record.national_id)
        {
            return Err(conflict("national_id"));
        }
        self.citizens.insert(record.id, record);
        Ok(())
    }

    pub(crate) fn citizen_by_national_id(&self, national_id: &str) -> Option<CitizenRecord> {
        self.citizens
            .values()
            .find(|c| c.national_id == national_id)
            .cloned()
    }

    pub(crate) fn citizen_by_id(&self, id: IdentityId) -> Option<CitizenRecord> {
        self.citizens.get(&id).cloned()
    }

    pub(crate) fn open_duty(&mut self, record: DutyRecord) {
        self.close_active_duty(record.officer_id, record.started_at);
        self.duties.insert(record.id, record);
    }

    pub(crate) fn close_active_duty(
        &mut self,
        officer_id: IdentityId,
        at: DateTime<Utc>,
    ) -> Option<DutyRecord> {
        let duty = self
            .duties
            .values_mut()
            .find(|d| d.active && d.officer_id == officer_id)?;
        duty.close(at);
        Some(duty.clone())
    }

    pub(crate) fn active_duty(&self, officer_id: IdentityId) -> Option<DutyRecord> {
        self.duties
            .values()
            .find(|d| d.active && d.officer_id == officer_id)
            .cloned()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use fixtures::*;
    use gepn_primitives::{Capability, CapabilitySet};

    #[test]
    fn officer_uniqueness() {
        let mut tables = Tables::default();
        tables.insert_officer(officer("POL001", "V1")).unwrap();

        assert_matches!(
            tables.insert_officer(officer("POL001", "V2")),
            Err(StoreError::Conflict { field: "credential" })
        );
        assert_matches!(
            tables.insert_officer(officer("POL002", "V1")),
            Err(StoreError::Conflict { field: "national_id" })
        );
        tables.insert_officer(officer("POL002", "V2")).unwrap();
    }

    #[test]
    fn admin_email_uniqueness_ignores_case() {
        let mut tables = Tables::default();
        tables.insert_admin(admin("admin", "admin@gepn.gob.ve")).unwrap();
        assert_matches!(
            tables.insert_admin(admin("other", "ADMIN@gepn.gob.ve")),
            Err(StoreError::Conflict { field: "email" })
        );
    }

    #[test]
    fn update_admin() {
        let mut tables = Tables::default();
        let record = admin("regional", "r@gepn.gob.ve");
        let id = record.id;
        tables.insert_admin(record).unwrap();

        let updated = tables
            .update_admin(id, AdminUpdate::Permissions(CapabilitySet::from([Capability::Minutas])))
            .unwrap();
        assert!(!updated.permissions.is_full());
        assert_eq!(tables.admin_by_id(id).unwrap().permissions, updated.permissions);

        assert_matches!(
            tables.update_admin(IdentityId::new(), AdminUpdate::Active(false)),
            Err(StoreError::NotFound)
        );
    }

    #[test]
    fn reopening_duty_closes_previous() {
        let mut tables = Tables::default();
        let officer_id = IdentityId::new();
        let now = Utc::now();

        let first = DutyRecord::open(officer_id, 1.0, 1.0, now);
        let first_id = first.id;
        tables.open_duty(first);
        tables.open_duty(DutyRecord::open(officer_id, 2.0, 2.0, now));

        let active = tables.active_duty(officer_id).unwrap();
        assert_ne!(active.id, first_id);
        assert_eq!(active.latitude, 2.0);

        assert!(tables.close_active_duty(officer_id, now).is_some());
        assert!(tables.close_active_duty(officer_id, now).is_none());
        assert!(tables.active_duty(officer_id).is_none());
    }
}
