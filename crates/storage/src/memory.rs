//! In-memory credential store (does not persist across restarts).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gepn_primitives::{AdminRecord, CitizenRecord, DutyRecord, IdentityId, OfficerRecord};
use parking_lot::RwLock;

use crate::{AdminUpdate, CredentialStore, StoreError, tables::Tables};

/// In-memory credential store for development and tests.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    tables: RwLock<Tables>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn insert_officer(&self, record: OfficerRecord) -> Result<(), StoreError> {
        self.tables.write().insert_officer(record)
    }

    async fn officer_by_credential(
        &self,
        credential: &str,
    ) -> Result<Option<OfficerRecord>, StoreError> {
        Ok(self.tables.read().officer_by_credential(credential))
    }

    async fn officer_by_id(&self, id: IdentityId) -> Result<Option<OfficerRecord>, StoreError> {
        Ok(self.tables.read().officer_by_id(id))
    }

    async fn insert_admin(&self, record: AdminRecord) -> Result<(), StoreError> {
        self.tables.write().insert_admin(record)
    }

    async fn admin_by_username(&self, username: &str) -> Result<Option<AdminRecord>, StoreError> {
        Ok(self.tables.read().admin_by_username(username))
    }

    async fn admin_by_id(&self, id: IdentityId) -> Result<Option<AdminRecord>, StoreError> {
        Ok(self.tables.read().admin_by_id(id))
    }

    async fn list_admins(&self) -> Result<Vec<AdminRecord>, StoreError> {
        Ok(self.tables.read().list_admins())
    }

    async fn update_admin(
        &self,
        id: IdentityId,
        update: AdminUpdate,
    ) -> Result<AdminRecord, StoreError> {
        self.tables.write().update_admin(id, update)
    }

    async fn insert_citizen(&self, record: CitizenRecord) -> Result<(), StoreError> {
        self.tables.write().insert_citizen(record)
    }

    async fn citizen_by_national_id(
        &self,
        national_id: &str,
    ) -> Result<Option<CitizenRecord>, StoreError> {
        Ok(self.tables.read().citizen_by_national_id(national_id))
    }

    async fn citizen_by_id(&self, id: IdentityId) -> Result<Option<CitizenRecord>, StoreError> {
        Ok(self.tables.read().citizen_by_id(id))
    }

    async fn open_duty(&self, record: DutyRecord) -> Result<(), StoreError> {
        self.tables.write().open_duty(record);
        Ok(())
    }

    async fn close_active_duty(
        &self,
        officer_id: IdentityId,
        at: DateTime<Utc>,
    ) -> Result<Option<DutyRecord>, StoreError> {
        Ok(self.tables.write().close_active_duty(officer_id, at))
    }

    async fn active_duty(&self, officer_id: IdentityId) -> Result<Option<DutyRecord>, StoreError> {
        Ok(self.tables.read().active_duty(officer_id))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::tables::fixtures;

    #[tokio::test]
    async fn test_basic() {
        let store = MemoryCredentialStore::new();

        let officer = fixtures::officer("POL001", "V1");
        store.insert_officer(officer.clone()).await.unwrap();

        let loaded = store.officer_by_credential("POL001").await.unwrap().unwrap();
        assert_eq!(loaded, officer);
        assert_eq!(store.officer_by_id(officer.id).await.unwrap(), Some(officer));
        assert!(store.officer_by_credential("POL999").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_citizen_registration() {
        let store = Arc::new(MemoryCredentialStore::new());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store.insert_citizen(fixtures::citizen("V12345678")).await
                })
            })
            .collect();

        let mut ok = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => ok += 1,
                Err(StoreError::Conflict { field }) => assert_eq!(field, "national_id"),
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(ok, 1);
    }

    #[tokio::test]
    async fn admin_last_access() {
        let store = MemoryCredentialStore::new();
        let admin = fixtures::admin("admin", "admin@gepn.gob.ve");
        store.insert_admin(admin.clone()).await.unwrap();

        let now = Utc::now();
        let updated = store
            .update_admin(admin.id, AdminUpdate::LastAccess(now))
            .await
            .unwrap();
        assert_eq!(updated.last_access, Some(now));
        assert_eq!(store.list_admins().await.unwrap().len(), 1);
    }
}
