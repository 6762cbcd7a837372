//! JSON file-based credential store with atomic writes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gepn_primitives::{AdminRecord, CitizenRecord, DutyRecord, IdentityId, OfficerRecord};
use tokio::{fs, sync::Mutex};

use crate::{AdminUpdate, CredentialStore, StoreError, tables::Tables};

/// JSON file store. Loaded to memory on open, written back after every
/// mutation.
///
/// A mutation is applied to a copy of the tables, persisted, and only then
/// made visible. A failed write leaves both the file and memory unchanged.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    tables: Mutex<Tables>,
}

impl FileCredentialStore {
    /// Load existing file or create empty store.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let tables = if fs::try_exists(&path).await? {
            Self::load_from_file(&path).await?
        } else {
            Tables::default()
        };

        Ok(Self {
            path,
            tables: Mutex::new(tables),
        })
    }

    /// Open store, making parent directories if needed.
    pub async fn open_with_create_dir(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Self::open(path).await
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load_from_file(path: &Path) -> Result<Tables, StoreError> {
        let bytes = fs::read(path).await?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    async fn save_to_file(&self, tables: &Tables) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(tables)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        // Write to temp file first, then rename (atomic)
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, bytes).await?;
        fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }

    async fn mutate<T: Send>(
        &self,
        f: impl FnOnce(&mut Tables) -> Result<T, StoreError> + Send,
    ) -> Result<T, StoreError> {
        let mut guard = self.tables.lock().await;
        let mut next = guard.clone();
        let out = f(&mut next)?;
        self.save_to_file(&next).await?;
        *guard = next;
        Ok(out)
    }

    async fn read<T>(&self, f: impl FnOnce(&Tables) -> T + Send) -> T {
        f(&*self.tables.lock().await)
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn insert_officer(&self, record: OfficerRecord) -> Result<(), StoreError> {
        self.mutate(|t| t.insert_officer(record)).await
    }

    async fn officer_by_credential(
        &self,
        credential: &str,
    ) -> Result<Option<OfficerRecord>, StoreError> {
        Ok(self.read(|t| t.officer_by_credential(credential)).await)
    }

    async fn officer_by_id(&self, id: IdentityId) -> Result<Option<OfficerRecord>, StoreError> {
        Ok(self.read(|t| t.officer_by_id(id)).await)
    }

    async fn insert_admin(&self, record: AdminRecord) -> Result<(), StoreError> {
        self.mutate(|t| t.insert_admin(record)).await
    }

    async fn admin_by_username(&self, username: &str) -> Result<Option<AdminRecord>, StoreError> {
        Ok(self.read(|t| t.admin_by_username(username)).await)
    }

    async fn admin_by_id(&self, id: IdentityId) -> Result<Option<AdminRecord>, StoreError> {
        Ok(self.read(|t| t.admin_by_id(id)).await)
    }

    async fn list_admins(&self) -> Result<Vec<AdminRecord>, StoreError> {
        Ok(self.read(Tables::list_admins).await)
    }

    async fn update_admin(
        &self,
        id: IdentityId,
        update: AdminUpdate,
    ) -> Result<AdminRecord, StoreError> {
        self.mutate(|t| t.update_admin(id, update)).await
    }

    async fn insert_citizen(&self, record: CitizenRecord) -> Result<(), StoreError> {
        self.mutate(|t| t.insert_citizen(record)).await
    }

    async fn citizen_by_national_id(
        &self,
        national_id: &str,
    ) -> Result<Option<CitizenRecord>, StoreError> {
        Ok(self.read(|t| t.citizen_by_national_id(national_id)).await)
    }

    async fn citizen_by_id(&self, id: IdentityId) -> Result<Option<CitizenRecord>, StoreError> {
        Ok(self.read(|t| t.citizen_by_id(id)).await)
    }

    async fn open_duty(&self, record: DutyRecord) -> Result<(), StoreError> {
        self.mutate(|t| {
            t.open_duty(record);
            Ok(())
        })
        .await
    }

    async fn close_active_duty(
        &self,
        officer_id: IdentityId,
        at: DateTime<Utc>,
    ) -> Result<Option<DutyRecord>, StoreError> {
        self.mutate(|t| Ok(t.close_active_duty(officer_id, at))).await
    }

    async fn active_duty(&self, officer_id: IdentityId) -> Result<Option<DutyRecord>, StoreError> {
        Ok(self.read(|t| t.active_duty(officer_id)).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::fixtures;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn test_basic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gepn.json");

        let store = FileCredentialStore::open(&path).await.unwrap();
        assert!(!path.exists());

        store
            .insert_citizen(fixtures::citizen("V1"))
            .await
            .unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let loaded = store.citizen_by_national_id("V1").await.unwrap().unwrap();
        assert_eq!(loaded.national_id, "V1");
    }

    #[tokio::test]
    async fn test_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("gepn.json");
        let admin = fixtures::admin("admin", "admin@gepn.gob.ve");

        {
            let store = FileCredentialStore::open_with_create_dir(&path)
                .await
                .unwrap();
            store.insert_admin(admin.clone()).await.unwrap();
            store
                .insert_officer(fixtures::officer("POL001", "V1"))
                .await
                .unwrap();
        }

        let store = FileCredentialStore::open(&path).await.unwrap();
        assert_eq!(store.admin_by_username("admin").await.unwrap(), Some(admin));
        assert!(store.officer_by_credential("POL001").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn conflict_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gepn.json");
        let store = FileCredentialStore::open(&path).await.unwrap();

        store.insert_citizen(fixtures::citizen("V1")).await.unwrap();
        assert_matches!(
            store.insert_citizen(fixtures::citizen("V1")).await,
            Err(StoreError::Conflict { .. })
        );

        let reopened = FileCredentialStore::open(&path).await.unwrap();
        assert!(reopened.citizen_by_national_id("V1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn corrupt_file_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gepn.json");
        std::fs::write(&path, b"not json").unwrap();

        assert_matches!(
            FileCredentialStore::open(&path).await,
            Err(StoreError::Serialization(_))
        );
    }
}
