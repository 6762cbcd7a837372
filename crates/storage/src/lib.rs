//! Credential persistence for GEPN.
//!
//! [`CredentialStore`] is the only seam between authentication and the
//! database. Two backends are provided, plus a wrapper that bounds every call
//! with a deadline:
//!
//! - [`MemoryCredentialStore`] keeps everything in process memory.
//! - [`FileCredentialStore`] keeps a JSON snapshot on disk, rewritten
//!   atomically after every mutation.
//! - [`TimeoutStore`] fails a call closed once its deadline passes.
//!
//! Unique login keys are checked and inserted under one write lock, so two
//! concurrent registrations of the same key cannot both succeed.

mod file;
mod memory;
mod tables;
mod timeout;

use std::{path::PathBuf, sync::Arc, time::Duration};

use async_trait::async_trait;
use auto_impl::auto_impl;
use chrono::{DateTime, Utc};
use gepn_primitives::{
    AdminRecord, CapabilitySet, CitizenRecord, DutyRecord, IdentityId, OfficerRecord,
};
use thiserror::Error;

pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;
pub use timeout::{DEFAULT_STORE_TIMEOUT, TimeoutStore};

/// URI scheme of the in-memory backend.
pub const MEMORY_SCHEME: &str = "memory://";
/// URI scheme of the JSON file backend.
pub const FILE_SCHEME: &str = "file://";

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique field already holds this value.
    #[error("{field} already registered")]
    Conflict { field: &'static str },
    #[error("record not found")]
    NotFound,
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("unsupported store URI: {0}")]
    UnsupportedUri(String),
}

/// A single field change applied to an administrator record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdminUpdate {
    Permissions(CapabilitySet),
    Active(bool),
    LastAccess(DateTime<Utc>),
}

/// Credential persistence trait with auto-impl for &, Box, Arc.
///
/// Lookups return `Ok(None)` for missing records; errors are reserved for
/// backend failures and constraint violations.
#[async_trait]
#[auto_impl(&, Box, Arc)]
pub trait CredentialStore: Send + Sync {
    /// Inserts an officer. Fails with [`StoreError::Conflict`] when the
    /// credential or national id is taken.
    async fn insert_officer(&self, record: OfficerRecord) -> Result<(), StoreError>;
    async fn officer_by_credential(
        &self,
        credential: &str,
    ) -> Result<Option<OfficerRecord>, StoreError>;
    async fn officer_by_id(&self, id: IdentityId) -> Result<Option<OfficerRecord>, StoreError>;

    /// Inserts an administrator. Fails with [`StoreError::Conflict`] when the
    /// username or email is taken.
    async fn insert_admin(&self, record: AdminRecord) -> Result<(), StoreError>;
    async fn admin_by_username(&self, username: &str) -> Result<Option<AdminRecord>, StoreError>;
    async fn admin_by_id(&self, id: IdentityId) -> Result<Option<AdminRecord>, StoreError>;
    async fn list_admins(&self) -> Result<Vec<AdminRecord>, StoreError>;
    /// Applies `update` and returns the updated record.
    async fn update_admin(
        &self,
        id: IdentityId,
        update: AdminUpdate,
    ) -> Result<AdminRecord, StoreError>;

    /// Inserts a citizen. Fails with [`StoreError::Conflict`] when the
    /// national id is taken.
    async fn insert_citizen(&self, record: CitizenRecord) -> Result<(), StoreError>;
    async fn citizen_by_national_id(
        &self,
        national_id: &str,
    ) -> Result<Option<CitizenRecord>, StoreError>;
    async fn citizen_by_id(&self, id: IdentityId) -> Result<Option<CitizenRecord>, StoreError>;

    /// Opens a duty record, closing any duty the officer still has open.
    async fn open_duty(&self, record: DutyRecord) -> Result<(), StoreError>;
    /// Closes the officer's open duty, if any, and returns it.
    async fn close_active_duty(
        &self,
        officer_id: IdentityId,
        at: DateTime<Utc>,
    ) -> Result<Option<DutyRecord>, StoreError>;
    async fn active_duty(&self, officer_id: IdentityId) -> Result<Option<DutyRecord>, StoreError>;
}

/// Opens the backend named by `uri`.
///
/// `memory://` selects the in-memory store. `file:///some/dir` selects the
/// JSON store at `/some/dir/<name>.json`, creating the directory if needed.
pub async fn open_store(uri: &str, name: &str) -> Result<Arc<dyn CredentialStore>, StoreError> {
    if uri.starts_with(MEMORY_SCHEME) {
        tracing::info!(target: "gepn::storage", "using in-memory credential store");
        return Ok(Arc::new(MemoryCredentialStore::new()));
    }

    if let Some(dir) = uri.strip_prefix(FILE_SCHEME) {
        let path = PathBuf::from(dir).join(format!("{name}.json"));
        tracing::info!(target: "gepn::storage", path = %path.display(), "using file credential store");
        let store = FileCredentialStore::open_with_create_dir(path).await?;
        return Ok(Arc::new(store));
    }

    Err(StoreError::UnsupportedUri(uri.to_owned()))
}
