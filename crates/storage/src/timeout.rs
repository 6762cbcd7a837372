use std::{future::Future, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gepn_primitives::{AdminRecord, CitizenRecord, DutyRecord, IdentityId, OfficerRecord};

use crate::{AdminUpdate, CredentialStore, StoreError};

/// Default deadline for a single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Bounds every call on the inner store with a deadline.
///
/// An expired call returns [`StoreError::Timeout`] and its future is dropped.
#[derive(Debug, Clone)]
pub struct TimeoutStore<S> {
    inner: S,
    timeout: Duration,
}

impl<S> TimeoutStore<S> {
    pub const fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(target: "gepn::storage", timeout = ?self.timeout, "credential store call timed out");
                Err(StoreError::Timeout(self.timeout))
            }
        }
    }
}

#[async_trait]
impl<S: CredentialStore> CredentialStore for TimeoutStore<S> {
    async fn insert_officer(&self, record: OfficerRecord) -> Result<(), StoreError> {
        self.bounded(self.inner.insert_officer(record)).await
    }

    async fn officer_by_credential(
        &self,
        credential: &str,
    ) -> Result<Option<OfficerRecord>, StoreError> {
        self.bounded(self.inner.officer_by_credential(credential))
            .await
    }

    async fn officer_by_id(&self, id: IdentityId) -> Result<Option<OfficerRecord>, StoreError> {
        self.bounded(self.inner.officer_by_id(id)).await
    }

    async fn insert_admin(&self, record: AdminRecord) -> Result<(), StoreError> {
        self.bounded(self.inner.insert_admin(record)).await
    }

    async fn admin_by_username(&self, username: &str) -> Result<Option<AdminRecord>, StoreError> {
        self.bounded(self.inner.admin_by_username(username)).await
    }

    async fn admin_by_id(&self, id: IdentityId) -> Result<Option<AdminRecord>, StoreError> {
        self.bounded(self.inner.admin_by_id(id)).await
    }

    async fn list_admins(&self) -> Result<Vec<AdminRecord>, StoreError> {
        self.bounded(self.inner.list_admins()).await
    }

    async fn update_admin(
        &self,
        id: IdentityId,
        update: AdminUpdate,
    ) -> Result<AdminRecord, StoreError> {
        self.bounded(self.inner.update_admin(id, update)).await
    }

    async fn insert_citizen(&self, record: CitizenRecord) -> Result<(), StoreError> {
        self.bounded(self.inner.insert_citizen(record)).await
    }

    async fn citizen_by_national_id(
        &self,
        national_id: &str,
    ) -> Result<Option<CitizenRecord>, StoreError> {
        self.bounded(self.inner.citizen_by_national_id(national_id))
            .await
    }

    async fn citizen_by_id(&self, id: IdentityId) -> Result<Option<CitizenRecord>, StoreError> {
        self.bounded(self.inner.citizen_by_id(id)).await
    }

    async fn open_duty(&self, record: DutyRecord) -> Result<(), StoreError> {
        self.bounded(self.inner.open_duty(record)).await
    }

    async fn close_active_duty(
        &self,
        officer_id: IdentityId,
        at: DateTime<Utc>,
    ) -> Result<Option<DutyRecord>, StoreError> {
        self.bounded(self.inner.close_active_duty(officer_id, at))
            .await
    }

    async fn active_duty(&self, officer_id: IdentityId) -> Result<Option<DutyRecord>, StoreError> {
        self.bounded(self.inner.active_duty(officer_id)).await
    }
}
