//! Revoked token identifiers.
//!
//! This is the only mutable authentication state shared between requests.
//! Entries only need to outlive their token, so they are evicted once the
//! token would have expired anyway.

use auto_impl::auto_impl;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

#[auto_impl(&, Box, Arc)]
pub trait RevocationStore: Send + Sync {
    /// Revokes `jti` until `expires_at`.
    fn revoke(&self, jti: Uuid, expires_at: DateTime<Utc>);

    fn is_revoked(&self, jti: &Uuid) -> bool;

    /// Drops entries whose token has expired. Returns how many were dropped.
    fn evict_expired(&self, now: DateTime<Utc>) -> usize;
}

#[derive(Debug, Default)]
pub struct MemoryRevocationStore {
    entries: DashMap<Uuid, DateTime<Utc>>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RevocationStore for MemoryRevocationStore {
    fn revoke(&self, jti: Uuid, expires_at: DateTime<Utc>) {
        self.entries.insert(jti, expires_at);
    }

    fn is_revoked(&self, jti: &Uuid) -> bool {
        self.entries.contains_key(jti)
    }

    fn evict_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, expires_at| *expires_at > now);
        before.saturating_sub(self.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn revoke_and_evict() {
        let store = MemoryRevocationStore::new();
        let now = Utc::now();
        let short = Uuid::new_v4();
        let long = Uuid::new_v4();

        store.revoke(short, now + TimeDelta::seconds(10));
        store.revoke(long, now + TimeDelta::hours(1));
        assert!(store.is_revoked(&short));
        assert!(!store.is_revoked(&Uuid::new_v4()));

        assert_eq!(store.evict_expired(now + TimeDelta::seconds(10)), 1);
        assert!(!store.is_revoked(&short));
        assert!(store.is_revoked(&long));
        assert_eq!(store.len(), 1);
    }
}
