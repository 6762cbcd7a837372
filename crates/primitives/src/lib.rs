//! Core primitive types for the GEPN backend.
//!
//! This crate holds the data model shared by storage, authentication and the
//! HTTP layer. It has no I/O and no async code.
//!
//! # Types
//!
//! ## Identities
//! - [`Identity`] - Closed sum over the four authenticable variants
//! - [`IdentityKind`] - Discriminant of [`Identity`], carried in tokens
//! - [`Principal`] - Authorization-relevant projection of an identity
//!
//! ## Stored records
//! - [`OfficerRecord`], [`AdminRecord`], [`CitizenRecord`] - Credential-bearing records
//! - [`DutyRecord`] - An officer's on-duty session
//!
//! ## Permissions
//! - [`Capability`] - Closed set of module tags
//! - [`CapabilitySet`] - Validated set of tags held by an administrator
//! - [`Region`] - Geographic scope label
//!
//! ## Outward views
//! - [`OfficerProfile`], [`AdminProfile`], [`CitizenProfile`], [`PatrolProfile`]
//!   carry no secret digests and are the only shapes serialized to clients.

mod capability;
mod id;
mod identity;
mod profile;
mod record;
mod region;

pub use capability::{Capability, CapabilitySet, UnknownCapability};
pub use id::{IdentityId, InvalidId};
pub use identity::{Identity, IdentityKind, Principal};
pub use profile::{AdminProfile, CitizenProfile, IdentityProfile, OfficerProfile, PatrolProfile};
pub use record::{AdminRecord, CitizenRecord, DutyRecord, OfficerRecord, VALID_RANKS, is_valid_rank};
pub use region::Region;
