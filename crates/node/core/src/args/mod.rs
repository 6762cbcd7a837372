//! CLI argument groups.
//!
//! Every setting except logging is optional on the command line. A flag (or
//! its environment variable) that is present overrides the value loaded by
//! [`crate::config::GepnConfig::load`]; an absent one leaves it alone.

mod auth;
mod database;
mod http;
mod log;

pub use auth::AuthArgs;
pub use database::DatabaseArgs;
pub use http::HttpArgs;
pub use log::LogArgs;

/// Overwrites `target` with `value` when the flag was given.
fn set<T>(target: &mut T, value: &Option<T>)
where
    T: Clone,
{
    if let Some(value) = value {
        target.clone_from(value);
    }
}
