//! # VoxGate Shared Library
//!
//! This crate contains the domain types and business logic behind the
//! VoxGate API server: a multi-tenant gateway in front of an upstream
//! text-to-speech service.
//!
//! ## Module Organization
//!
//! - `models`: database row types and queries (users, tasks)
//! - `auth`: password hashing, JWT issuance and validation
//! - `db`: connection pool and migrations
//! - `provider`: the `SpeechProvider` gateway to the upstream service
//! - `lifecycle`: task creation, reconciliation, and deletion rules
//! - `webhook`: HMAC signing and verification for provider callbacks

pub mod auth;
pub mod db;
pub mod lifecycle;
pub mod models;
pub mod provider;
pub mod webhook;

/// Current version of the VoxGate shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
