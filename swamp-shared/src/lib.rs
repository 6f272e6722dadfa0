//! # SwampScheduler Shared Library
//!
//! This crate contains the data layer and business rules used by the
//! SwampScheduler API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their queries
//! - `auth`: Hosted-auth client, access-token verification, request context
//! - `db`: Connection pool and embedded migrations
//! - `gamification`: Leveling curve, achievement evaluator, XP rewards
//! - `analytics`: Daily completion series and streak calculation

pub mod analytics;
pub mod auth;
pub mod db;
pub mod gamification;
pub mod models;

/// Current version of the SwampScheduler shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
