//! Rate-limited contact mail service.
//!
//! The core is [`rate_limit::RateLimitedAction`]: an action runs at most once
//! per key per cooldown window, claimed through the atomic set-if-absent of a
//! shared [`cache::CooldownStore`].

pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod log_view;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod state;
pub mod worker;
