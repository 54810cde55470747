//! Application layer containing the core business logic orchestration.
//!
//! [`marketplace::Marketplace`] is the primary entry point. It serializes conflicting
//! operations with striped `tokio` mutexes and hands each write set to the store as a
//! single atomic commit.

pub mod locks;
pub mod marketplace;
