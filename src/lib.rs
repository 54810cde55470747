//! A marketplace ledger: users with balances, item listings with a strict
//! `Initial -> OnSale -> SoldOut` lifecycle, and a purchase flow that moves money
//! from buyer to seller atomically.
//!
//! [`application::marketplace::Marketplace`] is the entry point; storage is pluggable
//! through the ports in [`domain::ports`].

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
pub mod telemetry;
