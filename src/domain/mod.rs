//! Domain model: users and their balances, items and their lifecycle, categories,
//! and the storage ports the application layer depends on.

pub mod category;
pub mod changeset;
pub mod item;
pub mod ports;
pub mod user;
