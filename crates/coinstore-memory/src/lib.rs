//! In-memory record store backend for coinstore.
//!
//! Records live in a primary map with secondary indexes maintained on every
//! write. An optional append-only journal makes a store durable across
//! restarts.

pub mod journal;
pub mod store;

pub use journal::{Journal, JournalEntry};
pub use store::InMemoryStore;
