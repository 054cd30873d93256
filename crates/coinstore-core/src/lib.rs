//! Core types and traits for coinstore record stores.
//!
//! This crate provides the `Record` and `RecordStore` traits together with the
//! record types they operate on, so store implementations can live in
//! separate crates.

pub mod models;
pub mod parse;
pub mod storage;

// Re-export key types at crate root for convenience
pub use models::{FieldValue, IdPolicy, Record, RecordId};
pub use models::asset::CryptoAsset;
pub use models::quote::{Currency, Quote};
pub use storage::{RecordSet, RecordStore, StoreError, ValidationError};
