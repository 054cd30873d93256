pub mod cli;
pub mod config;
pub mod repository;
pub mod storage;

pub use coinstore_core::{models, parse};
