//! Caching layer for loaded tables.

pub mod file;

pub use file::{CacheStats, FileIdentity, TableCache};
