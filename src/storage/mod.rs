//! Storage layer for ledger-export
//!
//! Provides a key-value abstraction with file-backed and in-memory
//! implementations, and the export configuration store built on top of it.

pub mod configs;
pub mod file_io;
pub mod kv;

pub use configs::{ConfigStore, CONFIGS_SLOT};
pub use file_io::{read_optional, write_atomic};
pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
