//! Paylink Storage Library
//!
//! This crate is the object store port: the `Storage` trait plus local
//! filesystem, S3 and in-memory implementations.
//!
//! # Storage key format
//!
//! Uploaded content lives under `content/{unix_millis}-{suffix}-{filename}` where
//! `suffix` is eight random hex characters. Keys must not contain `..` or a
//! leading `/`. Key generation is centralized in the `keys` module so all
//! backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::{generate_content_key, sanitize_filename};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use memory::InMemoryStorage;
pub use paylink_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult, StoredObject};
