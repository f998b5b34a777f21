//! Paylink Core Library
//!
//! This crate provides core domain models, error types, configuration, and validation
//! that are shared across all Paylink components.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::{BaseConfig, Config, PaylinkConfig, RecordStoreBackend};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
