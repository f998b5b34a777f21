//! Paylink record store
//!
//! Content and payment persistence behind the `RecordStore` trait, with a
//! Postgres implementation (sqlx) and an in-memory one for tests and demos.

pub mod db;

pub use db::{
    create_record_store, InMemoryRecordStore, PostgresRecordStore, RecordStore,
};
