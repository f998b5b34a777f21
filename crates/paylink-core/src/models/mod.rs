//! Data models for the application
//!
//! Content items and payments are the two persisted records; access and
//! dashboard types are views computed from them.

mod access;
mod content;
mod dashboard;
mod payment;

pub use access::*;
pub use content::*;
pub use dashboard::*;
pub use payment::*;
