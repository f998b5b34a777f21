//! Paylink Services Layer
//!
//! Business services for the content-monetization lifecycle
//! (create → price → share → pay → unlock). Orchestration lives here; the
//! API crate only translates HTTP to these calls.

pub mod checkout;
pub mod ledger;
pub mod share;
pub mod upload;

pub use checkout::{CheckoutService, PaymentGateway, SimulatedGateway};
pub use ledger::ContentLedger;
pub use share::ShareLinks;
pub use upload::{UploadFile, UploadLimits, UploadRequest, UploadService};
