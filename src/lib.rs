//! Order fulfillment engine for a single coffee shop shift.
//!
//! Requests pass admission, reserve stock from the ledger, walk the order
//! lifecycle and are priced with stacked, capped discounts. The dispatch
//! scheduler runs a whole shift against a simulated clock; the lane pool
//! serves a burst concurrently.

pub mod arrivals;
pub mod business_rules;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod inventory;
pub mod money;
pub mod orders;
pub mod validation;

pub use config::ShopConfig;
pub use error::{EngineError, EngineResult};
