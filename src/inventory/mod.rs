pub mod error;
pub mod ledger;
pub mod models;
pub mod shared;

pub use error::*;
pub use ledger::*;
pub use models::*;
pub use shared::*;
