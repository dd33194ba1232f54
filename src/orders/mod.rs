pub mod error;
pub mod models;
pub mod request;
pub mod status_machine;

pub use error::*;
pub use models::*;
pub use request::*;
pub use status_machine::*;
