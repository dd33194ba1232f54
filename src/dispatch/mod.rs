// Dispatch Module
//
// Runs a shift: the customer queue, the hour-by-hour scheduler, the
// concurrent lane pool and the statistics they produce.

pub mod lanes;
pub mod models;
pub mod queue;
pub mod report;
pub mod scheduler;
pub mod stats;

pub use lanes::LanePool;
pub use models::{CancelPoint, Customer, DispatchPolicy, RestockPlan, StaminaPolicy};
pub use queue::CustomerQueue;
pub use report::{MemorySink, ReportSink, TracingSink};
pub use scheduler::{ShiftScheduler, ShiftState};
pub use stats::{CloseReason, LostCustomer, Receipt, ShiftReport, ShiftStats};
