//! Caller-side retry loops. The validator itself never retries; these loops
//! own the attempt budget and feed validation errors back to whoever
//! produced the command.

mod filter_step;
pub mod gateway;
mod orchestrator;
mod state;
mod types;


pub use filter_step::apply_validated;
pub use gateway::{CommandRepairer, RepairRequest};
pub use orchestrator::RepairLoop;
pub use types::{AttemptRecord, RepairError, RepairOutcome};
