//! Post generation and scheduling workflow.
//!
//! One draft per session moves through:
//!
//! - `Idle` - nothing in progress
//! - `Generating` - waiting for the content service to write a post
//! - `DraftReady` - draft shown for review, edit and time selection
//! - `Scheduling` - waiting for the service to accept the schedule
//! - `Scheduled` - confirmed; acknowledge to start over
//! - `Failed` - a service call failed; acknowledge to recover

mod controller;
mod error;
mod request;
mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::PostWorkflow;
pub use error::{ValidationError, WorkflowError};
pub use request::{Draft, ScheduleRequest, ScheduleTime};
pub use state::WorkflowState;
