//! Service layer: request dispatch, bounded submission scheduling, and
//! pool supervision.

pub mod dispatcher;
pub mod scheduler;
pub mod supervisor;

pub use dispatcher::RequestDispatcher;
pub use scheduler::{ResponseSubmission, SubmissionScheduler};
pub use supervisor::PoolSupervisor;
