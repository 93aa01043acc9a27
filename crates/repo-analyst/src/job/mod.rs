//! The job record, the only entity this crate persists.

pub mod record;
pub mod status;

pub use record::{Job, JobId};
pub use status::JobStatus;
