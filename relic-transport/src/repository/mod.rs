//! Repository layer
//!
//! Repositories are stateless seams over the ingestion API. The dispatcher
//! only talks to a [`LogRepository`], which keeps the batching logic
//! independent from HTTP and lets tests record what would have been sent.

mod logs;
#[cfg(test)]
pub(crate) mod memory;

pub use logs::{HttpLogRepository, LogRepository};
