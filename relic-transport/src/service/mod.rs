//! Service layer
//!
//! Services contain the dispatching logic. They orchestrate sends through a
//! repository and own the pending queue of batching dispatchers.
//!
//! The queue is trait-based so the dispatcher can be tested in isolation.

mod dispatcher;
mod log_buffer;

// Re-export traits
pub use log_buffer::LogBufferService;

// Re-export implementations
pub use dispatcher::{Completion, Dispatcher};
pub use log_buffer::InMemoryLogBuffer;
