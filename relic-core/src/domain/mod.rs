//! Core domain types
//!
//! These types are shared between the transport (which queues and ships
//! entries) and the CLI (which builds entries from user input).

pub mod log;
