//! Data Transfer Objects for the ingestion API
//!
//! DTOs describe the exact JSON bodies sent over the wire.

pub mod log;
