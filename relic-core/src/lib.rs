//! Relic Core
//!
//! Core types for the Relic log-shipping transport.
//!
//! This crate contains:
//! - Domain types: log entries, levels and the entry normalizer
//! - DTOs: the wire payloads posted to the log ingestion API

pub mod domain;
pub mod dto;
