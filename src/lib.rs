//! PAIRWATCH: CADJPY/NZDJPY pairs-trading monitor
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod stats;
pub mod data;
pub mod engine;
