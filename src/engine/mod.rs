//! Core engine: fetch → align → estimate → signal, and the loop that repeats it.

pub mod aligner;
pub mod estimator;
pub mod monitor;
pub mod scheduler;
pub mod signal;
