//! Integration tests: full analysis cycles and the monitoring loop
//! against a deterministic in-memory price source.

mod mock_source;
mod pipeline;
mod scheduler;
