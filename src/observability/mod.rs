//! Observability: structured logging lives with `tracing` at the call
//! sites; this module owns metrics collection and exposition.

pub mod metrics;
