//! Observability setup for Quill: structured logging with optional
//! OpenTelemetry span export.

pub mod tracing_setup;
