//! Logging and distributed tracing setup

mod otel;

pub use otel::{LogFormat, TelemetryConfig, TelemetryError, TelemetryGuard, init_telemetry};
