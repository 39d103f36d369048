//! Request Report Server — `http`/axum request adapter, configuration,
//! logging setup, and the report echo service.

pub mod adapter;
pub mod network;
pub mod telemetry;

pub use adapter::HttpRequestSource;
pub use network::{EchoServer, ReporterConfig};
