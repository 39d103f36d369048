//! Echo server with deferred startup lifecycle.
//!
//! `new()` prepares state, `start()` binds the TCP listener, and `serve()`
//! starts accepting connections. Binding separately lets callers learn the
//! OS-assigned port before traffic is accepted.

use std::future::Future;
use std::net::SocketAddr;

use axum::routing::{any, get};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use super::config::ReporterConfig;
use super::handlers::{health_handler, liveness_handler, report_handler, AppState};
use super::middleware::build_http_layers;

/// Manages the report echo server lifecycle.
pub struct EchoServer {
    config: ReporterConfig,
    listener: Option<TcpListener>,
}

impl EchoServer {
    /// Creates a new server without binding any port.
    #[must_use]
    pub fn new(config: ReporterConfig) -> Self {
        Self {
            config,
            listener: None,
        }
    }

    /// Assembles the axum router with all routes and middleware.
    ///
    /// Routes:
    /// - `GET /health` -- health JSON
    /// - `GET /health/live` -- liveness check
    /// - `ANY /report` and `ANY /report/{*path}` -- report fragment of the request
    pub fn build_router(&self) -> Router {
        let state = AppState::new(self.config.filter());

        Router::new()
            .route("/health", get(health_handler))
            .route("/health/live", get(liveness_handler))
            .route("/report", any(report_handler))
            .route("/report/{*path}", any(report_handler))
            .layer(build_http_layers(&self.config))
            .with_state(state)
    }

    /// Binds the TCP listener to the configured host and port.
    ///
    /// Returns the actual bound port, which may differ from the configured
    /// port when port 0 is used (OS-assigned ephemeral port).
    ///
    /// # Errors
    ///
    /// Returns an error if the host is not an IP literal or the address
    /// cannot be bound (e.g., port in use).
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = self.config.bind_addr()?;
        let listener = TcpListener::bind(addr).await?;
        let port = listener.local_addr()?.port();

        info!("TCP listener bound to {}:{}", self.config.host, port);

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves connections until the shutdown signal fires.
    ///
    /// Peer addresses are exposed to handlers through `ConnectInfo`, so
    /// reports carry `REMOTE_ADDR` and `REMOTE_PORT`.
    ///
    /// # Errors
    ///
    /// Returns an error if `start()` was not called first or the server
    /// encounters a fatal I/O error.
    pub async fn serve(
        mut self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let listener = self
            .listener
            .take()
            .ok_or_else(|| anyhow::anyhow!("start() must be called before serve()"))?;
        let router = self.build_router();

        info!("Serving report echo requests");

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await?;

        info!("Report echo server stopped");
        Ok(())
    }
}
