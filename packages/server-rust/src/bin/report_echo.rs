//! Serves the report fragment of every request sent to `/report`.

use clap::Parser;
use request_report_server::{telemetry, EchoServer, ReporterConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ReporterConfig::parse();
    telemetry::init(config.log_format)?;

    let mut server = EchoServer::new(config);
    let port = server.start().await?;
    info!(port, "report echo ready");

    server.serve(shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
