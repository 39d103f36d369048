//! Configuration for the report echo service.
//!
//! Every setting can come from a command-line flag or an environment
//! variable. List-valued settings are comma-delimited strings.

use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::num::ParseIntError;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use request_report_core::ReportFilter;

/// Headers masked when no header filter is configured.
pub const DEFAULT_FILTER_HEADERS: &str = "authorization, cookie";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Plain,
    /// One JSON object per line.
    Json,
}

/// Top-level configuration for the echo service.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "report-echo", version, about = "Echoes the error-report view of each request")]
pub struct ReporterConfig {
    /// Bind address (IP literal).
    #[arg(long, env = "REPORT_HOST", default_value = "0.0.0.0")]
    pub host: String,
    /// Port to listen on. 0 means OS-assigned.
    #[arg(long, env = "REPORT_PORT", default_value_t = 0)]
    pub port: u16,
    /// Maximum time to wait for a request to complete, in seconds.
    #[arg(
        long = "request-timeout-secs",
        env = "REPORT_REQUEST_TIMEOUT_SECS",
        default_value = "30",
        value_parser = parse_secs
    )]
    pub request_timeout: Duration,
    /// Parameter names whose values are masked.
    #[arg(long, env = "REPORT_FILTER_PARAMS")]
    pub filter_params: Option<String>,
    /// Header names whose values are masked.
    #[arg(long, env = "REPORT_FILTER_HEADERS", default_value = DEFAULT_FILTER_HEADERS)]
    pub filter_headers: String,
    /// Log output format.
    #[arg(long, env = "REPORT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 0,
            request_timeout: Duration::from_secs(30),
            filter_params: None,
            filter_headers: DEFAULT_FILTER_HEADERS.to_string(),
            log_format: LogFormat::Plain,
        }
    }
}

impl ReporterConfig {
    /// Socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHost`] if `host` is not an IP literal.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost {
                host: self.host.clone(),
                source,
            })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Value filter built from the parameter and header lists.
    #[must_use]
    pub fn filter(&self) -> ReportFilter {
        ReportFilter::from_delimited(self.filter_params.as_deref(), Some(&self.filter_headers))
    }
}

/// Errors from interpreting configuration values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The bind host is not an IPv4 or IPv6 literal.
    #[error("invalid bind host {host:?}: {source}")]
    InvalidHost {
        /// Host as configured.
        host: String,
        /// Parse failure from the standard library.
        #[source]
        source: AddrParseError,
    },
}

fn parse_secs(raw: &str) -> Result<Duration, ParseIntError> {
    raw.trim().parse().map(Duration::from_secs)
}
