//! HTTP handler definitions for the report echo service.
//!
//! This module defines `AppState` (the shared state carried through axum
//! extractors) and re-exports all handler functions for convenient access
//! when building the router.

pub mod health;
pub mod report;

pub use health::{health_handler, liveness_handler};
pub use report::{report_handler, PARTIAL_REPORT_HEADER};

use std::sync::Arc;
use std::time::Instant;

use request_report_core::{ReportFilter, ReportRouter, RequestReportBuilder};

use crate::adapter::HttpRequestSource;

/// Shared application state passed to all axum handlers via `State` extraction.
///
/// Holds `Arc` references so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Builds report fragments from captured requests.
    pub reporter: Arc<dyn ReportRouter>,
    /// Server process start time, used for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// State reporting on `http` requests with the given value filter.
    #[must_use]
    pub fn new(filter: ReportFilter) -> Self {
        Self::with_reporter(Arc::new(
            RequestReportBuilder::<HttpRequestSource>::with_filter(filter),
        ))
    }

    /// State using an arbitrary report router.
    #[must_use]
    pub fn with_reporter(reporter: Arc<dyn ReportRouter>) -> Self {
        Self {
            reporter,
            start_time: Instant::now(),
        }
    }
}
