use crate::source::PartReadError;

/// Errors from building a report fragment.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// The object handed to the builder is not the request type it reports on.
    #[error("request object is not an instance of {expected}")]
    UnsupportedSource { expected: &'static str },
    /// The request's part stream could not be read.
    #[error("unable to read request parts: {source}")]
    Extraction {
        #[from]
        source: PartReadError,
    },
}

impl ReportError {
    /// Whether the caller can still attach a partial report.
    ///
    /// `UnsupportedSource` is an integration bug and fatal to the report;
    /// `Extraction` only loses the submitted parameters.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Extraction { .. })
    }
}
