//! Capability set a request must expose to be reported.
//!
//! Each supported web framework provides one adapter implementing
//! [`RequestSource`]. The builder only ever talks to this trait.

/// Read-only view of an inbound HTTP request.
///
/// Every accessor except [`parts`](RequestSource::parts) is infallible:
/// information the request does not carry is reported as `None`.
pub trait RequestSource {
    /// Request URI as the framework reports it (path, without query string).
    fn uri(&self) -> String;

    /// HTTP method, e.g. `GET`.
    fn method(&self) -> Option<String>;

    /// First value of the named header. Lookup is case-insensitive.
    fn header(&self, name: &str) -> Option<String>;

    /// Every header name the request exposes, in the framework's order.
    fn header_names(&self) -> Vec<String>;

    /// Address of the client or last proxy that sent the request.
    fn remote_addr(&self) -> Option<String>;

    /// Port of the client or last proxy that sent the request.
    fn remote_port(&self) -> Option<u16>;

    /// Host name the request was sent to.
    fn server_name(&self) -> Option<String>;

    /// Port the request was sent to.
    fn server_port(&self) -> Option<u16>;

    /// MIME type of the body.
    fn content_type(&self) -> Option<String>;

    /// Body length in bytes, when known.
    fn content_length(&self) -> Option<u64>;

    /// Raw query string, without the leading `?`.
    fn query_string(&self) -> Option<String>;

    /// Extra path information following the mount point of the handler.
    fn path_info(&self) -> Option<String>;

    /// Submitted multipart/form parts.
    ///
    /// # Errors
    ///
    /// Returns [`PartReadError`] when the part stream could not be read.
    fn parts(&self) -> Result<Vec<RequestPart>, PartReadError>;
}

/// Metadata of one submitted multipart/form part.
///
/// The payload is deliberately not retained; only its size is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPart {
    /// Form field name.
    pub name: String,
    /// Client-supplied file name, for file uploads.
    pub file_name: Option<String>,
    /// Declared content type of the part.
    pub content_type: Option<String>,
    /// Size of the part body in bytes.
    pub size: u64,
}

impl RequestPart {
    /// Creates a part with only a name and size.
    #[must_use]
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            file_name: None,
            content_type: None,
            size,
        }
    }

    /// Sets the client-supplied file name.
    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Sets the declared content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Failure to read the multipart/form part stream of a request.
///
/// Carries the framework's error message. Cloneable so an adapter can hold
/// the outcome of a stream read it performed up front.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct PartReadError {
    reason: String,
}

impl PartReadError {
    /// Creates an error from the underlying failure's description.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Description of the underlying failure.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}
