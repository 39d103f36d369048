//! [`RequestSource`] adapter for `http` crate requests, as served by axum.
//!
//! The adapter snapshots the request head when constructed. Multipart parts
//! are read once, up front, by [`HttpRequestSource::capture`]; the outcome
//! (parts or the stream failure) is kept so report building stays
//! synchronous.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequest, Multipart, OriginalUri, Request};
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, HOST};
use http::uri::Authority;
use http::{HeaderMap, HeaderValue, Method, Uri};
use request_report_core::{PartReadError, RequestPart, RequestSource};
use tracing::debug;

const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Snapshot of an HTTP request exposing the report capability set.
#[derive(Debug, Clone)]
pub struct HttpRequestSource {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    remote: Option<SocketAddr>,
    path_info: Option<String>,
    parts: Result<Vec<RequestPart>, PartReadError>,
}

impl HttpRequestSource {
    /// Creates a source from a request head. No parts are recorded.
    ///
    /// `PATH_INFO` defaults to the full request path.
    #[must_use]
    pub fn from_head(method: &Method, uri: &Uri, headers: &HeaderMap) -> Self {
        Self {
            method: method.clone(),
            uri: uri.clone(),
            headers: headers.clone(),
            remote: None,
            path_info: Some(uri.path().to_string()),
            parts: Ok(Vec::new()),
        }
    }

    /// Captures an axum request, consuming its body.
    ///
    /// Picks up the peer address from `ConnectInfo<SocketAddr>` and the
    /// pre-nesting URI from `OriginalUri` when present. For nested routers the
    /// path seen by the handler becomes `PATH_INFO`. Parts are only read for
    /// `multipart/form-data` bodies; a failed read is recorded, not raised.
    pub async fn capture(request: Request) -> Self {
        let original = request
            .extensions()
            .get::<OriginalUri>()
            .map(|OriginalUri(uri)| uri.clone());
        let remote = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        let mut source = Self::from_head(request.method(), request.uri(), request.headers());
        source.remote = remote;
        if let Some(original) = original {
            if original != *request.uri() {
                source.path_info = non_empty(request.uri().path());
                source.uri = original;
            }
        }

        if source.is_multipart() {
            source.parts = read_parts(request).await;
        }
        source
    }

    /// Records the peer address.
    #[must_use]
    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote = Some(addr);
        self
    }

    /// Reports `PATH_INFO` relative to the handler's mount point.
    ///
    /// The remainder after `prefix` becomes `PATH_INFO`; it is `None` when the
    /// path equals the prefix or does not start with it as a whole path
    /// segment, so `/apiv2` is not under `/api`.
    #[must_use]
    pub fn with_mount_prefix(mut self, prefix: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');
        self.path_info = self
            .uri
            .path()
            .strip_prefix(prefix)
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
            .and_then(non_empty);
        self
    }

    /// Replaces the recorded part stream outcome.
    #[must_use]
    pub fn with_parts(mut self, parts: Result<Vec<RequestPart>, PartReadError>) -> Self {
        self.parts = parts;
        self
    }

    /// Drops any recorded parts or part stream failure.
    ///
    /// Used to build a partial report after an extraction failure.
    #[must_use]
    pub fn without_parts(self) -> Self {
        self.with_parts(Ok(Vec::new()))
    }

    fn is_multipart(&self) -> bool {
        self.content_type()
            .is_some_and(|ct| ct.trim_start().to_ascii_lowercase().starts_with(MULTIPART_FORM_DATA))
    }

    fn authority(&self) -> Option<Authority> {
        if let Some(authority) = self.uri.authority() {
            return Some(authority.clone());
        }
        self.headers
            .get(HOST)
            .and_then(|host| host.to_str().ok())
            .and_then(|host| host.parse().ok())
    }
}

impl RequestSource for HttpRequestSource {
    fn uri(&self) -> String {
        self.uri.path().to_string()
    }

    fn method(&self) -> Option<String> {
        Some(self.method.as_str().to_string())
    }

    fn header(&self, name: &str) -> Option<String> {
        self.headers.get(name).map(header_string)
    }

    fn header_names(&self) -> Vec<String> {
        self.headers.keys().map(|name| name.as_str().to_string()).collect()
    }

    fn remote_addr(&self) -> Option<String> {
        self.remote.map(|addr| addr.ip().to_string())
    }

    fn remote_port(&self) -> Option<u16> {
        self.remote.map(|addr| addr.port())
    }

    fn server_name(&self) -> Option<String> {
        self.authority().map(|authority| authority.host().to_string())
    }

    fn server_port(&self) -> Option<u16> {
        let authority = self.authority()?;
        let default_port = match self.uri.scheme_str() {
            Some("https" | "wss") => 443,
            _ => 80,
        };
        Some(authority.port_u16().unwrap_or(default_port))
    }

    fn content_type(&self) -> Option<String> {
        self.headers.get(CONTENT_TYPE).map(header_string)
    }

    fn content_length(&self) -> Option<u64> {
        self.headers
            .get(CONTENT_LENGTH)
            .and_then(|len| len.to_str().ok())
            .and_then(|len| len.trim().parse().ok())
    }

    fn query_string(&self) -> Option<String> {
        self.uri.query().map(str::to_string)
    }

    fn path_info(&self) -> Option<String> {
        self.path_info.clone()
    }

    fn parts(&self) -> Result<Vec<RequestPart>, PartReadError> {
        self.parts.clone()
    }
}

/// Reads every multipart field, keeping metadata and size only.
async fn read_parts(request: Request) -> Result<Vec<RequestPart>, PartReadError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|rejection| PartReadError::new(rejection.body_text()))?;

    let mut parts = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| PartReadError::new(err.body_text()))?
    {
        let mut part = RequestPart::new(field.name().unwrap_or_default(), 0);
        part.file_name = field.file_name().map(str::to_string);
        part.content_type = field.content_type().map(str::to_string);

        let data = field
            .bytes()
            .await
            .map_err(|err| PartReadError::new(err.body_text()))?;
        part.size = u64::try_from(data.len()).unwrap_or(u64::MAX);
        parts.push(part);
    }

    debug!(count = parts.len(), "read multipart parts");
    Ok(parts)
}

fn header_string(value: &HeaderValue) -> String {
    String::from_utf8_lossy(value.as_bytes()).into_owned()
}

fn non_empty(path: &str) -> Option<String> {
    (!path.is_empty()).then(|| path.to_string())
}
