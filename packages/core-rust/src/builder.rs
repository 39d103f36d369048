//! Request-to-report transformation.
//!
//! [`RequestReportBuilder`] maps any [`RequestSource`] into a
//! [`ReportFragment`]. Adding a framework means adding an adapter for the
//! source trait; the builder itself never branches on request type.

use std::any::{type_name, Any};
use std::fmt;
use std::marker::PhantomData;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::ReportError;
use crate::filter::ReportFilter;
use crate::report::{CgiData, Params, ReportFragment};
use crate::source::RequestSource;

/// Header names read into the CGI environment fields.
pub mod cgi_headers {
    pub const ACCEPT: &str = "Accept";
    pub const USER_AGENT: &str = "User-Agent";
    pub const ACCEPT_ENCODING: &str = "Accept-Encoding";
    pub const ACCEPT_LANGUAGE: &str = "Accept-Language";
    pub const ACCEPT_CHARSET: &str = "Accept-Charset";
}

/// Type-erased entry point for report construction.
///
/// Lets error-reporting code that only holds `&dyn Any` ask for a report
/// without knowing which framework produced the request.
pub trait ReportRouter: Send + Sync {
    /// Builds a fragment if `source` is the request type this router handles.
    ///
    /// # Errors
    ///
    /// - [`ReportError::UnsupportedSource`] if `source` has the wrong type.
    /// - [`ReportError::Extraction`] if the request's parts cannot be read.
    fn route(&self, source: &dyn Any) -> Result<ReportFragment, ReportError>;
}

/// Builds report fragments from requests of type `R`.
///
/// Holds only the value filter; no per-request state survives a call, so a
/// single builder can serve any number of requests concurrently.
pub struct RequestReportBuilder<R> {
    filter: ReportFilter,
    _source: PhantomData<fn(&R)>,
}

impl<R> RequestReportBuilder<R> {
    /// Creates a builder that masks nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::with_filter(ReportFilter::default())
    }

    /// Creates a builder that masks the values named by `filter`.
    #[must_use]
    pub fn with_filter(filter: ReportFilter) -> Self {
        Self {
            filter,
            _source: PhantomData,
        }
    }

    /// The value filter applied to every fragment.
    #[must_use]
    pub fn filter(&self) -> &ReportFilter {
        &self.filter
    }
}

impl<R: RequestSource> RequestReportBuilder<R> {
    /// Builds the report fragment for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Extraction`] if the request's part stream
    /// cannot be read. No fragment is produced in that case.
    pub fn build(&self, request: &R) -> Result<ReportFragment, ReportError> {
        let fragment = ReportFragment {
            url: request.uri(),
            cgi_data: Self::extract_environment_fields(request),
            params: self.extract_params(request)?,
        };

        debug!(
            url = %fragment.url,
            params = fragment.params.request_params.len(),
            headers = fragment.params.request_headers.len(),
            "built request report"
        );
        Ok(fragment)
    }

    /// Reads the fixed CGI environment fields. Unset fields stay `None`.
    #[must_use]
    pub fn extract_environment_fields(request: &R) -> CgiData {
        CgiData {
            request_method: request.method(),
            http_accept: request.header(cgi_headers::ACCEPT),
            http_user_agent: request.header(cgi_headers::USER_AGENT),
            http_accept_encoding: request.header(cgi_headers::ACCEPT_ENCODING),
            http_accept_language: request.header(cgi_headers::ACCEPT_LANGUAGE),
            http_accept_charset: request.header(cgi_headers::ACCEPT_CHARSET),
            server_name: request.server_name(),
            server_port: request.server_port(),
            content_type: request.content_type(),
            content_length: request.content_length(),
            remote_addr: request.remote_addr(),
            remote_port: request.remote_port(),
            query_string: request.query_string(),
            path_info: request.path_info(),
        }
    }

    /// Reads submitted parts and headers, applying the value filter.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Extraction`] if the part stream cannot be read.
    pub fn extract_params(&self, request: &R) -> Result<Params, ReportError> {
        let mut request_params = Self::request_params(request)?;
        let mut request_headers = Self::request_headers(request);

        self.filter.apply_params(&mut request_params);
        self.filter.apply_headers(&mut request_headers);

        Ok(Params {
            request_params,
            request_headers,
        })
    }

    fn request_params(request: &R) -> Result<IndexMap<String, String>, ReportError> {
        let parts = request.parts().map_err(|source| {
            warn!(error = %source, "unable to read request parts");
            ReportError::Extraction { source }
        })?;

        // A repeated name keeps its first position and takes the last value.
        Ok(parts
            .into_iter()
            .map(|part| {
                let value = format!("{part:?}");
                (part.name, value)
            })
            .collect())
    }

    fn request_headers(request: &R) -> IndexMap<String, String> {
        request
            .header_names()
            .into_iter()
            .filter_map(|name| request.header(&name).map(|value| (name, value)))
            .collect()
    }
}

impl<R: RequestSource + 'static> ReportRouter for RequestReportBuilder<R> {
    fn route(&self, source: &dyn Any) -> Result<ReportFragment, ReportError> {
        let request = source
            .downcast_ref::<R>()
            .ok_or(ReportError::UnsupportedSource {
                expected: type_name::<R>(),
            })?;
        self.build(request)
    }
}

impl<R> Default for RequestReportBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for RequestReportBuilder<R> {
    fn clone(&self) -> Self {
        Self::with_filter(self.filter.clone())
    }
}

impl<R> fmt::Debug for RequestReportBuilder<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestReportBuilder")
            .field("source", &type_name::<R>())
            .field("filter", &self.filter)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FILTERED;
    use crate::source::{PartReadError, RequestPart};

    /// In-memory request with case-preserving header names.
    #[derive(Debug, Default)]
    struct FakeRequest {
        uri: String,
        method: Option<String>,
        headers: Vec<(String, String)>,
        remote: Option<(String, u16)>,
        server: Option<(String, u16)>,
        content_type: Option<String>,
        content_length: Option<u64>,
        query: Option<String>,
        path_info: Option<String>,
        parts: Vec<RequestPart>,
        parts_error: Option<PartReadError>,
    }

    impl RequestSource for FakeRequest {
        fn uri(&self) -> String {
            self.uri.clone()
        }

        fn method(&self) -> Option<String> {
            self.method.clone()
        }

        fn header(&self, name: &str) -> Option<String> {
            self.headers
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone())
        }

        fn header_names(&self) -> Vec<String> {
            let mut names: Vec<String> = Vec::new();
            for (name, _) in &self.headers {
                if !names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
                    names.push(name.clone());
                }
            }
            names
        }

        fn remote_addr(&self) -> Option<String> {
            self.remote.as_ref().map(|(addr, _)| addr.clone())
        }

        fn remote_port(&self) -> Option<u16> {
            self.remote.as_ref().map(|(_, port)| *port)
        }

        fn server_name(&self) -> Option<String> {
            self.server.as_ref().map(|(name, _)| name.clone())
        }

        fn server_port(&self) -> Option<u16> {
            self.server.as_ref().map(|(_, port)| *port)
        }

        fn content_type(&self) -> Option<String> {
            self.content_type.clone()
        }

        fn content_length(&self) -> Option<u64> {
            self.content_length
        }

        fn query_string(&self) -> Option<String> {
            self.query.clone()
        }

        fn path_info(&self) -> Option<String> {
            self.path_info.clone()
        }

        fn parts(&self) -> Result<Vec<RequestPart>, PartReadError> {
            match &self.parts_error {
                Some(err) => Err(err.clone()),
                None => Ok(self.parts.clone()),
            }
        }
    }

    fn get(uri: &str) -> FakeRequest {
        FakeRequest {
            uri: uri.to_string(),
            method: Some("GET".to_string()),
            ..FakeRequest::default()
        }
    }

    fn header(name: &str, value: &str) -> (String, String) {
        (name.to_string(), value.to_string())
    }

    #[test]
    fn bare_get_reports_method_and_nulls() {
        let builder = RequestReportBuilder::new();
        let fragment = builder.build(&get("/orders")).unwrap();

        assert_eq!(fragment.url, "/orders");
        assert_eq!(fragment.cgi_data.request_method.as_deref(), Some("GET"));
        assert_eq!(fragment.cgi_data.http_accept, None);
        assert!(fragment.params.request_params.is_empty());
        assert!(fragment.params.request_headers.is_empty());

        let json = fragment.to_json().unwrap();
        assert_eq!(json["cgi_data"]["REQUEST_METHOD"], "GET");
        assert!(json["cgi_data"]["HTTP_ACCEPT"].is_null());
        assert_eq!(json["params"]["request_params"], serde_json::json!({}));
    }

    #[test]
    fn every_cgi_field_is_populated_from_its_accessor() {
        let request = FakeRequest {
            uri: "/app/upload".to_string(),
            method: Some("POST".to_string()),
            headers: vec![
                header("Accept", "text/html"),
                header("User-Agent", "curl/8.0"),
                header("Accept-Encoding", "gzip"),
                header("Accept-Language", "en-US"),
                header("Accept-Charset", "utf-8"),
            ],
            remote: Some(("10.0.0.7".to_string(), 51_234)),
            server: Some(("example.com".to_string(), 8443)),
            content_type: Some("multipart/form-data; boundary=x".to_string()),
            content_length: Some(512),
            query: Some("page=2".to_string()),
            path_info: Some("/upload".to_string()),
            ..FakeRequest::default()
        };

        let cgi = RequestReportBuilder::extract_environment_fields(&request);

        assert_eq!(
            cgi,
            CgiData {
                request_method: Some("POST".to_string()),
                http_accept: Some("text/html".to_string()),
                http_user_agent: Some("curl/8.0".to_string()),
                http_accept_encoding: Some("gzip".to_string()),
                http_accept_language: Some("en-US".to_string()),
                http_accept_charset: Some("utf-8".to_string()),
                server_name: Some("example.com".to_string()),
                server_port: Some(8443),
                content_type: Some("multipart/form-data; boundary=x".to_string()),
                content_length: Some(512),
                remote_addr: Some("10.0.0.7".to_string()),
                remote_port: Some(51_234),
                query_string: Some("page=2".to_string()),
                path_info: Some("/upload".to_string()),
            }
        );
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut request = get("/");
        request.headers = vec![header("accept", "application/json")];

        let cgi = RequestReportBuilder::extract_environment_fields(&request);
        assert_eq!(cgi.http_accept.as_deref(), Some("application/json"));
    }

    #[test]
    fn headers_map_names_to_first_value() {
        let mut request = get("/");
        request.headers = vec![header("X-Foo", "bar")];

        let fragment = RequestReportBuilder::new().build(&request).unwrap();
        assert_eq!(
            fragment.params.request_headers,
            IndexMap::from([("X-Foo".to_string(), "bar".to_string())])
        );

        request.headers.push(header("X-Foo", "baz"));
        let fragment = RequestReportBuilder::new().build(&request).unwrap();
        assert_eq!(fragment.params.request_headers["X-Foo"], "bar");
    }

    #[test]
    fn parts_are_keyed_by_name_with_debug_values() {
        let mut request = get("/");
        request.parts = vec![
            RequestPart::new("title", 5),
            RequestPart::new("file", 1024)
                .with_file_name("a.png")
                .with_content_type("image/png"),
        ];

        let fragment = RequestReportBuilder::new().build(&request).unwrap();
        let params = &fragment.params.request_params;

        assert_eq!(params.len(), 2);
        assert_eq!(params["title"], format!("{:?}", RequestPart::new("title", 5)));
        assert!(params["file"].contains("a.png"));
        assert!(params["file"].contains("size: 1024"));
    }

    #[test]
    fn headers_and_parts_keep_request_order() {
        let mut request = get("/");
        request.headers = vec![
            header("X-Trace", "1"),
            header("Accept", "*/*"),
            header("Content-Type", "text/plain"),
        ];
        request.parts = vec![RequestPart::new("zeta", 1), RequestPart::new("alpha", 1)];

        let fragment = RequestReportBuilder::new().build(&request).unwrap();

        let headers: Vec<_> = fragment.params.request_headers.keys().cloned().collect();
        assert_eq!(headers, vec!["X-Trace", "Accept", "Content-Type"]);
        let params: Vec<_> = fragment.params.request_params.keys().cloned().collect();
        assert_eq!(params, vec!["zeta", "alpha"]);
    }

    #[test]
    fn duplicate_part_names_keep_the_last_part() {
        let mut request = get("/");
        request.parts = vec![RequestPart::new("tag", 1), RequestPart::new("tag", 2)];

        let fragment = RequestReportBuilder::new().build(&request).unwrap();
        assert!(fragment.params.request_params["tag"].contains("size: 2"));
    }

    #[test]
    fn unreadable_parts_fail_with_extraction_error() {
        let mut request = get("/");
        request.parts_error = Some(PartReadError::new("malformed boundary"));

        let err = RequestReportBuilder::new().build(&request).unwrap_err();

        assert!(matches!(err, ReportError::Extraction { .. }));
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("malformed boundary"));
    }

    #[test]
    fn route_accepts_the_source_type() {
        let builder = RequestReportBuilder::<FakeRequest>::new();
        let request = get("/health");

        let fragment = builder.route(&request).unwrap();
        assert_eq!(fragment.url, "/health");
    }

    #[test]
    fn route_rejects_other_types() {
        let builder = RequestReportBuilder::<FakeRequest>::new();

        let err = builder.route(&"not a request").unwrap_err();

        assert!(matches!(err, ReportError::UnsupportedSource { .. }));
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("FakeRequest"));
    }

    #[test]
    fn route_through_trait_object() {
        let router: Box<dyn ReportRouter> = Box::new(RequestReportBuilder::<FakeRequest>::new());
        assert!(router.route(&get("/")).is_ok());
        assert!(router.route(&42_u32).is_err());
    }

    #[test]
    fn building_twice_yields_equal_fragments() {
        let mut request = get("/repeat");
        request.headers = vec![header("Accept", "*/*")];
        request.parts = vec![RequestPart::new("q", 3)];
        let builder = RequestReportBuilder::new();

        let first = builder.build(&request).unwrap();
        let second = builder.build(&request).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn filter_masks_values_but_keeps_keys() {
        let mut request = get("/login");
        request.headers = vec![header("Authorization", "Bearer t"), header("Accept", "*/*")];
        request.parts = vec![RequestPart::new("password", 8), RequestPart::new("user", 4)];
        let builder = RequestReportBuilder::with_filter(ReportFilter::new(
            ["password"],
            ["authorization"],
        ));

        let fragment = builder.build(&request).unwrap();

        assert_eq!(fragment.params.request_params["password"], FILTERED);
        assert_ne!(fragment.params.request_params["user"], FILTERED);
        assert_eq!(fragment.params.request_headers["Authorization"], FILTERED);
        assert_eq!(fragment.params.request_headers["Accept"], "*/*");
    }

    #[test]
    fn filter_does_not_touch_cgi_fields() {
        let mut request = get("/");
        request.headers = vec![header("User-Agent", "curl/8.0")];
        let builder = RequestReportBuilder::with_filter(ReportFilter::new(
            Vec::<String>::new(),
            ["user-agent"],
        ));

        let fragment = builder.build(&request).unwrap();

        assert_eq!(fragment.cgi_data.http_user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(fragment.params.request_headers["User-Agent"], FILTERED);
    }
}
