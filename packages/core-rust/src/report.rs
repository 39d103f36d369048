//! Report fragment: the request section of an error notice.
//!
//! Field names and nesting follow the collector's notice format, so the
//! serialized form of [`ReportFragment`] can be embedded as-is under the
//! notice's `request` key.

use indexmap::IndexMap;
use serde::Serialize;

/// Snapshot of one request, shaped for the error collector.
///
/// Key order on serialization is `url`, `cgi_data`, `params`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportFragment {
    /// Request path as reported by the source.
    pub url: String,
    /// CGI-style environment fields.
    pub cgi_data: CgiData,
    /// Submitted parameters and request headers.
    pub params: Params,
}

impl ReportFragment {
    /// Renders the fragment as a JSON value.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if the fragment cannot be represented
    /// as JSON.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Fixed set of CGI-style environment fields.
///
/// Every field is always serialized. Unset fields become `null` rather than
/// being omitted, so the key set never depends on request content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CgiData {
    pub request_method: Option<String>,
    pub http_accept: Option<String>,
    pub http_user_agent: Option<String>,
    pub http_accept_encoding: Option<String>,
    pub http_accept_language: Option<String>,
    pub http_accept_charset: Option<String>,
    pub server_name: Option<String>,
    pub server_port: Option<u16>,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub remote_addr: Option<String>,
    pub remote_port: Option<u16>,
    pub query_string: Option<String>,
    pub path_info: Option<String>,
}

impl CgiData {
    /// Serialized key names, in output order.
    pub const KEYS: [&'static str; 14] = [
        "REQUEST_METHOD",
        "HTTP_ACCEPT",
        "HTTP_USER_AGENT",
        "HTTP_ACCEPT_ENCODING",
        "HTTP_ACCEPT_LANGUAGE",
        "HTTP_ACCEPT_CHARSET",
        "SERVER_NAME",
        "SERVER_PORT",
        "CONTENT_TYPE",
        "CONTENT_LENGTH",
        "REMOTE_ADDR",
        "REMOTE_PORT",
        "QUERY_STRING",
        "PATH_INFO",
    ];
}

/// Parameter section of a report fragment.
///
/// Both maps keep the order in which the request exposed its entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Params {
    /// Submitted parts by name. Values describe the part, not its payload.
    pub request_params: IndexMap<String, String>,
    /// Header name to first header value.
    pub request_headers: IndexMap<String, String>,
}
