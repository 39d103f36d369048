//! Masking of sensitive parameter and header values.

use indexmap::IndexMap;

use crate::delimited::parse_delimited_list;

/// Replacement written in place of a filtered value.
pub const FILTERED: &str = "[FILTERED]";

/// Names whose values are masked in a report fragment.
///
/// Matching is case-insensitive. Masked keys stay in the fragment so its
/// key set does not change; only the value is replaced with [`FILTERED`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    params: Vec<String>,
    headers: Vec<String>,
}

impl ReportFilter {
    /// Creates a filter from parameter and header name lists.
    #[must_use]
    pub fn new<P, H>(params: P, headers: H) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        H: IntoIterator,
        H::Item: AsRef<str>,
    {
        Self {
            params: normalize(params),
            headers: normalize(headers),
        }
    }

    /// Creates a filter from two comma-delimited settings.
    #[must_use]
    pub fn from_delimited(params: Option<&str>, headers: Option<&str>) -> Self {
        Self::new(parse_delimited_list(params), parse_delimited_list(headers))
    }

    /// Whether this filter masks nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty() && self.headers.is_empty()
    }

    /// Whether the named parameter is masked.
    #[must_use]
    pub fn masks_param(&self, name: &str) -> bool {
        contains(&self.params, name)
    }

    /// Whether the named header is masked.
    #[must_use]
    pub fn masks_header(&self, name: &str) -> bool {
        contains(&self.headers, name)
    }

    pub(crate) fn apply_params(&self, params: &mut IndexMap<String, String>) {
        mask(params, &self.params);
    }

    pub(crate) fn apply_headers(&self, headers: &mut IndexMap<String, String>) {
        mask(headers, &self.headers);
    }
}

fn normalize<I>(names: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    names
        .into_iter()
        .map(|n| n.as_ref().trim().to_ascii_lowercase())
        .filter(|n| !n.is_empty())
        .collect()
}

fn contains(names: &[String], name: &str) -> bool {
    names.iter().any(|n| n.eq_ignore_ascii_case(name))
}

fn mask(values: &mut IndexMap<String, String>, names: &[String]) {
    for (key, value) in values.iter_mut() {
        if contains(names, key) {
            tracing::debug!(key = %key, "masking filtered value");
            *value = FILTERED.to_string();
        }
    }
}
