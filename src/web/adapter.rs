//! Framework-agnostic request and response types.

use std::fmt;

use percent_encoding::percent_decode_str;

use crate::request::{CookieParams, CookieValue};

use super::{CookieRequest, CookieResponse};

/// The parts of a request URI the cookie middleware reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uri {
    scheme: String,
    host: String,
    path: String,
}

impl Uri {
    /// Creates a URI from its scheme, host and path.
    ///
    /// The scheme and host are lowercased, and a `:port` suffix on the host
    /// is dropped (`example.com:8080`, `[::1]:8080`).
    pub fn new(
        scheme: impl Into<String>,
        host: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        let host: String = host.into();
        Self {
            scheme: scheme.into().to_ascii_lowercase(),
            host: strip_port(&host).to_ascii_lowercase(),
            path: path.into(),
        }
    }

    /// Returns the scheme (e.g. `https`).
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the host without port.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns true for `https` requests.
    pub fn is_https(&self) -> bool {
        self.scheme == "https"
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.host, self.path)
    }
}

/// Returns `host` without a trailing `:port`.
///
/// Bracketed IPv6 literals keep their brackets; bare IPv6 addresses (more
/// than one colon) are returned unchanged.
fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    match host.split_once(':') {
        Some((name, port)) if !port.contains(':') => name,
        _ => host,
    }
}

/// Parses a `Cookie` request header into cookie parameters.
///
/// Pairs are separated by `;`, values are percent-decoded, and the first
/// occurrence of a name wins. Pairs without `=` or with an empty name are
/// skipped.
///
/// ```
/// use cookie_policy::web::parse_cookie_header;
///
/// let params = parse_cookie_header("a=1; b=hello%20world; a=2");
/// assert_eq!(params["a"].as_str(), Some("1"));
/// assert_eq!(params["b"].as_str(), Some("hello world"));
/// ```
pub fn parse_cookie_header(header: &str) -> CookieParams {
    let mut params = CookieParams::new();
    for pair in header.split(';') {
        let Some((name, value)) = pair.split_once('=') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let value = percent_decode_str(value.trim()).decode_utf8_lossy();
        params
            .entry(name.to_string())
            .or_insert_with(|| CookieValue::Text(value.into_owned()));
    }
    params
}

/// Owned request representation for framework integrations and tests.
///
/// # Examples
///
/// ```
/// use cookie_policy::web::{CookieRequest, RequestAdapter, Uri};
///
/// let request = RequestAdapter::new(Uri::new("https", "example.com", "/"))
///     .with_request_id("req-1")
///     .with_cookie_header("theme=dark; lang=en");
///
/// assert_eq!(request.cookie("theme").and_then(|v| v.as_str()), Some("dark"));
/// assert_eq!(request.request_id(), Some("req-1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestAdapter {
    request_id: Option<String>,
    uri: Uri,
    cookies: CookieParams,
}

impl RequestAdapter {
    /// Creates a request without cookies.
    pub fn new(uri: Uri) -> Self {
        Self {
            request_id: None,
            uri,
            cookies: CookieParams::new(),
        }
    }

    /// Sets the request ID.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Adds cookies parsed from a `Cookie` header.
    pub fn with_cookie_header(mut self, header: &str) -> Self {
        for (name, value) in parse_cookie_header(header) {
            self.cookies.entry(name).or_insert(value);
        }
        self
    }

    /// Adds or replaces one cookie parameter.
    pub fn add_cookie(&mut self, name: impl Into<String>, value: impl Into<CookieValue>) {
        self.cookies.insert(name.into(), value.into());
    }

    /// Returns a cookie parameter.
    pub fn cookie(&self, name: &str) -> Option<&CookieValue> {
        self.cookies.get(name)
    }

    /// Iterates over all cookie parameters in name order.
    pub fn cookies(&self) -> impl Iterator<Item = (&str, &CookieValue)> {
        self.cookies.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl CookieRequest for RequestAdapter {
    fn cookie_params(&self) -> &CookieParams {
        &self.cookies
    }

    fn with_cookie_params(mut self, params: CookieParams) -> Self {
        self.cookies = params;
        self
    }

    fn uri(&self) -> &Uri {
        &self.uri
    }

    fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }
}

/// Owned response representation for framework integrations and tests.
///
/// Headers keep insertion order and may repeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseAdapter {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

impl ResponseAdapter {
    /// Creates an empty response with the given status.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    /// Sets the body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Appends a header value.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// Returns the status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns all headers in order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

impl CookieResponse for ResponseAdapter {
    fn header(&self, name: &str) -> Vec<String> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
            .collect()
    }

    fn with_header(mut self, name: &str, values: Vec<String>) -> Self {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.headers
            .extend(values.into_iter().map(|v| (name.to_string(), v)));
        self
    }
}
