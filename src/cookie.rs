//! Immutable cookie value object and `Set-Cookie` serialization.

use std::fmt;

use chrono::{DateTime, Utc};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left as-is in a serialized cookie value: RFC 3986 unreserved.
///
/// Base64url output (used by both protected encodings) passes through untouched.
const VALUE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Removes characters that would end or split a `Set-Cookie` field: `;`,
/// control characters, and any of `extra`.
fn header_safe(raw: String, extra: &[char]) -> String {
    let unsafe_char = |c: char| c == ';' || c.is_control() || extra.contains(&c);
    if raw.contains(unsafe_char) {
        raw.chars().filter(|&c| !unsafe_char(c)).collect()
    } else {
        raw
    }
}

/// The `SameSite` attribute of a cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    /// Sent on top-level navigations and same-site requests
    Lax,
    /// Sent on same-site requests only
    Strict,
    /// Sent on all requests (browsers require `Secure`)
    None,
}

impl SameSite {
    /// Parses an attribute value case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("lax") {
            Some(SameSite::Lax)
        } else if value.eq_ignore_ascii_case("strict") {
            Some(SameSite::Strict)
        } else if value.eq_ignore_ascii_case("none") {
            Some(SameSite::None)
        } else {
            None
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SameSite::Lax => write!(f, "Lax"),
            SameSite::Strict => write!(f, "Strict"),
            SameSite::None => write!(f, "None"),
        }
    }
}

/// A single cookie scheduled for, or received in, one request/response cycle.
///
/// `Cookie` is immutable: the `with_*` methods return a modified copy. A
/// cookie with an empty value and an expiry in the past instructs the client
/// to delete it.
///
/// # Examples
///
/// ```
/// use cookie_policy::{Cookie, SameSite};
///
/// let cookie = Cookie::new("theme", "dark mode")
///     .with_domain(".example.com")
///     .with_secure(true)
///     .with_same_site(SameSite::Lax);
///
/// assert_eq!(
///     cookie.create_header(),
///     "theme=dark%20mode; Path=/; Domain=.example.com; Secure; HttpOnly; SameSite=Lax"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    name: String,
    value: String,
    expires: Option<DateTime<Utc>>,
    path: String,
    domain: Option<String>,
    secure: bool,
    http_only: bool,
    same_site: Option<SameSite>,
}

impl Cookie {
    /// Creates a session cookie with default attributes.
    ///
    /// Defaults: path `/`, no domain, not secure, `HttpOnly`, no `SameSite`.
    /// `;`, `=` and control characters are removed from the name.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: header_safe(name.into(), &['=']),
            value: value.into(),
            expires: None,
            path: "/".to_string(),
            domain: None,
            secure: false,
            http_only: true,
            same_site: None,
        }
    }

    /// Creates a deletion cookie: empty value, expiry at the Unix epoch.
    pub fn expired(name: impl Into<String>) -> Self {
        Self::new(name, "").with_expires(Some(DateTime::<Utc>::UNIX_EPOCH))
    }

    /// Returns the cookie name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw (not percent-encoded) value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the expiry, or `None` for a session cookie.
    pub fn expires(&self) -> Option<DateTime<Utc>> {
        self.expires
    }

    /// Returns the path attribute.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the domain attribute, if any.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Returns whether the `Secure` flag is set.
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Returns whether the `HttpOnly` flag is set.
    pub fn is_http_only(&self) -> bool {
        self.http_only
    }

    /// Returns the `SameSite` attribute, if any.
    pub fn same_site(&self) -> Option<SameSite> {
        self.same_site
    }

    /// Returns a copy with a different value.
    pub fn with_value(&self, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..self.clone()
        }
    }

    /// Returns a copy with the given expiry (`None` makes it a session cookie).
    pub fn with_expires(mut self, expires: Option<DateTime<Utc>>) -> Self {
        self.expires = expires;
        self
    }

    /// Returns a copy with the given path; `;` and control characters are
    /// removed.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = header_safe(path.into(), &[]);
        self
    }

    /// Returns a copy with the given domain; `;` and control characters are
    /// removed.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(header_safe(domain.into(), &[]));
        self
    }

    /// Returns a copy without a domain attribute.
    pub fn without_domain(mut self) -> Self {
        self.domain = None;
        self
    }

    /// Returns a copy with the `Secure` flag set as given.
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Returns a copy with the `HttpOnly` flag set as given.
    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Returns a copy with the given `SameSite` attribute.
    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    /// Returns true when the cookie has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|at| at <= now)
    }

    /// Returns true when this cookie asks the client to drop the named cookie.
    pub fn is_deletion(&self) -> bool {
        self.value.is_empty() && self.is_expired_at(Utc::now())
    }

    /// Serializes the cookie into a `Set-Cookie` header value.
    ///
    /// Attributes are emitted only when set: `Expires` for non-session
    /// cookies, `Domain` when present, and the flags when true.
    pub fn create_header(&self) -> String {
        let mut header = format!(
            "{}={}",
            self.name,
            utf8_percent_encode(&self.value, VALUE_ENCODE_SET)
        );

        if let Some(expires) = self.expires {
            header.push_str("; Expires=");
            header.push_str(&expires.format(HTTP_DATE_FORMAT).to_string());
        }
        if !self.path.is_empty() {
            header.push_str("; Path=");
            header.push_str(&self.path);
        }
        if let Some(domain) = &self.domain {
            header.push_str("; Domain=");
            header.push_str(domain);
        }
        if self.secure {
            header.push_str("; Secure");
        }
        if self.http_only {
            header.push_str("; HttpOnly");
        }
        if let Some(same_site) = self.same_site {
            header.push_str("; SameSite=");
            header.push_str(&same_site.to_string());
        }

        header
    }

    /// Parses a `Set-Cookie` header value produced by [`create_header`](Self::create_header)
    /// or any conforming server.
    ///
    /// Unknown attributes and `Max-Age` are ignored. Returns `None` when the
    /// leading `name=value` pair is missing or the name is empty.
    ///
    /// ```
    /// use cookie_policy::Cookie;
    ///
    /// let cookie = Cookie::parse("sid=a%2Fb; Path=/app; HttpOnly").unwrap();
    /// assert_eq!(cookie.name(), "sid");
    /// assert_eq!(cookie.value(), "a/b");
    /// assert_eq!(cookie.path(), "/app");
    /// assert!(!cookie.is_secure());
    /// ```
    pub fn parse(header: &str) -> Option<Self> {
        let mut parts = header.split(';');
        let (name, raw_value) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let value = percent_decode_str(raw_value.trim()).decode_utf8().ok()?;

        let mut cookie = Cookie::new(name, value).with_http_only(false);
        for attribute in parts {
            let (key, val) = match attribute.split_once('=') {
                Some((k, v)) => (k.trim(), v.trim()),
                None => (attribute.trim(), ""),
            };

            if key.eq_ignore_ascii_case("expires") {
                cookie.expires = DateTime::parse_from_rfc2822(val)
                    .ok()
                    .map(|at| at.with_timezone(&Utc));
            } else if key.eq_ignore_ascii_case("path") {
                cookie.path = val.to_string();
            } else if key.eq_ignore_ascii_case("domain") {
                cookie.domain = Some(val.to_string());
            } else if key.eq_ignore_ascii_case("secure") {
                cookie.secure = true;
            } else if key.eq_ignore_ascii_case("httponly") {
                cookie.http_only = true;
            } else if key.eq_ignore_ascii_case("samesite") {
                cookie.same_site = SameSite::parse(val);
            }
        }

        Some(cookie)
    }
}
