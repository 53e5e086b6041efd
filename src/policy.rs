use std::collections::BTreeSet;
use std::fmt;
use std::net::IpAddr;

use crate::error::{ConfigError, ConfigErrorKind};
use crate::web::Uri;

/// Placeholder in domain patterns replaced by the request host.
pub(crate) const HOST_PLACEHOLDER: &str = "%s";

/// The method used to protect cookie values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protection {
    /// Values travel as plaintext
    Unprotected,
    /// Values are signed with an HMAC suffix
    Hmac,
    /// Values are encrypted with authenticated encryption
    #[default]
    Encrypt,
}

impl fmt::Display for Protection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protection::Unprotected => write!(f, "unprotected"),
            Protection::Hmac => write!(f, "hmac"),
            Protection::Encrypt => write!(f, "encrypt"),
        }
    }
}

/// Cookie protection policy.
///
/// Decides which cookies are protected and how, and which domain outgoing
/// cookies are scoped to. Immutable once built; share it behind an `Arc`.
///
/// # Examples
///
/// ```
/// use cookie_policy::{CookiePolicy, Protection};
/// use cookie_policy::web::Uri;
///
/// let policy = CookiePolicy::builder()
///     .domain_pattern(".%s")
///     .protection(Protection::Hmac)
///     .exclude("PHPSESSID")
///     .build()
///     .expect("valid policy");
///
/// assert!(policy.is_protected("remember_me"));
/// assert!(!policy.is_protected("PHPSESSID"));
///
/// let uri = Uri::new("https", "example.com", "/");
/// assert_eq!(policy.resolve_domain(&uri).as_deref(), Some(".example.com"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePolicy {
    domain_pattern: String,
    protection: Protection,
    excluded: BTreeSet<String>,
}

impl CookiePolicy {
    /// Starts building a policy from the defaults.
    pub fn builder() -> CookiePolicyBuilder {
        CookiePolicyBuilder::new()
    }

    /// Returns the domain pattern.
    pub fn domain_pattern(&self) -> &str {
        &self.domain_pattern
    }

    /// Returns the protection method.
    pub fn protection(&self) -> Protection {
        self.protection
    }

    /// Returns the names exempt from protection.
    pub fn excluded(&self) -> impl Iterator<Item = &str> {
        self.excluded.iter().map(String::as_str)
    }

    /// Resolves the cookie domain for a request.
    ///
    /// Returns `None` when the host is empty or an IP literal, since browsers
    /// reject a `Domain` attribute there. A pattern without `%s` is returned
    /// verbatim.
    pub fn resolve_domain(&self, uri: &Uri) -> Option<String> {
        let host = uri.host();
        if host.is_empty() || is_ip_literal(host) {
            return None;
        }
        Some(substitute_host(&self.domain_pattern, host))
    }

    /// Returns true if cookies named `name` are encoded and decoded.
    ///
    /// Exempt names (exact match) and every name under
    /// [`Protection::Unprotected`] pass through unmodified in both directions.
    pub fn is_protected(&self, name: &str) -> bool {
        self.protection != Protection::Unprotected && !self.excluded.contains(name)
    }
}

impl Default for CookiePolicy {
    /// Pattern `.%s`, [`Protection::Encrypt`], session id and CSRF token exempt.
    fn default() -> Self {
        Self {
            domain_pattern: ".%s".to_string(),
            protection: Protection::Encrypt,
            excluded: ["PHPSESSID", "csrf-token"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Validating builder for [`CookiePolicy`].
#[derive(Debug, Clone)]
pub struct CookiePolicyBuilder {
    policy: CookiePolicy,
}

impl CookiePolicyBuilder {
    fn new() -> Self {
        Self {
            policy: CookiePolicy::default(),
        }
    }

    /// Sets the domain pattern; `%s` is replaced with the request host.
    pub fn domain_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.policy.domain_pattern = pattern.into();
        self
    }

    /// Sets the protection method.
    pub fn protection(mut self, protection: Protection) -> Self {
        self.policy.protection = protection;
        self
    }

    /// Exempts a cookie name from protection.
    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.policy.excluded.insert(name.into());
        self
    }

    /// Removes every exemption, including the defaults.
    pub fn clear_excluded(mut self) -> Self {
        self.policy.excluded.clear();
        self
    }

    /// Validates and returns the policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigErrorKind::InvalidDomainPattern`] if the pattern is
    /// empty or contains more than one `%s`.
    pub fn build(self) -> Result<CookiePolicy, ConfigError> {
        let pattern = &self.policy.domain_pattern;
        if pattern.trim().is_empty() {
            return Err(ConfigError::new(
                ConfigErrorKind::InvalidDomainPattern,
                "domain pattern must not be empty",
            ));
        }
        if pattern.matches(HOST_PLACEHOLDER).count() > 1 {
            return Err(ConfigError::new(
                ConfigErrorKind::InvalidDomainPattern,
                format!("domain pattern '{pattern}' has more than one %s placeholder"),
            ));
        }
        Ok(self.policy)
    }
}

/// Replaces the first `%s` in `pattern` with `host`.
pub(crate) fn substitute_host(pattern: &str, host: &str) -> String {
    pattern.replacen(HOST_PLACEHOLDER, host, 1)
}

fn is_ip_literal(host: &str) -> bool {
    let bare = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    bare.parse::<IpAddr>().is_ok()
}
