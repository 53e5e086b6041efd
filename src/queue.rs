//! Per-request queue of cookies scheduled for the response.

use chrono::{DateTime, TimeDelta, Utc};

use crate::cookie::{Cookie, SameSite};
use crate::policy::{substitute_host, CookiePolicy, HOST_PLACEHOLDER};
use crate::web::Uri;

/// Attributes for [`CookieQueue::set`].
///
/// Unset fields fall back to the queue: domain to the active domain, secure
/// to the request scheme. `HttpOnly` defaults to true.
///
/// ```
/// use chrono::TimeDelta;
/// use cookie_policy::{CookieOptions, SameSite};
///
/// let options = CookieOptions::new()
///     .lifetime(TimeDelta::days(30))
///     .path("/account")
///     .same_site(SameSite::Strict);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    lifetime: Option<TimeDelta>,
    expires: Option<DateTime<Utc>>,
    path: Option<String>,
    domain: Option<String>,
    secure: Option<bool>,
    http_only: bool,
    same_site: Option<SameSite>,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            lifetime: None,
            expires: None,
            path: None,
            domain: None,
            secure: None,
            http_only: true,
            same_site: None,
        }
    }
}

impl CookieOptions {
    /// Returns the default options (session cookie, queue domain and scheme).
    pub fn new() -> Self {
        Self::default()
    }

    /// Expires the cookie `lifetime` after it is scheduled.
    pub fn lifetime(mut self, lifetime: TimeDelta) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    /// Expires the cookie at a fixed instant; takes precedence over `lifetime`.
    pub fn expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Sets the path (default `/`).
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Overrides the domain; `%s` is replaced with the request host.
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Overrides the `Secure` flag.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self
    }

    /// Sets the `HttpOnly` flag.
    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Sets the `SameSite` attribute.
    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }
}

/// Cookies scheduled for one response.
///
/// A queue is created fresh for every request and exclusively owned by that
/// request's processing. Entries are append-only: setting or deleting the
/// same name twice emits two `Set-Cookie` headers and the client keeps the
/// last one.
///
/// # Examples
///
/// ```
/// use cookie_policy::{CookieOptions, CookieQueue};
///
/// let mut queue = CookieQueue::new(Some("example.com".into()), Some(".example.com".into()), true);
/// queue.set("name", "value", CookieOptions::new());
/// queue.delete("name");
///
/// let scheduled = queue.scheduled();
/// assert_eq!(scheduled.len(), 2);
/// assert_eq!(scheduled[0].domain(), Some(".example.com"));
/// assert!(scheduled[0].is_secure());
/// assert!(scheduled[1].is_deletion());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieQueue {
    host: Option<String>,
    active_domain: Option<String>,
    secure: bool,
    scheduled: Vec<Cookie>,
}

impl CookieQueue {
    /// Creates an empty queue.
    ///
    /// `host` is substituted for `%s` in per-cookie domains; `active_domain`
    /// is the default domain; `secure` is the default `Secure` flag.
    pub fn new(host: Option<String>, active_domain: Option<String>, secure: bool) -> Self {
        Self {
            host,
            active_domain,
            secure,
            scheduled: Vec::new(),
        }
    }

    /// Creates the queue for a request: domain resolved by `policy`, secure
    /// when the scheme is `https`.
    pub fn for_request(policy: &CookiePolicy, uri: &Uri) -> Self {
        let host = Some(uri.host().to_string()).filter(|h| !h.is_empty());
        Self::new(host, policy.resolve_domain(uri), uri.is_https())
    }

    /// Returns the domain cookies are scoped to by default.
    pub fn active_domain(&self) -> Option<&str> {
        self.active_domain.as_deref()
    }

    /// Returns the default `Secure` flag.
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Schedules a cookie built from `name`, `value` and `options`.
    ///
    /// Expiries are kept between the Unix epoch and the end of year 9999, the
    /// range a `Set-Cookie` date can express; a lifetime past that range
    /// yields the latest expressible expiry.
    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        options: CookieOptions,
    ) {
        let expires = options
            .expires
            .or_else(|| options.lifetime.map(|lifetime| expiry_after(Utc::now(), lifetime)))
            .map(|at| at.clamp(DateTime::<Utc>::UNIX_EPOCH, latest_expiry()));

        let mut cookie = Cookie::new(name, value)
            .with_expires(expires)
            .with_secure(options.secure.unwrap_or(self.secure))
            .with_http_only(options.http_only);

        if let Some(path) = options.path {
            cookie = cookie.with_path(path);
        }
        if let Some(domain) = self.domain_for(options.domain) {
            cookie = cookie.with_domain(domain);
        }
        if let Some(same_site) = options.same_site {
            cookie = cookie.with_same_site(same_site);
        }

        self.schedule(cookie);
    }

    /// Schedules a deletion of `name` on the active domain.
    ///
    /// Earlier entries for the same name are kept.
    pub fn delete(&mut self, name: impl Into<String>) {
        let mut cookie = Cookie::expired(name).with_secure(self.secure);
        if let Some(domain) = &self.active_domain {
            cookie = cookie.with_domain(domain.clone());
        }
        self.schedule(cookie);
    }

    /// Schedules a prebuilt cookie as-is.
    pub fn schedule(&mut self, cookie: Cookie) {
        self.scheduled.push(cookie);
    }

    /// Returns the scheduled cookies in insertion order.
    pub fn scheduled(&self) -> &[Cookie] {
        &self.scheduled
    }

    /// Consumes the queue, returning the scheduled cookies.
    pub fn into_scheduled(self) -> Vec<Cookie> {
        self.scheduled
    }

    fn domain_for(&self, explicit: Option<String>) -> Option<String> {
        match explicit {
            None => self.active_domain.clone(),
            Some(domain) if domain.contains(HOST_PLACEHOLDER) => self
                .host
                .as_deref()
                .map(|host| substitute_host(&domain, host)),
            Some(domain) => Some(domain),
        }
    }
}

/// End of year 9999, the last instant with a four-digit `Expires` year.
const LATEST_EXPIRY_SECS: i64 = 253_402_300_799;

fn latest_expiry() -> DateTime<Utc> {
    DateTime::from_timestamp(LATEST_EXPIRY_SECS, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Adds `lifetime` to `now`, saturating instead of overflowing.
fn expiry_after(now: DateTime<Utc>, lifetime: TimeDelta) -> DateTime<Utc> {
    match now.checked_add_signed(lifetime) {
        Some(at) => at,
        None if lifetime < TimeDelta::zero() => DateTime::<Utc>::UNIX_EPOCH,
        None => latest_expiry(),
    }
}
