//! Boundary traits between HTTP frameworks and the cookie middleware.
//!
//! The middleware never sees framework types. A framework integration
//! implements these two traits for its request and response types (or
//! converts into [`RequestAdapter`](super::RequestAdapter) /
//! [`ResponseAdapter`](super::ResponseAdapter)).

use crate::request::CookieParams;

use super::Uri;

/// Request capabilities consumed by the cookie middleware.
///
/// # Examples
///
/// ```
/// use cookie_policy::CookieParams;
/// use cookie_policy::web::{CookieRequest, Uri};
///
/// struct MyFrameworkRequest {
///     uri: Uri,
///     cookies: CookieParams,
/// }
///
/// impl CookieRequest for MyFrameworkRequest {
///     fn cookie_params(&self) -> &CookieParams {
///         &self.cookies
///     }
///
///     fn with_cookie_params(mut self, params: CookieParams) -> Self {
///         self.cookies = params;
///         self
///     }
///
///     fn uri(&self) -> &Uri {
///         &self.uri
///     }
/// }
/// ```
pub trait CookieRequest: Sized {
    /// Returns the cookie parameters, already percent-decoded.
    fn cookie_params(&self) -> &CookieParams;

    /// Returns the request with its cookie parameters replaced.
    fn with_cookie_params(self, params: CookieParams) -> Self;

    /// Returns the request URI (scheme and host drive domain and `Secure`).
    fn uri(&self) -> &Uri;

    /// Returns the request ID used to tag log events, if any.
    fn request_id(&self) -> Option<&str> {
        None
    }
}

/// Response capabilities consumed by the cookie middleware.
pub trait CookieResponse: Sized {
    /// Returns every value of the named header, in order.
    ///
    /// Header names compare case-insensitively.
    fn header(&self, name: &str) -> Vec<String>;

    /// Returns the response with all values of the named header replaced.
    fn with_header(self, name: &str, values: Vec<String>) -> Self;
}
