//! The cookie protection middleware.
//!
//! Per request, [`CookieMiddleware::process`] runs:
//!
//! ```text
//! Received
//!   ↓  decode every protected inbound cookie (failures become Absent)
//! Decoding
//!   ↓  fresh CookieQueue lent to the handler through CookieCtx
//! Scoped-Execution
//!   ↓  encode protected scheduled cookies, append Set-Cookie headers
//! Encoding
//!   ↓
//! Sent
//! ```
//!
//! Handler errors propagate unchanged. Nothing here retries, spawns or locks.

use std::sync::Arc;

use crate::codec::Codec;
use crate::context::CookieCtx;
use crate::cookie::Cookie;
use crate::crypto::Encrypter;
use crate::error::{ConfigError, CryptoError, Error};
use crate::logging::CookieLog;
use crate::policy::CookiePolicy;
use crate::queue::CookieQueue;
use crate::request::CookieParams;

use super::{CookieRequest, CookieResponse};

/// Name of the response header cookies are attached to.
pub const SET_COOKIE: &str = "Set-Cookie";

/// Encrypts or signs outgoing cookies and decodes incoming ones.
///
/// Holds only read-only state (the policy and the codec), so one instance is
/// shared by all requests; clone it freely.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use cookie_policy::{AesGcmEncrypter, CookieOptions, CookiePolicy, Error, Protection};
/// use cookie_policy::web::{CookieMiddleware, CookieResponse, RequestAdapter, ResponseAdapter, Uri};
///
/// let policy = CookiePolicy::builder().protection(Protection::Hmac).build()?;
/// let middleware = CookieMiddleware::builder(policy)
///     .encrypter(Arc::new(AesGcmEncrypter::generate()))
///     .build()?;
///
/// let request = RequestAdapter::new(Uri::new("https", "example.com", "/"));
/// let response = middleware.process(request, |_request, ctx| {
///     ctx.set("name", "value", CookieOptions::new());
///     Ok::<_, Error>(ResponseAdapter::new(200))
/// })?;
///
/// let header = &response.header("Set-Cookie")[0];
/// assert!(header.starts_with("name=value"));
/// assert!(header.contains("; Domain=.example.com; Secure; HttpOnly"));
/// # Ok::<(), Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct CookieMiddleware {
    policy: Arc<CookiePolicy>,
    codec: Codec,
}

impl CookieMiddleware {
    /// Starts building a middleware for `policy`.
    pub fn builder(policy: CookiePolicy) -> CookieMiddlewareBuilder {
        CookieMiddlewareBuilder {
            policy,
            encrypter: None,
        }
    }

    /// Returns the policy.
    pub fn policy(&self) -> &CookiePolicy {
        &self.policy
    }

    /// Returns the codec selected from the policy.
    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Runs `handler` for `request` with cookie protection applied.
    ///
    /// The handler receives the request with decoded cookie parameters and a
    /// [`CookieCtx`] holding a queue created for this call only.
    ///
    /// # Errors
    ///
    /// Returns the handler's error unchanged, or an [`Error::Crypto`]
    /// (converted into `E`) if an outgoing cookie cannot be encoded.
    pub fn process<Req, Resp, E, F>(&self, request: Req, handler: F) -> Result<Resp, E>
    where
        Req: CookieRequest,
        Resp: CookieResponse,
        E: From<Error>,
        F: FnOnce(Req, &mut CookieCtx<'_>) -> Result<Resp, E>,
    {
        let request_id = request.request_id().map(str::to_string);
        let log = CookieLog::new(request_id.as_deref());

        let mut queue = CookieQueue::for_request(&self.policy, request.uri());
        let request = self.decode_request(request, log);

        let response = {
            let mut ctx = CookieCtx::new(request_id.clone(), &mut queue);
            handler(request, &mut ctx)?
        };

        self.pack_response(response, queue, log).map_err(E::from)
    }

    /// Replaces every protected cookie parameter with its decoded value.
    ///
    /// Values that fail verification become
    /// [`CookieValue::Absent`](crate::CookieValue::Absent); exempt cookies
    /// are untouched.
    pub(crate) fn decode_request<Req: CookieRequest>(
        &self,
        request: Req,
        log: CookieLog<'_>,
    ) -> Req {
        if matches!(self.codec, Codec::Unprotected) {
            return request;
        }

        let decoded: CookieParams = request
            .cookie_params()
            .iter()
            .map(|(name, value)| {
                if !self.policy.is_protected(name) {
                    return (name.clone(), value.clone());
                }
                let before = value.absent_leaves();
                let decoded = self.codec.decode_value(value.clone());
                let rejected = decoded.absent_leaves().saturating_sub(before);
                if rejected > 0 {
                    log.rejected(name, rejected);
                }
                (name.clone(), decoded)
            })
            .collect();

        request.with_cookie_params(decoded)
    }

    /// Encodes one outgoing cookie according to the policy.
    ///
    /// Exempt cookies and cookies with an empty value (deletions) pass
    /// through unchanged.
    ///
    /// # Errors
    ///
    /// Returns a [`CryptoError`] if the codec fails.
    pub fn encode_cookie(&self, cookie: &Cookie) -> Result<Cookie, CryptoError> {
        if cookie.value().is_empty() || !self.policy.is_protected(cookie.name()) {
            return Ok(cookie.clone());
        }
        Ok(cookie.with_value(self.codec.encode(cookie.value())?))
    }

    /// Appends the queue's cookies to the response's `Set-Cookie` headers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Crypto`] if any cookie cannot be encoded; no headers
    /// are attached in that case.
    pub(crate) fn pack_response<Resp: CookieResponse>(
        &self,
        response: Resp,
        queue: CookieQueue,
        log: CookieLog<'_>,
    ) -> Result<Resp, Error> {
        let scheduled = queue.into_scheduled();
        if scheduled.is_empty() {
            return Ok(response);
        }

        let mut headers = response.header(SET_COOKIE);
        let existing = headers.len();
        for cookie in &scheduled {
            let encoded = self.encode_cookie(cookie).map_err(|e| {
                log.encode_failed(cookie.name(), &e);
                Error::from(e)
            })?;
            headers.push(encoded.create_header());
        }
        log.packed(scheduled.len(), existing);

        Ok(response.with_header(SET_COOKIE, headers))
    }
}

/// Builder for [`CookieMiddleware`].
pub struct CookieMiddlewareBuilder {
    policy: CookiePolicy,
    encrypter: Option<Arc<dyn Encrypter>>,
}

impl CookieMiddlewareBuilder {
    /// Supplies the encryption capability.
    pub fn encrypter(mut self, encrypter: Arc<dyn Encrypter>) -> Self {
        self.encrypter = Some(encrypter);
        self
    }

    /// Selects the codec and builds the middleware.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigErrorKind::MissingEncrypter`](crate::ConfigErrorKind::MissingEncrypter)
    /// when the policy protects cookies and no encrypter was supplied.
    pub fn build(self) -> Result<CookieMiddleware, ConfigError> {
        let codec = Codec::for_protection(self.policy.protection(), self.encrypter)?;
        Ok(CookieMiddleware {
            policy: Arc::new(self.policy),
            codec,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::AesGcmEncrypter;
    use crate::error::ConfigErrorKind;
    use crate::policy::Protection;
    use crate::queue::CookieOptions;
    use crate::request::CookieValue;
    use crate::web::{RequestAdapter, ResponseAdapter, Uri};

    fn middleware(protection: Protection) -> CookieMiddleware {
        let policy = CookiePolicy::builder()
            .protection(protection)
            .exclude("PHPSESSID")
            .build()
            .unwrap();
        CookieMiddleware::builder(policy)
            .encrypter(Arc::new(AesGcmEncrypter::new([42u8; 32])))
            .build()
            .unwrap()
    }

    fn request() -> RequestAdapter {
        RequestAdapter::new(Uri::new("http", "example.com", "/")).with_request_id("req-test")
    }

    #[test]
    fn build_requires_encrypter_for_protected_policies() {
        let err = CookieMiddleware::builder(CookiePolicy::default())
            .build()
            .unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::MissingEncrypter);

        let unprotected = CookiePolicy::builder()
            .protection(Protection::Unprotected)
            .build()
            .unwrap();
        assert!(CookieMiddleware::builder(unprotected).build().is_ok());
    }

    #[test]
    fn decode_request_leaves_exempt_cookies_alone() {
        let middleware = middleware(Protection::Encrypt);
        let mut request = request();
        request.add_cookie("PHPSESSID", "raw-session");
        request.add_cookie("name", "not-encrypted");

        let decoded = middleware.decode_request(request, CookieLog::new(None));

        assert_eq!(
            decoded.cookie("PHPSESSID").and_then(|v| v.as_str()),
            Some("raw-session")
        );
        assert_eq!(decoded.cookie("name"), Some(&CookieValue::Absent));
    }

    #[test]
    fn encode_cookie_skips_empty_and_exempt_values() {
        let middleware = middleware(Protection::Hmac);

        let deletion = Cookie::expired("name");
        assert_eq!(middleware.encode_cookie(&deletion).unwrap(), deletion);

        let exempt = Cookie::new("PHPSESSID", "abc");
        assert_eq!(middleware.encode_cookie(&exempt).unwrap(), exempt);

        let protected = Cookie::new("name", "abc");
        assert_ne!(middleware.encode_cookie(&protected).unwrap().value(), "abc");
    }

    #[test]
    fn pack_response_preserves_existing_headers() {
        let middleware = middleware(Protection::Unprotected);
        let mut response = ResponseAdapter::new(200);
        response.add_header(SET_COOKIE, "existing=1");

        let mut queue = CookieQueue::new(None, None, false);
        queue.set("name", "value", CookieOptions::new());

        let response = middleware
            .pack_response(response, queue, CookieLog::new(None))
            .unwrap();

        assert_eq!(
            response.header(SET_COOKIE),
            ["existing=1", "name=value; Path=/; HttpOnly"]
        );
    }

    #[test]
    fn empty_queue_leaves_response_untouched() {
        let middleware = middleware(Protection::Encrypt);
        let response = ResponseAdapter::new(200).with_body("ok");

        let queue = CookieQueue::new(None, None, false);
        let packed = middleware
            .pack_response(response.clone(), queue, CookieLog::new(None))
            .unwrap();

        assert_eq!(packed, response);
    }

    #[test]
    fn handler_error_propagates_unchanged() {
        #[derive(Debug, PartialEq)]
        enum AppError {
            NotFound,
            Cookie,
        }
        impl From<Error> for AppError {
            fn from(_: Error) -> Self {
                AppError::Cookie
            }
        }

        let middleware = middleware(Protection::Encrypt);
        let result: Result<ResponseAdapter, AppError> = middleware.process(request(), |_, ctx| {
            ctx.set("name", "value", CookieOptions::new());
            Err(AppError::NotFound)
        });

        assert_eq!(result.unwrap_err(), AppError::NotFound);
    }

    #[test]
    fn context_carries_request_id() {
        let middleware = middleware(Protection::Hmac);
        let response = middleware
            .process(request(), |_, ctx| {
                let id = ctx.request_id().unwrap_or_default().to_string();
                Ok::<_, Error>(ResponseAdapter::new(200).with_body(id))
            })
            .unwrap();

        assert_eq!(response.body(), "req-test");
    }
}
