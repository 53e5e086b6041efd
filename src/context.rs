use crate::cookie::Cookie;
use crate::logging::CookieLog;
use crate::queue::{CookieOptions, CookieQueue};

/// Request-scoped context handed to the downstream handler.
///
/// `CookieCtx` lends the request's [`CookieQueue`] to the handler for the
/// duration of one [`CookieMiddleware::process`](crate::web::CookieMiddleware::process)
/// call. The borrow ends when the handler returns, on every path, so the
/// queue can be neither leaked into another request nor observed by one.
/// Nested sub-requests get a context of their own.
///
/// There is no ambient or global binding: code that needs to schedule
/// cookies must be passed the context explicitly.
///
/// # Examples
///
/// ```
/// use cookie_policy::{AesGcmEncrypter, CookieOptions, CookiePolicy, Error};
/// use cookie_policy::web::{CookieMiddleware, CookieResponse, RequestAdapter, ResponseAdapter, Uri};
/// use std::sync::Arc;
///
/// let middleware = CookieMiddleware::builder(CookiePolicy::default())
///     .encrypter(Arc::new(AesGcmEncrypter::generate()))
///     .build()
///     .unwrap();
///
/// let request = RequestAdapter::new(Uri::new("https", "example.com", "/"));
/// let response = middleware
///     .process(request, |_request, ctx| {
///         ctx.set("theme", "dark", CookieOptions::new());
///         Ok::<_, Error>(ResponseAdapter::new(200))
///     })
///     .unwrap();
///
/// assert_eq!(response.header("Set-Cookie").len(), 1);
/// ```
#[derive(Debug)]
pub struct CookieCtx<'q> {
    request_id: Option<String>,
    queue: &'q mut CookieQueue,
}

impl<'q> CookieCtx<'q> {
    /// Binds a queue for one handler call.
    ///
    /// This is `pub(crate)` - only the middleware opens a scope.
    pub(crate) fn new(request_id: Option<String>, queue: &'q mut CookieQueue) -> Self {
        Self { request_id, queue }
    }

    /// Returns the request ID, if the request carried one.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Returns the request's cookie queue.
    pub fn queue(&self) -> &CookieQueue {
        &*self.queue
    }

    /// Returns the request's cookie queue for direct scheduling.
    pub fn queue_mut(&mut self) -> &mut CookieQueue {
        &mut *self.queue
    }

    /// Schedules a cookie; see [`CookieQueue::set`].
    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        options: CookieOptions,
    ) {
        self.queue.set(name, value, options);
    }

    /// Schedules a deletion; see [`CookieQueue::delete`].
    pub fn delete(&mut self, name: impl Into<String>) {
        self.queue.delete(name);
    }

    /// Schedules a prebuilt cookie; see [`CookieQueue::schedule`].
    pub fn schedule(&mut self, cookie: Cookie) {
        self.queue.schedule(cookie);
    }

    /// Returns a logger tagged with this request's ID.
    pub fn log(&self) -> CookieLog<'_> {
        CookieLog::new(self.request_id())
    }
}
