use std::fmt;

/// Placeholder request id for requests that carry none.
const NO_REQUEST_ID: &str = "-";

/// A request-bound logging interface.
///
/// `CookieLog` is obtained from [`CookieCtx::log`](crate::CookieCtx::log) or
/// created by the middleware. It is lifetime-bound to the request scope, and
/// every event carries the request ID.
///
/// Cookie values and key material are never passed to this logger; events
/// name the cookie only.
#[derive(Debug, Clone, Copy)]
pub struct CookieLog<'a> {
    request_id: Option<&'a str>,
}

impl<'a> CookieLog<'a> {
    /// Creates a logger for one request.
    ///
    /// This is `pub(crate)` - only the middleware and `CookieCtx` create it.
    pub(crate) fn new(request_id: Option<&'a str>) -> Self {
        Self { request_id }
    }

    /// Returns the request ID associated with this logger, if any.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id
    }

    fn id(&self) -> &str {
        self.request_id.unwrap_or(NO_REQUEST_ID)
    }

    /// Logs an info-level message with request ID.
    ///
    /// Use with `format_args!`:
    /// ```no_run
    /// # use cookie_policy::CookieLog;
    /// # fn example(log: &CookieLog) {
    /// log.info(format_args!("remembered user for {} days", 30));
    /// # }
    /// ```
    pub fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(request_id = %self.id(), "{}", args);
    }

    /// Logs a warning-level message with request ID.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(request_id = %self.id(), "{}", args);
    }

    /// Logs an error-level message with request ID.
    pub fn error(&self, args: fmt::Arguments<'_>) {
        tracing::error!(request_id = %self.id(), "{}", args);
    }

    /// Logs a debug-level message with request ID.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(request_id = %self.id(), "{}", args);
    }

    /// Records an inbound cookie that failed verification or decryption.
    pub(crate) fn rejected(&self, cookie: &str, elements: usize) {
        tracing::debug!(
            request_id = %self.id(),
            cookie,
            elements,
            "cookie failed verification; treating as absent"
        );
    }

    /// Records an outbound cookie that could not be encoded.
    pub(crate) fn encode_failed(&self, cookie: &str, error: &dyn std::error::Error) {
        tracing::error!(request_id = %self.id(), cookie, %error, "failed to protect cookie");
    }

    /// Records how many `Set-Cookie` headers were attached to the response.
    pub(crate) fn packed(&self, scheduled: usize, existing: usize) {
        tracing::trace!(request_id = %self.id(), scheduled, existing, "packed cookies");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn logger_reports_request_id() {
        let log = CookieLog::new(Some("req-1"));
        assert_eq!(log.request_id(), Some("req-1"));
        assert_eq!(log.id(), "req-1");
    }

    #[test]
    fn missing_request_id_uses_placeholder() {
        let log = CookieLog::new(None);
        assert_eq!(log.request_id(), None);
        assert_eq!(log.id(), NO_REQUEST_ID);
    }

    #[test]
    fn logging_without_subscriber_does_not_panic() {
        let log = CookieLog::new(Some("req-2"));
        log.info(format_args!("hello {}", 1));
        log.warn(format_args!("warn"));
        log.error(format_args!("error"));
        log.debug(format_args!("debug"));
        log.rejected("name", 1);
        log.packed(2, 0);
    }

    #[test]
    fn events_carry_request_id_and_cookie_name_only() {
        let output = capture(|| {
            let log = CookieLog::new(Some("req-42"));
            log.rejected("remember_me", 2);
            log.packed(3, 1);
        });

        assert!(output.contains("request_id=req-42"));
        assert!(
            output.contains("cookie=\"remember_me\"") || output.contains("cookie=remember_me")
        );
        assert!(output.contains("treating as absent"));
        assert!(output.contains("scheduled=3"));
    }

    #[test]
    fn events_without_request_id_use_placeholder() {
        let output = capture(|| CookieLog::new(None).warn(format_args!("no id")));
        assert!(output.contains("request_id=-"));
        assert!(output.contains("no id"));
    }
}
