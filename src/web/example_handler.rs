//! Example handlers demonstrating the cookie middleware from the handler side.
//!
//! Each function returns a handler closure with the shape
//! [`CookieMiddleware::process`](super::CookieMiddleware::process) expects:
//! it reads decoded cookies from the request and schedules cookies through
//! the [`CookieCtx`]. They double as fixtures for the integration tests.

use crate::context::CookieCtx;
use crate::error::Error;
use crate::queue::CookieOptions;

use super::{RequestAdapter, ResponseAdapter};

/// Handler result type used by the examples.
pub type HandlerResult = Result<ResponseAdapter, Error>;

/// Returns a handler that writes the decoded value of `name` as the body.
///
/// A missing or rejected cookie produces an empty body.
///
/// # Examples
///
/// ```
/// use cookie_policy::web::example_handler::echo_cookie;
/// use cookie_policy::web::{CookieMiddleware, RequestAdapter, Uri};
/// use cookie_policy::{CookiePolicy, Protection};
///
/// let policy = CookiePolicy::builder().protection(Protection::Unprotected).build().unwrap();
/// let middleware = CookieMiddleware::builder(policy).build().unwrap();
///
/// let request = RequestAdapter::new(Uri::new("http", "example.com", "/"))
///     .with_cookie_header("theme=dark");
/// let response = middleware.process(request, echo_cookie("theme")).unwrap();
/// assert_eq!(response.body(), "dark");
/// ```
pub fn echo_cookie(
    name: &str,
) -> impl FnOnce(RequestAdapter, &mut CookieCtx<'_>) -> HandlerResult + '_ {
    move |request, _ctx| {
        let body = request
            .cookie(name)
            .and_then(|value| value.as_str())
            .unwrap_or_default()
            .to_string();
        Ok(ResponseAdapter::new(200).with_body(body))
    }
}

/// Returns a handler that schedules `name=value` with default options.
pub fn set_cookie<'a>(
    name: &'a str,
    value: &'a str,
) -> impl FnOnce(RequestAdapter, &mut CookieCtx<'_>) -> HandlerResult + 'a {
    move |_request, ctx| {
        ctx.set(name, value, CookieOptions::new());
        Ok(ResponseAdapter::new(200))
    }
}

/// Returns a handler that sets `name=value` and then deletes it.
///
/// Both entries reach the response; the client keeps the deletion.
pub fn set_then_delete<'a>(
    name: &'a str,
    value: &'a str,
) -> impl FnOnce(RequestAdapter, &mut CookieCtx<'_>) -> HandlerResult + 'a {
    move |_request, ctx| {
        ctx.set(name, value, CookieOptions::new());
        ctx.delete(name);
        Ok(ResponseAdapter::new(200))
    }
}

/// Logs the visitor out: deletes every cookie the request carried.
pub fn handle_logout(request: RequestAdapter, ctx: &mut CookieCtx<'_>) -> HandlerResult {
    let mut cleared = 0;
    for (name, _) in request.cookies() {
        ctx.delete(name);
        cleared += 1;
    }
    ctx.log().info(format_args!("cleared {cleared} cookies"));
    Ok(ResponseAdapter::new(204))
}
