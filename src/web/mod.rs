//! Web framework integration surface.
//!
//! This module is the boundary between HTTP frameworks and cookie
//! protection. It provides:
//! - The [`CookieRequest`] / [`CookieResponse`] traits a framework implements
//! - Owned [`RequestAdapter`] / [`ResponseAdapter`] types for frameworks
//!   without their own request model, and for tests
//! - The [`CookieMiddleware`] itself
//!
//! # Design Principles
//!
//! 1. **No Framework Dependencies**: nothing here names a framework type.
//!
//! 2. **Fail to Absent**: an inbound cookie that does not verify reads as
//!    [`CookieValue::Absent`](crate::CookieValue::Absent). Requests never fail
//!    because of a bad cookie.
//!
//! 3. **Explicit Context**: the cookie queue reaches the handler as a
//!    [`CookieCtx`](crate::CookieCtx) argument. No global state.
//!
//! # Example Flow
//!
//! ```ignore
//! // In a framework-specific integration (e.g., axum, actix):
//!
//! // 1. Convert the framework request
//! let request = RequestAdapter::new(Uri::new(scheme, host, path))
//!     .with_cookie_header(cookie_header);
//!
//! // 2. Run the application handler through the middleware
//! let response = middleware.process(request, |request, ctx| {
//!     let user = request.cookie("remember_me");
//!     ctx.set("last_visit", now, CookieOptions::new());
//!     Ok(ResponseAdapter::new(200))
//! })?;
//!
//! // 3. Copy response.header("Set-Cookie") onto the framework response
//! ```

mod adapter;
pub mod example_handler;
mod extract;
mod middleware;

pub use adapter::{parse_cookie_header, RequestAdapter, ResponseAdapter, Uri};
pub use extract::{CookieRequest, CookieResponse};
pub use middleware::{CookieMiddleware, CookieMiddlewareBuilder, SET_COOKIE};
