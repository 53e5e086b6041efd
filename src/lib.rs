//! Cookie protection middleware with per-request scoped cookie queues.
//!
//! This crate transparently encrypts or signs outgoing cookies and decrypts
//! or verifies incoming ones:
//! - **Policy**: which cookies are protected, how, and for which domain
//! - **Codecs**: unprotected, HMAC-signed, or encrypted values
//! - **Fail to absent**: a tampered or foreign cookie reads as never sent
//! - **Explicit context**: each request gets its own queue, lent to the
//!   handler and dropped with the response
//!
//! # Core Types
//!
//! - [`Cookie`]: immutable cookie with `Set-Cookie` serialization
//! - [`CookiePolicy`]: protection method, exempt names, domain pattern
//! - [`Codec`]: the selected protection strategy
//! - [`Encrypter`]: encryption capability ([`AesGcmEncrypter`] by default)
//! - [`CookieQueue`] / [`CookieCtx`]: per-request outgoing cookies
//! - [`web::CookieMiddleware`]: the request/response orchestration
//! - [`Secret<T>`]: key material wrapper that redacts and zeroizes
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use cookie_policy::{AesGcmEncrypter, CookieOptions, CookiePolicy, Error};
//! use cookie_policy::web::{CookieMiddleware, CookieResponse, RequestAdapter, ResponseAdapter, Uri};
//!
//! let middleware = CookieMiddleware::builder(CookiePolicy::default())
//!     .encrypter(Arc::new(AesGcmEncrypter::generate()))
//!     .build()
//!     .expect("encrypter supplied");
//!
//! let request = RequestAdapter::new(Uri::new("https", "example.com", "/"));
//! let response = middleware
//!     .process(request, |_request, ctx| {
//!         ctx.set("remember_me", "user-42", CookieOptions::new());
//!         Ok::<_, Error>(ResponseAdapter::new(200))
//!     })
//!     .unwrap();
//!
//! // The value on the wire is encrypted.
//! let header = &response.header("Set-Cookie")[0];
//! assert!(header.starts_with("remember_me="));
//! assert!(!header.contains("user-42"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod codec;
mod context;
mod cookie;
mod crypto;
mod error;
mod logging;
mod policy;
mod queue;
mod request;
mod secret;
pub mod web;

pub use codec::{Codec, EncryptCodec, HmacCodec, MAC_LENGTH};
pub use context::CookieCtx;
pub use cookie::{Cookie, SameSite};
pub use crypto::{AesGcmEncrypter, Encrypter};
pub use error::{ConfigError, ConfigErrorKind, CryptoError, CryptoErrorKind, Error};
pub use logging::CookieLog;
pub use policy::{CookiePolicy, CookiePolicyBuilder, Protection};
pub use queue::{CookieOptions, CookieQueue};
pub use request::{CookieParams, CookieValue};
pub use secret::Secret;
