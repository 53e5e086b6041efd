use std::fmt;

use zeroize::Zeroize;

/// A wrapper that keeps key material out of logs and wipes it on drop.
///
/// Encryption and signing keys used for cookie protection are held in a
/// `Secret<T>`. The wrapped value can only be reached through the explicit
/// [`expose_secret`](Self::expose_secret) method.
///
/// # Security Properties
///
/// - Does NOT implement `Deref`, `AsRef`, `Borrow` or `Copy`
/// - Debug and Display output is always `[REDACTED]`
/// - The inner value is zeroized when the `Secret` is dropped
///
/// # Examples
///
/// ```
/// use cookie_policy::Secret;
///
/// let key = Secret::new(vec![0x42u8; 32]);
///
/// assert_eq!(format!("{:?}", key), "[REDACTED]");
/// assert_eq!(key.expose_secret().len(), 32);
/// ```
// Do NOT derive Clone: duplicated key buffers outlive the zeroize-on-drop guarantee.
pub struct Secret<T: Zeroize> {
    inner: T,
}

impl<T: Zeroize> Secret<T> {
    /// Wraps key material in a `Secret`.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Explicitly exposes the secret value.
    ///
    /// The verbose name marks every place key bytes are read. Never log or
    /// format the returned reference.
    pub fn expose_secret(&self) -> &T {
        &self.inner
    }
}

impl<T: Zeroize> Drop for Secret<T> {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

impl<T: Zeroize> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T: Zeroize> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}
