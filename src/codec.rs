//! Cookie protection codecs.
//!
//! One codec per [`Protection`] method, selected once when the middleware is
//! built. Encoding may fail only on misconfiguration; decoding never fails:
//! a value that does not verify or decrypt comes back as `None` and the
//! cookie is treated as never sent.

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::crypto::Encrypter;
use crate::error::{ConfigError, ConfigErrorKind, CryptoError, CryptoErrorKind};
use crate::policy::Protection;
use crate::request::CookieValue;

type HmacSha256 = Hmac<Sha256>;

/// Length of the MAC suffix of an HMAC-signed cookie, in characters.
///
/// A full 32-byte HMAC-SHA256 tag, base64url-encoded without padding.
pub const MAC_LENGTH: usize = 43;

/// A protection strategy applied to cookie values.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use cookie_policy::{AesGcmEncrypter, Codec, Encrypter, Protection};
///
/// let encrypter: Arc<dyn Encrypter> = Arc::new(AesGcmEncrypter::generate());
/// let codec = Codec::for_protection(Protection::Hmac, Some(encrypter)).unwrap();
///
/// let signed = codec.encode("value").unwrap();
/// assert_eq!(codec.decode(&signed).as_deref(), Some("value"));
///
/// // A tampered value is silently dropped.
/// let tampered = signed.replacen("value", "valuE", 1);
/// assert_eq!(codec.decode(&tampered), None);
/// ```
#[derive(Clone)]
pub enum Codec {
    /// Identity transform in both directions
    Unprotected,
    /// `value ++ MAC` signing
    Hmac(HmacCodec),
    /// Authenticated encryption through an [`Encrypter`]
    Encrypt(EncryptCodec),
}

impl Codec {
    /// Selects the codec for a protection method.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigErrorKind::MissingEncrypter`] when `protection` needs
    /// key material and `encrypter` is `None`.
    pub fn for_protection(
        protection: Protection,
        encrypter: Option<Arc<dyn Encrypter>>,
    ) -> Result<Self, ConfigError> {
        match (protection, encrypter) {
            (Protection::Unprotected, _) => Ok(Codec::Unprotected),
            (Protection::Hmac, Some(encrypter)) => Ok(Codec::Hmac(HmacCodec::new(encrypter))),
            (Protection::Encrypt, Some(encrypter)) => {
                Ok(Codec::Encrypt(EncryptCodec::new(encrypter)))
            }
            (protection, None) => Err(ConfigError::new(
                ConfigErrorKind::MissingEncrypter,
                format!("protection method {protection} requires an encrypter"),
            )),
        }
    }

    /// Returns the protection method this codec implements.
    pub fn protection(&self) -> Protection {
        match self {
            Codec::Unprotected => Protection::Unprotected,
            Codec::Hmac(_) => Protection::Hmac,
            Codec::Encrypt(_) => Protection::Encrypt,
        }
    }

    /// Encodes a plaintext cookie value for the wire.
    ///
    /// # Errors
    ///
    /// Returns a [`CryptoError`] only when the underlying primitive is
    /// misconfigured.
    pub fn encode(&self, value: &str) -> Result<String, CryptoError> {
        match self {
            Codec::Unprotected => Ok(value.to_string()),
            Codec::Hmac(codec) => codec.encode(value),
            Codec::Encrypt(codec) => codec.encode(value),
        }
    }

    /// Decodes a wire value, returning `None` if it fails verification.
    pub fn decode(&self, value: &str) -> Option<String> {
        match self {
            Codec::Unprotected => Some(value.to_string()),
            Codec::Hmac(codec) => codec.decode(value),
            Codec::Encrypt(codec) => codec.decode(value),
        }
    }

    /// Decodes an inbound cookie parameter.
    ///
    /// Lists are decoded element by element; an element that fails becomes
    /// [`CookieValue::Absent`] without affecting its siblings.
    pub fn decode_value(&self, value: CookieValue) -> CookieValue {
        match value {
            CookieValue::Text(text) => match self.decode(&text) {
                Some(plain) => CookieValue::Text(plain),
                None => CookieValue::Absent,
            },
            CookieValue::List(items) => {
                CookieValue::List(items.into_iter().map(|v| self.decode_value(v)).collect())
            }
            CookieValue::Absent => CookieValue::Absent,
        }
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Codec({})", self.protection())
    }
}

/// HMAC-SHA256 signing codec.
///
/// Wire format: the plaintext followed by a [`MAC_LENGTH`]-character
/// base64url tag, with no delimiter. The signing key comes from
/// [`Encrypter::signing_key`].
#[derive(Clone)]
pub struct HmacCodec {
    encrypter: Arc<dyn Encrypter>,
}

impl HmacCodec {
    /// Creates a signing codec keyed by the encrypter's shared secret.
    pub fn new(encrypter: Arc<dyn Encrypter>) -> Self {
        Self { encrypter }
    }

    /// Appends the MAC to `value`.
    pub fn encode(&self, value: &str) -> Result<String, CryptoError> {
        let mut mac = self
            .mac()
            .ok_or(CryptoError::new(CryptoErrorKind::Encrypt))?;
        mac.update(value.as_bytes());
        let tag = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        let mut signed = String::with_capacity(value.len() + MAC_LENGTH);
        signed.push_str(value);
        signed.push_str(&tag);
        Ok(signed)
    }

    /// Splits the trailing MAC off `value` and verifies it in constant time.
    pub fn decode(&self, value: &str) -> Option<String> {
        let split = value.len().checked_sub(MAC_LENGTH)?;
        if !value.is_char_boundary(split) {
            return None;
        }
        let (payload, tag) = value.split_at(split);
        let tag = URL_SAFE_NO_PAD.decode(tag).ok()?;

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&tag).ok()?;

        Some(payload.to_string())
    }

    fn mac(&self) -> Option<HmacSha256> {
        <HmacSha256 as Mac>::new_from_slice(self.encrypter.signing_key().expose_secret()).ok()
    }
}

/// Authenticated-encryption codec delegating to an [`Encrypter`].
#[derive(Clone)]
pub struct EncryptCodec {
    encrypter: Arc<dyn Encrypter>,
}

impl EncryptCodec {
    /// Creates an encryption codec.
    pub fn new(encrypter: Arc<dyn Encrypter>) -> Self {
        Self { encrypter }
    }

    /// Encrypts `value`.
    pub fn encode(&self, value: &str) -> Result<String, CryptoError> {
        self.encrypter.encrypt(value.as_bytes())
    }

    /// Decrypts `value`; tampered, foreign or non-UTF-8 payloads yield `None`.
    pub fn decode(&self, value: &str) -> Option<String> {
        let plain = self.encrypter.decrypt(value).ok()?;
        String::from_utf8(plain).ok()
    }
}
