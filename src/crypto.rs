//! The encryption capability consumed by cookie protection.
//!
//! Implements AES-GCM encryption and HMAC key derivation for cookie values.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{ConfigError, ConfigErrorKind, CryptoError, CryptoErrorKind};
use crate::secret::Secret;

type HmacSha256 = Hmac<Sha256>;

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const SIGNING_KEY_LABEL: &[u8] = b"cookie-signing";

/// Authenticated encryption capability used to protect cookie values.
///
/// Implementations must provide confidentiality and integrity: `decrypt`
/// rejects any payload that was not produced by `encrypt` under the same key.
/// The middleware treats every `decrypt` error as "cookie absent".
///
/// Implementations are shared across concurrent requests and must be
/// `Send + Sync`.
pub trait Encrypter: Send + Sync {
    /// Encrypts `plaintext` into a cookie-safe string.
    ///
    /// # Errors
    ///
    /// Fails only on misconfiguration.
    fn encrypt(&self, plaintext: &[u8]) -> Result<String, CryptoError>;

    /// Decrypts and authenticates a payload produced by [`encrypt`](Self::encrypt).
    ///
    /// # Errors
    ///
    /// Returns an error for tampered, truncated or foreign payloads.
    fn decrypt(&self, payload: &str) -> Result<Vec<u8>, CryptoError>;

    /// Returns the shared secret used for HMAC-signed cookies.
    fn signing_key(&self) -> &Secret<Vec<u8>>;
}

/// AES-256-GCM [`Encrypter`].
///
/// Wire format: `base64url_nopad(nonce(12) || ciphertext || tag(16))`, with a
/// fresh random nonce per call. The HMAC signing key is derived from the
/// master key so the same bytes never serve two algorithms.
pub struct AesGcmEncrypter {
    cipher: Aes256Gcm,
    signing_key: Secret<Vec<u8>>,
}

impl AesGcmEncrypter {
    /// Creates an encrypter from a 32-byte master key.
    pub fn new(master_key: [u8; KEY_LEN]) -> Self {
        let master_key = Secret::new(master_key);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(master_key.expose_secret()));
        let signing_key = Secret::new(derive_signing_key(master_key.expose_secret()));
        Self {
            cipher,
            signing_key,
        }
    }

    /// Creates an encrypter with a random master key.
    ///
    /// Cookies protected with a generated key become unreadable after a
    /// restart; use [`from_base64_key`](Self::from_base64_key) in production.
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        let encrypter = Self::new(key);
        zeroize::Zeroize::zeroize(&mut key);
        encrypter
    }

    /// Creates an encrypter from a standard base64-encoded 32-byte key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigErrorKind::InvalidKey`] if the input is not base64 or
    /// does not decode to exactly 32 bytes.
    pub fn from_base64_key(encoded: &str) -> Result<Self, ConfigError> {
        let decoded = Secret::new(STANDARD.decode(encoded.trim()).map_err(|_| {
            ConfigError::new(ConfigErrorKind::InvalidKey, "key is not valid base64")
        })?);

        let key: [u8; KEY_LEN] = decoded.expose_secret().as_slice().try_into().map_err(|_| {
            ConfigError::new(
                ConfigErrorKind::InvalidKey,
                format!(
                    "expected a {KEY_LEN}-byte key, got {} bytes",
                    decoded.expose_secret().len()
                ),
            )
        })?;

        Ok(Self::new(key))
    }
}

impl Encrypter for AesGcmEncrypter {
    fn encrypt(&self, plaintext: &[u8]) -> Result<String, CryptoError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CryptoError::new(CryptoErrorKind::Encrypt))?;

        let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);

        Ok(URL_SAFE_NO_PAD.encode(&combined))
    }

    fn decrypt(&self, payload: &str) -> Result<Vec<u8>, CryptoError> {
        let combined = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| CryptoError::new(CryptoErrorKind::Malformed))?;

        if combined.len() < NONCE_LEN + TAG_LEN {
            return Err(CryptoError::new(CryptoErrorKind::Malformed));
        }

        let (nonce, ciphertext) = combined.split_at(NONCE_LEN);
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CryptoError::new(CryptoErrorKind::Decrypt))
    }

    fn signing_key(&self) -> &Secret<Vec<u8>> {
        &self.signing_key
    }
}

impl std::fmt::Debug for AesGcmEncrypter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesGcmEncrypter")
            .field("signing_key", &self.signing_key)
            .finish_non_exhaustive()
    }
}

/// Derives the HMAC signing key as `HMAC-SHA256(master, "cookie-signing")`.
fn derive_signing_key(master_key: &[u8; KEY_LEN]) -> Vec<u8> {
    // HMAC accepts keys of any length, so construction from a 32-byte slice cannot fail.
    let mut mac = match <HmacSha256 as Mac>::new_from_slice(master_key) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC accepts any key size"),
    };
    mac.update(SIGNING_KEY_LABEL);
    mac.finalize().into_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encryption_decryption_roundtrip() {
        let encrypter = AesGcmEncrypter::new([3u8; 32]);
        let payload = encrypter.encrypt(b"Hello, World!").unwrap();

        assert_eq!(encrypter.decrypt(&payload).unwrap(), b"Hello, World!");
    }

    #[test]
    fn empty_plaintext_roundtrips() {
        let encrypter = AesGcmEncrypter::generate();
        let payload = encrypter.encrypt(b"").unwrap();

        assert!(encrypter.decrypt(&payload).unwrap().is_empty());
    }

    #[test]
    fn ciphertexts_are_unique_per_call() {
        let encrypter = AesGcmEncrypter::new([3u8; 32]);
        assert_ne!(
            encrypter.encrypt(b"data").unwrap(),
            encrypter.encrypt(b"data").unwrap()
        );
    }

    #[test]
    fn rejects_invalid_payloads() {
        let encrypter = AesGcmEncrypter::new([3u8; 32]);

        let err = encrypter.decrypt("invalid_base64_%%%").unwrap_err();
        assert_eq!(err.kind(), CryptoErrorKind::Malformed);
        let err = encrypter.decrypt("short").unwrap_err();
        assert_eq!(err.kind(), CryptoErrorKind::Malformed);

        let payload = encrypter.encrypt(b"data").unwrap();
        let mut bytes = URL_SAFE_NO_PAD.decode(&payload).unwrap();
        if let Some(last) = bytes.last_mut() {
            *last ^= 0xFF;
        }
        let err = encrypter.decrypt(&URL_SAFE_NO_PAD.encode(bytes)).unwrap_err();
        assert_eq!(err.kind(), CryptoErrorKind::Decrypt);
    }

    #[test]
    fn wrong_key_cannot_decrypt() {
        let payload = AesGcmEncrypter::new([1u8; 32]).encrypt(b"data").unwrap();
        assert!(AesGcmEncrypter::new([2u8; 32]).decrypt(&payload).is_err());
    }

    #[test]
    fn from_base64_key_validates_length() {
        let ok = STANDARD.encode([9u8; 32]);
        assert!(AesGcmEncrypter::from_base64_key(&ok).is_ok());

        let short = STANDARD.encode([9u8; 16]);
        let err = AesGcmEncrypter::from_base64_key(&short).unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::InvalidKey);

        let err = AesGcmEncrypter::from_base64_key("not base64!").unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::InvalidKey);
    }

    #[test]
    fn signing_key_is_derived_not_master() {
        let encrypter = AesGcmEncrypter::new([5u8; 32]);
        let signing = encrypter.signing_key().expose_secret();

        assert_eq!(signing.len(), 32);
        assert_ne!(signing.as_slice(), &[5u8; 32]);
        assert_eq!(
            signing,
            AesGcmEncrypter::new([5u8; 32]).signing_key().expose_secret()
        );
    }

    #[test]
    fn debug_redacts_key_material() {
        let encrypter = AesGcmEncrypter::new([5u8; 32]);
        assert!(format!("{:?}", encrypter).contains("[REDACTED]"));
    }
}
