use std::fmt;

/// Errors that can occur while configuring or running the cookie middleware.
///
/// Inbound decode failures are deliberately absent from this type: a cookie
/// that fails verification or decryption is treated as never sent.
#[derive(Debug)]
pub enum Error {
    /// The middleware or its policy was misconfigured
    Config(ConfigError),
    /// A cryptographic operation failed while encoding an outgoing cookie
    Crypto(CryptoError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Cookie configuration error: {}", e),
            Error::Crypto(e) => write!(f, "Cookie protection error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(e) => Some(e),
            Error::Crypto(e) => Some(e),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<CryptoError> for Error {
    fn from(e: CryptoError) -> Self {
        Error::Crypto(e)
    }
}

/// A configuration problem detected at construction time.
///
/// These are fatal at startup and never produced while handling a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The kind of configuration problem
    pub kind: ConfigErrorKind,
    /// Human-readable message explaining the problem
    pub message: String,
}

impl ConfigError {
    /// Creates a new configuration error.
    pub fn new(kind: ConfigErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// The kind of configuration problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// The policy protects cookies but no encrypter was supplied
    MissingEncrypter,
    /// Key material has the wrong length or encoding
    InvalidKey,
    /// The domain pattern is empty or has more than one `%s` placeholder
    InvalidDomainPattern,
}

impl fmt::Display for ConfigErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigErrorKind::MissingEncrypter => write!(f, "missing encrypter"),
            ConfigErrorKind::InvalidKey => write!(f, "invalid key"),
            ConfigErrorKind::InvalidDomainPattern => write!(f, "invalid domain pattern"),
        }
    }
}

/// Error returned by an [`Encrypter`](crate::Encrypter).
///
/// Carries no message on purpose: details of why a ciphertext was rejected
/// must not leak into logs or responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CryptoError {
    kind: CryptoErrorKind,
}

impl CryptoError {
    /// Creates a new crypto error with the specified kind.
    pub fn new(kind: CryptoErrorKind) -> Self {
        Self { kind }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> CryptoErrorKind {
        self.kind
    }
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for CryptoError {}

/// Kind of crypto error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoErrorKind {
    /// Encryption failed (misconfiguration or oversized plaintext)
    Encrypt,
    /// Authenticated decryption rejected the payload
    Decrypt,
    /// The payload was not valid base64 or too short to hold a nonce and tag
    Malformed,
}

impl fmt::Display for CryptoErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoErrorKind::Encrypt => write!(f, "encryption failed"),
            CryptoErrorKind::Decrypt => write!(f, "decryption failed"),
            CryptoErrorKind::Malformed => write!(f, "malformed payload"),
        }
    }
}
