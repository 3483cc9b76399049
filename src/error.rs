//! Error types for Skypost

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BridgeError>;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Credential store error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Failures of the at-rest credential encryption.
///
/// Decrypt failures are kept distinct from an empty or absent credential so
/// callers can tell "never configured" apart from "configured but unreadable"
/// (wrong salt, corrupted blob).
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Ciphertext is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Ciphertext too short: minimum {minimum} bytes required, got {actual}")]
    CiphertextTooShort { minimum: usize, actual: usize },

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: invalid ciphertext or wrong key")]
    DecryptionFailed,

    #[error("Decrypted data is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Posting failed: {0}")]
    Posting(String),
}

impl PlatformError {
    /// The upstream message carried by this error, without the taxonomy prefix.
    pub fn upstream_message(&self) -> &str {
        match self {
            PlatformError::Authentication(msg) | PlatformError::Posting(msg) => msg,
        }
    }
}
