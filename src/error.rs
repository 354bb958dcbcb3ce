//! Error types for Web Push encryption, signing and delivery.
//!
//! All library operations return [`Result<T>`] which wraps [`WebPushError`].
//! Variants are split so callers can tell malformed input (drop the
//! subscription or fix the data) from primitive failures (abort the send).

use thiserror::Error;

/// Error type for all Web Push operations.
#[derive(Debug, Error)]
pub enum WebPushError {
    /// Input is not valid base64url.
    #[error("invalid base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Codec destination cannot hold the encoded or decoded output.
    #[error("output buffer too small")]
    OutputTooSmall,

    /// A byte builder append would run past its capacity.
    #[error("byte builder overflow: requested {requested} bytes, {remaining} remaining")]
    BufferOverflow {
        /// Bytes the append needed.
        requested: usize,
        /// Bytes left in the builder.
        remaining: usize,
    },

    /// Decoded key material has the wrong size.
    #[error("{field} must be {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Which key was being decoded.
        field: &'static str,
        /// Required decoded length.
        expected: usize,
        /// Actual decoded length.
        actual: usize,
    },

    /// Bytes do not encode a point on the P-256 curve.
    #[error("{0} is not a valid P-256 point")]
    InvalidPoint(&'static str),

    /// VAPID private key is not a valid P-256 scalar.
    #[error("VAPID private key is not a valid P-256 scalar")]
    InvalidPrivateKey,

    /// VAPID public key does not belong to the private key.
    #[error("VAPID public key does not match the private key")]
    KeyMismatch,

    /// Identity is incomplete.
    #[error("invalid VAPID identity: {0}")]
    InvalidIdentity(&'static str),

    /// Push endpoint is not an absolute URL with a host.
    #[error("malformed push endpoint: {0}")]
    MalformedEndpoint(String),

    /// A cryptographic primitive failed (HKDF, AES-GCM, ECDSA).
    #[error("crypto failure: {0}")]
    Crypto(String),

    /// JSON serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport error talking to the push service.
    #[error("push request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// File system I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is missing or unreadable.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for Web Push operations.
pub type Result<T> = std::result::Result<T, WebPushError>;
