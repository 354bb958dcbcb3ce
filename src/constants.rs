//! Wire constants for the aesgcm Web Push encoding and VAPID.
//!
//! Every value here is part of the interoperability contract with push
//! services. Grouped by the component that consumes them.
//!
//! # Categories
//!
//! - **Key material**: sizes of decoded subscription and VAPID keys
//! - **Derivation**: HKDF info strings and output lengths
//! - **Token**: JWT header values and lifetime
//! - **Delivery**: HTTP header defaults

use std::time::Duration;

// ============================================================================
// Key material
// ============================================================================

/// Uncompressed SEC1 P-256 point length (`0x04 || X || Y`).
pub const PUBLIC_KEY_LEN: usize = 65;

/// Raw P-256 private scalar length.
pub const PRIVATE_KEY_LEN: usize = 32;

/// Subscription auth secret length.
pub const AUTH_SECRET_LEN: usize = 16;

/// Random per-message salt length.
pub const SALT_LEN: usize = 16;

/// Tag byte that prefixes an uncompressed point.
pub const UNCOMPRESSED_POINT_TAG: u8 = 0x04;

// ============================================================================
// Derivation
// ============================================================================

/// Info string for the pseudorandom key derivation (trailing NUL included).
pub const AUTH_INFO: &[u8] = b"Content-Encoding: auth\0";

/// Prefix of every per-message info block.
pub const INFO_PREFIX: &[u8] = b"Content-Encoding: ";

/// Curve marker between the label and the key lengths of an info block.
pub const INFO_CURVE: &[u8] = b"\0P-256\0";

/// Label for the content-encryption key info block.
pub const CEK_LABEL: &[u8] = b"aesgcm";

/// Label for the nonce info block.
pub const NONCE_LABEL: &[u8] = b"nonce";

/// Pseudorandom key length.
pub const PRK_LEN: usize = 32;

/// AES-128 content-encryption key length.
pub const CEK_LEN: usize = 16;

/// AES-GCM nonce length.
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length.
pub const TAG_LEN: usize = 16;

/// Length of the big-endian padding-length field prepended to the plaintext.
pub const PADDING_HEADER_LEN: usize = 2;

// ============================================================================
// Token
// ============================================================================

/// JWT `typ` header value.
pub const JWT_TYPE: &str = "JWT";

/// JWT `alg` header value (ECDSA P-256 with SHA-256).
pub const JWT_ALGORITHM: &str = "ES256";

/// Validity window of a VAPID token, in seconds.
///
/// Must stay under 24 hours; push services reject longer-lived tokens.
pub const JWT_LIFETIME_SECS: i64 = 12 * 60 * 60;

/// Raw `r || s` ES256 signature length.
pub const SIGNATURE_LEN: usize = 64;

// ============================================================================
// Delivery
// ============================================================================

/// `Content-Encoding` header value.
pub const CONTENT_ENCODING: &str = "aesgcm";

/// `Content-Type` header value for the encrypted body.
pub const CONTENT_TYPE: &str = "application/octet-stream";

/// Default `TTL` header value when the notification sets none (28 days).
pub const DEFAULT_TTL: Duration = Duration::from_secs(2_419_200);

/// Value of the `web_push` field in a declarative notification (RFC 8030).
pub const DECLARATIVE_WEB_PUSH: u16 = 8030;

/// HTTP request timeout for push service calls.
pub const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
