//! VAPID key pairs, sender identity and browser subscriptions.
//!
//! Key material travels as base64url strings: the public key is the
//! uncompressed SEC1 point (65 bytes), the private key the raw P-256 scalar
//! (32 bytes). [`VapidIdentity`] can only be built from a complete and
//! self-consistent key pair, so signing never has to re-check it.

// Rust guideline compliant 2026-02

use p256::ecdsa::SigningKey;
use p256::elliptic_curve::rand_core::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::constants::{
    AUTH_SECRET_LEN, PRIVATE_KEY_LEN, PUBLIC_KEY_LEN, UNCOMPRESSED_POINT_TAG,
};
use crate::{base64url, Result, WebPushError};

/// Decode scratch; comfortably above the estimate for any key we accept.
const DECODE_SCRATCH_LEN: usize = 128;

/// Decode a base64url key field into an array of exactly `N` bytes.
///
/// The scratch copy is wiped on return, so this is safe for secrets.
pub(crate) fn decode_key<const N: usize>(
    field: &'static str,
    encoded: &str,
) -> Result<Zeroizing<[u8; N]>> {
    let encoded = encoded.trim();
    let mut scratch = Zeroizing::new([0u8; DECODE_SCRATCH_LEN]);
    let written = match base64url::decode(encoded, scratch.as_mut_slice()) {
        Ok(n) => n,
        // Longer than anything valid; report it as a length problem
        Err(WebPushError::OutputTooSmall) => {
            return Err(WebPushError::InvalidKeyLength {
                field,
                expected: N,
                actual: encoded.trim_end_matches('=').len() * 3 / 4,
            })
        }
        Err(e) => return Err(e),
    };

    if written != N {
        return Err(WebPushError::InvalidKeyLength {
            field,
            expected: N,
            actual: written,
        });
    }

    let mut out = Zeroizing::new([0u8; N]);
    out.copy_from_slice(&scratch[..N]);
    Ok(out)
}

/// P-256 key pair used to sign VAPID tokens.
pub struct VapidKeys {
    signing_key: SigningKey,
    public_key: [u8; PUBLIC_KEY_LEN],
}

impl VapidKeys {
    /// Generate a fresh key pair from the OS random source.
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::random(&mut OsRng))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        // SEC1 uncompressed public key (65 bytes: 0x04 || x || y)
        let point = signing_key.verifying_key().to_encoded_point(false);
        let mut public_key = [0u8; PUBLIC_KEY_LEN];
        public_key.copy_from_slice(point.as_bytes());
        Self {
            signing_key,
            public_key,
        }
    }

    /// Reconstruct from base64url-encoded strings.
    ///
    /// Validates the public point format, the private scalar, and that the
    /// public key is the one derived from the scalar.
    pub fn from_base64url(public_key_b64: &str, private_key_b64: &str) -> Result<Self> {
        let public = decode_key::<PUBLIC_KEY_LEN>("VAPID public key", public_key_b64)?;
        if public[0] != UNCOMPRESSED_POINT_TAG {
            return Err(WebPushError::InvalidPoint("VAPID public key"));
        }

        let private = decode_key::<PRIVATE_KEY_LEN>("VAPID private key", private_key_b64)?;
        let signing_key = SigningKey::from_slice(private.as_slice())
            .map_err(|_| WebPushError::InvalidPrivateKey)?;

        let keys = Self::from_signing_key(signing_key);
        if keys.public_key != *public {
            return Err(WebPushError::KeyMismatch);
        }
        Ok(keys)
    }

    /// Uncompressed public key bytes.
    pub fn public_key_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.public_key
    }

    /// Base64url-encoded uncompressed public key.
    ///
    /// This is what browsers pass as `applicationServerKey` when subscribing.
    pub fn public_key_base64url(&self) -> String {
        base64url::encode_string(&self.public_key)
    }

    /// Base64url-encoded raw private scalar.
    pub fn private_key_base64url(&self) -> Zeroizing<String> {
        Zeroizing::new(base64url::encode_string(&self.signing_key.to_bytes()))
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl std::fmt::Debug for VapidKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VapidKeys")
            .field("public_key", &self.public_key_base64url())
            .finish_non_exhaustive()
    }
}

/// Application server identity: contact subject plus VAPID key pair.
///
/// Always complete and consistent; there is no way to construct one with a
/// missing field.
#[derive(Debug)]
pub struct VapidIdentity {
    subject: String,
    public_key: String,
    keys: VapidKeys,
}

impl VapidIdentity {
    /// Build an identity from a subject URI and base64url key strings.
    pub fn new(subject: &str, public_key_b64: &str, private_key_b64: &str) -> Result<Self> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(WebPushError::InvalidIdentity("subject is empty"));
        }
        if public_key_b64.trim().is_empty() {
            return Err(WebPushError::InvalidIdentity("public key is empty"));
        }
        if private_key_b64.trim().is_empty() {
            return Err(WebPushError::InvalidIdentity("private key is empty"));
        }

        let keys = VapidKeys::from_base64url(public_key_b64, private_key_b64)?;
        Ok(Self {
            subject: subject.to_string(),
            public_key: public_key_b64.trim().to_string(),
            keys,
        })
    }

    /// Build an identity around an existing key pair.
    pub fn from_keys(subject: &str, keys: VapidKeys) -> Result<Self> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(WebPushError::InvalidIdentity("subject is empty"));
        }
        Ok(Self {
            subject: subject.to_string(),
            public_key: keys.public_key_base64url(),
            keys,
        })
    }

    /// Contact URI (`mailto:` or `https:`) placed in the token `sub` claim.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Base64url public key exactly as configured.
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// The underlying key pair.
    pub fn keys(&self) -> &VapidKeys {
        &self.keys
    }
}

/// A browser's push subscription.
///
/// Contains everything needed to deliver an encrypted message to one browser.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    /// Push service endpoint URL.
    pub endpoint: String,
    /// Browser's P-256 ECDH public key (base64url).
    pub p256dh: String,
    /// Shared auth secret (base64url).
    pub auth: String,
}

impl PushSubscription {
    /// Create a subscription from its three string fields.
    pub fn new(endpoint: impl Into<String>, p256dh: impl Into<String>, auth: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            p256dh: p256dh.into(),
            auth: auth.into(),
        }
    }

    /// Decoded receiver public key (65-byte uncompressed point).
    pub fn receiver_public_key(&self) -> Result<[u8; PUBLIC_KEY_LEN]> {
        let key = decode_key::<PUBLIC_KEY_LEN>("subscription p256dh", &self.p256dh)?;
        Ok(*key)
    }

    /// Decoded auth secret (16 bytes), wiped on drop.
    pub fn auth_secret(&self) -> Result<Zeroizing<[u8; AUTH_SECRET_LEN]>> {
        decode_key::<AUTH_SECRET_LEN>("subscription auth", &self.auth)
    }
}
