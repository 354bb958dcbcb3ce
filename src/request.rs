//! Push request assembly.
//!
//! Turns a subscription, notification and identity into the exact header
//! set and body a push service expects for the aesgcm encoding. Nothing here
//! touches the network; see [`crate::client`] for delivery.

// Rust guideline compliant 2026-02

use crate::builder::ByteBuilder;
use crate::constants::{CONTENT_ENCODING, CONTENT_TYPE};
use crate::encryption::{self, EncryptionResult};
use crate::keys::{PushSubscription, VapidIdentity};
use crate::notification::PushNotification;
use crate::{base64url, jwt, Result};

const AUTHORIZATION_SCHEME: &str = "WebPush ";
const SALT_PREFIX: &str = "salt=";
const DH_PREFIX: &str = "dh=";
const P256ECDSA_PREFIX: &str = ";p256ecdsa=";

/// Write into an exactly-sized buffer and return it as a string.
fn build_header(
    capacity: usize,
    fill: impl FnOnce(&mut ByteBuilder<'_>) -> Result<()>,
) -> Result<String> {
    let mut buf = vec![0u8; capacity];
    let len = {
        let mut builder = ByteBuilder::new(&mut buf);
        fill(&mut builder)?;
        builder.len()
    };
    Ok(String::from_utf8_lossy(&buf[..len]).into_owned())
}

/// `Authorization` header value: `WebPush <token>`.
pub fn authorization_header(token: &str) -> Result<String> {
    build_header(AUTHORIZATION_SCHEME.len() + token.len(), |b| {
        b.append_str(AUTHORIZATION_SCHEME)?.append_str(token)?;
        Ok(())
    })
}

/// `Encryption` header value: `salt=<base64url(salt)>`.
pub fn encryption_header(salt: &[u8]) -> Result<String> {
    build_header(SALT_PREFIX.len() + base64url::encoded_len(salt.len()), |b| {
        b.append_str(SALT_PREFIX)?.append_base64url(salt)?;
        Ok(())
    })
}

/// `Crypto-Key` header value: `dh=<base64url(key)>;p256ecdsa=<vapid public key>`.
pub fn crypto_key_header(ephemeral_public_key: &[u8], identity: &VapidIdentity) -> Result<String> {
    let capacity = DH_PREFIX.len()
        + base64url::encoded_len(ephemeral_public_key.len())
        + P256ECDSA_PREFIX.len()
        + identity.public_key().len();
    build_header(capacity, |b| {
        b.append_str(DH_PREFIX)?
            .append_base64url(ephemeral_public_key)?
            .append_str(P256ECDSA_PREFIX)?
            .append_str(identity.public_key())?;
        Ok(())
    })
}

/// A fully prepared push message.
///
/// Owns the encryption buffers; drop it once the request has been sent.
#[derive(Debug)]
pub struct PushRequest {
    /// Push service URL to POST to.
    pub endpoint: String,
    /// Header name/value pairs in send order.
    pub headers: Vec<(&'static str, String)>,
    encryption: EncryptionResult,
}

impl PushRequest {
    /// Sign, serialize and encrypt a notification for one subscription.
    pub fn new(
        subscription: &PushSubscription,
        notification: &PushNotification,
        identity: &VapidIdentity,
    ) -> Result<Self> {
        let token = jwt::sign(&subscription.endpoint, identity)?;
        let payload = notification.to_payload()?;
        let encryption = encryption::encrypt(subscription, &payload)?;

        let mut headers = vec![
            ("Authorization", authorization_header(&token)?),
            ("Content-Encoding", CONTENT_ENCODING.to_string()),
            ("Content-Type", CONTENT_TYPE.to_string()),
            ("Encryption", encryption_header(&encryption.salt)?),
            (
                "Crypto-Key",
                crypto_key_header(&encryption.public_key, identity)?,
            ),
            ("TTL", notification.ttl_seconds().to_string()),
            ("Urgency", notification.urgency.as_str().to_string()),
        ];
        if let Some(topic) = notification.topic() {
            headers.push(("Topic", topic.to_string()));
        }

        Ok(Self {
            endpoint: subscription.endpoint.clone(),
            headers,
            encryption,
        })
    }

    /// Encrypted body (`ciphertext || tag`).
    pub fn body(&self) -> &[u8] {
        &self.encryption.payload
    }

    /// First header value with `name`, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
