//! VAPID token signing (RFC 8292).
//!
//! A token is a compact ES256 JWT:
//!
//! ```text
//! base64url({"typ":"JWT","alg":"ES256"})
//!   . base64url({"aud":"<scheme>://<host>","exp":<now + 12h>,"sub":"<subject>"})
//!   . base64url(r || s)
//! ```
//!
//! The whole token is written into one pooled buffer sized from the exact
//! encoded lengths; the signature covers the first two segments.

use chrono::{DateTime, Utc};
use p256::ecdsa::signature::hazmat::PrehashSigner;
use p256::ecdsa::Signature;
use serde::Serialize;
use sha2::{Digest, Sha256};
use url::Url;

use crate::builder::ByteBuilder;
use crate::constants::{JWT_ALGORITHM, JWT_LIFETIME_SECS, JWT_TYPE, SIGNATURE_LEN};
use crate::keys::VapidIdentity;
use crate::pool::BufferPool;
use crate::{base64url, Result, WebPushError};

const SEPARATOR: &str = ".";

#[derive(Serialize)]
struct JwtHeader {
    typ: &'static str,
    alg: &'static str,
}

#[derive(Serialize)]
struct JwtClaims<'a> {
    aud: &'a str,
    exp: i64,
    sub: &'a str,
}

/// Token audience for a push endpoint: `scheme://host`, no path or port.
pub fn audience(endpoint: &str) -> Result<String> {
    let url = Url::parse(endpoint)
        .map_err(|e| WebPushError::MalformedEndpoint(format!("{endpoint}: {e}")))?;
    let host = url
        .host_str()
        .ok_or_else(|| WebPushError::MalformedEndpoint(format!("{endpoint}: missing host")))?;
    Ok(format!("{}://{}", url.scheme(), host))
}

/// Sign a VAPID token for `endpoint`, expiring 12 hours from now.
pub fn sign(endpoint: &str, identity: &VapidIdentity) -> Result<String> {
    sign_at(endpoint, identity, Utc::now())
}

/// Sign a VAPID token as of `now`.
///
/// The token is pure ASCII: base64url segments joined by `.`.
pub fn sign_at(endpoint: &str, identity: &VapidIdentity, now: DateTime<Utc>) -> Result<String> {
    let audience = audience(endpoint)?;

    let header = serde_json::to_vec(&JwtHeader {
        typ: JWT_TYPE,
        alg: JWT_ALGORITHM,
    })?;
    let claims = serde_json::to_vec(&JwtClaims {
        aud: &audience,
        exp: now.timestamp() + JWT_LIFETIME_SECS,
        sub: identity.subject(),
    })?;

    let capacity = base64url::encoded_len(header.len())
        + SEPARATOR.len()
        + base64url::encoded_len(claims.len())
        + SEPARATOR.len()
        + base64url::encoded_len(SIGNATURE_LEN);

    let mut buffer = BufferPool::shared().acquire(capacity);
    let mut builder = ByteBuilder::new(&mut buffer);

    builder
        .append_base64url(&header)?
        .append_str(SEPARATOR)?
        .append_base64url(&claims)?;

    let signature = sign_input(builder.result(), identity)?;

    builder
        .append_str(SEPARATOR)?
        .append_base64url(&signature.to_bytes())?;

    log::debug!("Signed VAPID token for audience {}", audience);

    Ok(String::from_utf8_lossy(builder.result()).into_owned())
}

fn sign_input(signing_input: &[u8], identity: &VapidIdentity) -> Result<Signature> {
    let digest = Sha256::digest(signing_input);
    identity
        .keys()
        .signing_key()
        .sign_prehash(&digest)
        .map_err(|e| WebPushError::Crypto(format!("ES256 signing: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::VapidKeys;

    fn identity() -> VapidIdentity {
        VapidIdentity::from_keys("mailto:a@b.com", VapidKeys::generate()).unwrap()
    }

    #[test]
    fn test_audience_strips_path() {
        assert_eq!(
            audience("https://push.example.com/abc/def").unwrap(),
            "https://push.example.com"
        );
    }

    #[test]
    fn test_audience_drops_port() {
        assert_eq!(
            audience("https://fcm.googleapis.com:443/fcm/send/x").unwrap(),
            "https://fcm.googleapis.com"
        );
        assert_eq!(
            audience("http://localhost:8080/push").unwrap(),
            "http://localhost"
        );
    }

    #[test]
    fn test_audience_rejects_relative_url() {
        assert!(matches!(
            audience("/push/abc"),
            Err(WebPushError::MalformedEndpoint(_))
        ));
        assert!(matches!(
            audience("mailto:a@b.com"),
            Err(WebPushError::MalformedEndpoint(_))
        ));
    }

    #[test]
    fn test_token_has_three_segments() {
        let token = sign("https://push.example.com/abc", &identity()).unwrap();
        let segments: Vec<&str> = token.split('.').collect();
        assert_eq!(segments.len(), 3);
        for segment in &segments {
            assert!(!segment.is_empty());
            base64url::decode_vec(segment).unwrap();
        }
    }

    #[test]
    fn test_header_and_claims_are_compact_json() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let token = sign_at("https://push.example.com/abc/def", &identity(), now).unwrap();
        let mut segments = token.split('.');

        let header = base64url::decode_vec(segments.next().unwrap()).unwrap();
        assert_eq!(header, br#"{"typ":"JWT","alg":"ES256"}"#);

        let claims = base64url::decode_vec(segments.next().unwrap()).unwrap();
        assert_eq!(
            String::from_utf8(claims).unwrap(),
            r#"{"aud":"https://push.example.com","exp":1700043200,"sub":"mailto:a@b.com"}"#
        );

        let signature = base64url::decode_vec(segments.next().unwrap()).unwrap();
        assert_eq!(signature.len(), SIGNATURE_LEN);
    }

    #[test]
    fn test_malformed_endpoint_fails() {
        assert!(sign("not a url", &identity()).is_err());
    }
}
