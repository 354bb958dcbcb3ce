//! aesgcm payload encryption for Web Push.
//!
//! Implements the "aesgcm" content encoding: an ephemeral P-256 ECDH
//! exchange with the subscription key, a two-stage HKDF-SHA256 chain, and
//! AES-128-GCM sealing of the padded payload.
//!
//! # Derivation
//!
//! ```text
//! shared = ECDH(ephemeral_private, receiver_public)
//! prk    = HKDF(salt = auth_secret, ikm = shared, "Content-Encoding: auth\0", 32)
//! cek    = HKDF(salt = salt, ikm = prk, info("aesgcm"), 16)
//! nonce  = HKDF(salt = salt, ikm = prk, info("nonce"), 12)
//!
//! info(label) = "Content-Encoding: " || label || "\0P-256\0"
//!               || u16be(65) || receiver_public || u16be(65) || server_public
//! ```
//!
//! The sealed body is `AES-128-GCM(cek, nonce, u16be(0) || plaintext) || tag`.
//! Intermediate keys live in stack arrays that are wiped on scope exit.

// Rust guideline compliant 2026-02

use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes128Gcm, Nonce};
use hkdf::Hkdf;
use p256::ecdh::EphemeralSecret;
use p256::elliptic_curve::rand_core::OsRng;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::PublicKey;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::builder::ByteBuilder;
use crate::constants::{
    AUTH_INFO, CEK_LABEL, CEK_LEN, INFO_CURVE, INFO_PREFIX, NONCE_LABEL, NONCE_LEN,
    PADDING_HEADER_LEN, PRK_LEN, PUBLIC_KEY_LEN, SALT_LEN, TAG_LEN,
};
use crate::keys::PushSubscription;
use crate::pool::{BufferPool, PooledBuffer};
use crate::{Result, WebPushError};

/// Largest info block: the longer label with two uncompressed points.
pub const INFO_BLOCK_MAX: usize = INFO_PREFIX.len()
    + CEK_LABEL.len()
    + INFO_CURVE.len()
    + 2
    + PUBLIC_KEY_LEN
    + 2
    + PUBLIC_KEY_LEN;

/// Which key an info block derives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoLabel {
    /// AES-128 content-encryption key (`"aesgcm"`).
    ContentEncryptionKey,
    /// GCM nonce (`"nonce"`).
    Nonce,
}

impl InfoLabel {
    /// Label bytes placed after the `Content-Encoding: ` prefix.
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            InfoLabel::ContentEncryptionKey => CEK_LABEL,
            InfoLabel::Nonce => NONCE_LABEL,
        }
    }
}

/// Stack-allocated HKDF info block for CEK and nonce derivation.
#[derive(Debug, Clone)]
pub struct InfoBlock {
    bytes: [u8; INFO_BLOCK_MAX],
    len: usize,
}

impl InfoBlock {
    /// Build the block for `label` over the two public keys.
    pub fn new(
        label: InfoLabel,
        receiver_public_key: &[u8; PUBLIC_KEY_LEN],
        server_public_key: &[u8; PUBLIC_KEY_LEN],
    ) -> Result<Self> {
        let mut bytes = [0u8; INFO_BLOCK_MAX];
        let len = {
            let mut builder = ByteBuilder::new(&mut bytes);
            builder
                .append(INFO_PREFIX)?
                .append(label.as_bytes())?
                .append(INFO_CURVE)?
                .append_int(PUBLIC_KEY_LEN as u16)?
                .append(receiver_public_key)?
                .append_int(PUBLIC_KEY_LEN as u16)?
                .append(server_public_key)?;
            builder.len()
        };
        Ok(Self { bytes, len })
    }

    /// The encoded block.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Output of [`encrypt`]: everything the request layer needs.
///
/// Each field is a pooled buffer owned by the caller; dropping the result
/// (or calling [`EncryptionResult::release`]) returns all three.
#[derive(Debug)]
pub struct EncryptionResult {
    /// Random per-message salt (16 bytes).
    pub salt: PooledBuffer,
    /// `ciphertext || tag`.
    pub payload: PooledBuffer,
    /// Ephemeral server public key, uncompressed (65 bytes).
    pub public_key: PooledBuffer,
}

impl EncryptionResult {
    /// Return all buffers to the pool.
    pub fn release(self) {
        let Self {
            salt,
            payload,
            public_key,
        } = self;
        salt.release();
        payload.release();
        public_key.release();
    }
}

/// Encrypt `plaintext` for `subscription` using the process-wide pool.
pub fn encrypt(subscription: &PushSubscription, plaintext: &[u8]) -> Result<EncryptionResult> {
    encrypt_in(BufferPool::shared(), subscription, plaintext)
}

/// Encrypt `plaintext` for `subscription`, drawing output buffers from `pool`.
///
/// Fails without leaving buffers outstanding if the subscription keys are
/// malformed or any primitive fails.
pub fn encrypt_in(
    pool: &BufferPool,
    subscription: &PushSubscription,
    plaintext: &[u8],
) -> Result<EncryptionResult> {
    let receiver_public_key = subscription.receiver_public_key()?;
    let auth_secret = subscription.auth_secret()?;
    let receiver = PublicKey::from_sec1_bytes(&receiver_public_key)
        .map_err(|_| WebPushError::InvalidPoint("subscription p256dh"))?;

    let mut salt = pool.acquire(SALT_LEN);
    rand::rng().fill_bytes(&mut salt);

    let ephemeral = EphemeralSecret::random(&mut OsRng);
    let mut server_public_key = [0u8; PUBLIC_KEY_LEN];
    server_public_key.copy_from_slice(ephemeral.public_key().to_encoded_point(false).as_bytes());

    let shared = ephemeral.diffie_hellman(&receiver);

    let mut prk = Zeroizing::new([0u8; PRK_LEN]);
    hkdf_expand(
        auth_secret.as_slice(),
        shared.raw_secret_bytes().as_slice(),
        AUTH_INFO,
        prk.as_mut_slice(),
    )?;
    drop(shared);

    let mut cek = Zeroizing::new([0u8; CEK_LEN]);
    let cek_info = InfoBlock::new(
        InfoLabel::ContentEncryptionKey,
        &receiver_public_key,
        &server_public_key,
    )?;
    hkdf_expand(&salt, prk.as_slice(), cek_info.as_bytes(), cek.as_mut_slice())?;

    let mut nonce = Zeroizing::new([0u8; NONCE_LEN]);
    let nonce_info = InfoBlock::new(InfoLabel::Nonce, &receiver_public_key, &server_public_key)?;
    hkdf_expand(&salt, prk.as_slice(), nonce_info.as_bytes(), nonce.as_mut_slice())?;

    let payload = seal(pool, plaintext, &cek, &nonce)?;

    let mut public_key = pool.acquire(PUBLIC_KEY_LEN);
    public_key.copy_from_slice(&server_public_key);

    log::debug!(
        "Encrypted {} byte push payload into {} byte aesgcm body",
        plaintext.len(),
        payload.len()
    );

    Ok(EncryptionResult {
        salt,
        payload,
        public_key,
    })
}

/// Pad and seal into a pooled buffer laid out as `u16be(0) || plaintext || tag`.
fn seal(
    pool: &BufferPool,
    plaintext: &[u8],
    cek: &[u8; CEK_LEN],
    nonce: &[u8; NONCE_LEN],
) -> Result<PooledBuffer> {
    let padded_len = PADDING_HEADER_LEN + plaintext.len();
    let mut payload = pool.acquire(padded_len + TAG_LEN);

    // No padding bytes, so the padding-length field is zero
    ByteBuilder::new(&mut payload[..padded_len])
        .append_int(0u16)?
        .append(plaintext)?;

    let cipher = Aes128Gcm::new_from_slice(cek)
        .map_err(|e| WebPushError::Crypto(format!("AES-128-GCM key: {e}")))?;
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(nonce), b"", &mut payload[..padded_len])
        .map_err(|e| WebPushError::Crypto(format!("AES-128-GCM seal: {e}")))?;
    payload[padded_len..].copy_from_slice(&tag);

    Ok(payload)
}

fn hkdf_expand(salt: &[u8], ikm: &[u8], info: &[u8], okm: &mut [u8]) -> Result<()> {
    Hkdf::<Sha256>::new(Some(salt), ikm)
        .expand(info, okm)
        .map_err(|e| WebPushError::Crypto(format!("HKDF expand: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base64url;
    use crate::keys::VapidKeys;

    fn subscription() -> PushSubscription {
        let receiver = VapidKeys::generate();
        PushSubscription::new(
            "https://push.example.com/abc",
            receiver.public_key_base64url(),
            base64url::encode_string(&[7u8; 16]),
        )
    }

    #[test]
    fn test_info_block_layout() {
        let receiver = [0x11u8; PUBLIC_KEY_LEN];
        let server = [0x22u8; PUBLIC_KEY_LEN];
        let block = InfoBlock::new(InfoLabel::ContentEncryptionKey, &receiver, &server).unwrap();

        let mut expected = b"Content-Encoding: aesgcm\0P-256\0".to_vec();
        expected.extend_from_slice(&[0x00, 0x41]);
        expected.extend_from_slice(&receiver);
        expected.extend_from_slice(&[0x00, 0x41]);
        expected.extend_from_slice(&server);

        assert_eq!(block.as_bytes(), &expected[..]);
        assert_eq!(block.as_bytes().len(), INFO_BLOCK_MAX);
    }

    #[test]
    fn test_nonce_info_block_is_shorter() {
        let receiver = [0x11u8; PUBLIC_KEY_LEN];
        let server = [0x22u8; PUBLIC_KEY_LEN];
        let block = InfoBlock::new(InfoLabel::Nonce, &receiver, &server).unwrap();
        assert!(block.as_bytes().starts_with(b"Content-Encoding: nonce\0P-256\0\x00\x41"));
        assert_eq!(block.as_bytes().len(), INFO_BLOCK_MAX - 1);
    }

    #[test]
    fn test_encrypt_output_shapes() {
        let pool = BufferPool::default();
        let result = encrypt_in(&pool, &subscription(), b"hello").unwrap();

        assert_eq!(result.salt.len(), SALT_LEN);
        assert_eq!(result.public_key.len(), PUBLIC_KEY_LEN);
        assert_eq!(result.public_key[0], 0x04);
        assert_eq!(result.payload.len(), PADDING_HEADER_LEN + 5 + TAG_LEN);
        assert_eq!(pool.outstanding(), 3);

        result.release();
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn test_empty_plaintext() {
        let pool = BufferPool::default();
        let result = encrypt_in(&pool, &subscription(), b"").unwrap();
        assert_eq!(result.payload.len(), PADDING_HEADER_LEN + TAG_LEN);
    }

    #[test]
    fn test_short_receiver_key_leaves_nothing_outstanding() {
        let pool = BufferPool::default();
        let mut sub = subscription();
        sub.p256dh = base64url::encode_string(&[4u8; 64]);

        let err = encrypt_in(&pool, &sub, b"hello").unwrap_err();
        assert!(matches!(err, WebPushError::InvalidKeyLength { expected: 65, .. }));
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn test_point_off_curve_is_rejected() {
        let pool = BufferPool::default();
        let mut sub = subscription();
        let mut bogus = [0u8; PUBLIC_KEY_LEN];
        bogus[0] = 0x04;
        bogus[1] = 1;
        sub.p256dh = base64url::encode_string(&bogus);

        let err = encrypt_in(&pool, &sub, b"hello").unwrap_err();
        assert!(matches!(err, WebPushError::InvalidPoint(_)));
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn test_bad_auth_secret_is_rejected() {
        let pool = BufferPool::default();
        let mut sub = subscription();
        sub.auth = "!!!!".to_string();
        assert!(matches!(
            encrypt_in(&pool, &sub, b"x"),
            Err(WebPushError::Base64(_))
        ));
        assert_eq!(pool.outstanding(), 0);
    }
}
