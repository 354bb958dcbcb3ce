//! vapid-push - Web Push payload encryption and VAPID signing.
//!
//! Implements the cryptographic core of Web Push: the "aesgcm" content
//! encoding (ECDH + HKDF-SHA256 + AES-128-GCM) and ES256 VAPID tokens,
//! plus the request assembly and delivery around them.
//!
//! # Architecture
//!
//! ```text
//! PushSubscription ─┐
//! PushNotification ─┼─► PushRequest ──► VapidClient ──► push service
//! VapidIdentity ────┘     │
//!                         ├─ jwt::sign         (Authorization)
//!                         └─ encryption::encrypt (body, Encryption, Crypto-Key)
//! ```
//!
//! # Modules
//!
//! - [`pool`] - Pooled, move-only output buffers
//! - [`builder`] - Bounds-checked byte writer
//! - [`base64url`] - Unpadded URL-safe base64
//! - [`encryption`] - Key derivation and payload sealing
//! - [`jwt`] - VAPID token signing
//! - [`request`] / [`client`] - Header assembly and delivery
//! - [`config`] - Identity loading

pub mod base64url;
pub mod builder;
pub mod client;
pub mod config;
pub mod constants;
pub mod encryption;
pub mod error;
pub mod jwt;
pub mod keys;
pub mod notification;
pub mod pool;
pub mod request;

// Re-export commonly used types
pub use client::VapidClient;
pub use config::VapidConfig;
pub use encryption::{encrypt, EncryptionResult};
pub use error::{Result, WebPushError};
pub use jwt::sign;
pub use keys::{PushSubscription, VapidIdentity, VapidKeys};
pub use notification::{Direction, PushNotification, Urgency};
pub use pool::{BufferPool, PoolConfig, PooledBuffer};
pub use request::PushRequest;
