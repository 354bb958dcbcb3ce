//! Push service delivery.
//!
//! [`VapidClient`] signs, encrypts and POSTs one notification per call.
//! A non-2xx answer is logged and reported as `Ok(false)`; the caller
//! decides whether to drop the subscription. There is no retry.

// Rust guideline compliant 2026-02

use crate::constants::HTTP_REQUEST_TIMEOUT;
use crate::keys::{PushSubscription, VapidIdentity};
use crate::notification::PushNotification;
use crate::request::PushRequest;
use crate::Result;

/// Sends Web Push messages on behalf of one VAPID identity.
///
/// Reuse a single client across sends for connection pooling.
#[derive(Debug)]
pub struct VapidClient {
    http: reqwest::Client,
    identity: VapidIdentity,
}

impl VapidClient {
    /// Create a client with the default request timeout.
    pub fn new(identity: VapidIdentity) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_http_client(http, identity))
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_http_client(http: reqwest::Client, identity: VapidIdentity) -> Self {
        Self { http, identity }
    }

    /// The identity tokens are signed with.
    pub fn identity(&self) -> &VapidIdentity {
        &self.identity
    }

    /// Send one notification.
    ///
    /// Returns `Ok(true)` on a 2xx response and `Ok(false)` on any other
    /// status. Malformed subscriptions and transport failures are errors.
    /// The encryption buffers stay checked out until the response arrives.
    pub async fn send(
        &self,
        subscription: &PushSubscription,
        notification: &PushNotification,
    ) -> Result<bool> {
        let prepared = PushRequest::new(subscription, notification, &self.identity)?;

        let mut request = self.http.post(prepared.endpoint.as_str());
        for (name, value) in &prepared.headers {
            request = request.header(*name, value.as_str());
        }
        request = request.body(prepared.body().to_vec());

        let response = request.send().await?;
        drop(prepared);

        let status = response.status();
        if status.is_success() {
            log::debug!("[WebPush] Delivered to {}", subscription.endpoint);
            return Ok(true);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                log::warn!("[WebPush] Failed to read push service response body: {}", e);
                String::new()
            }
        };
        log::error!(
            "[WebPush] Push service rejected message (HTTP {}): {}",
            status.as_u16(),
            body
        );
        Ok(false)
    }
}
