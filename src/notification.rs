//! Notification data model.
//!
//! [`PushNotification`] is the plain data the caller fills in. Its JSON form
//! uses snake_case names and omits default-valued fields; urgency and TTL
//! travel as HTTP headers instead and are never serialized. The encrypted
//! body is the declarative envelope `{"web_push":8030,"notification":{..}}`.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DECLARATIVE_WEB_PUSH, DEFAULT_TTL};
use crate::Result;

/// Delivery priority hint (`Urgency` header).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Urgency {
    /// Regular messages.
    #[default]
    Normal,
    /// Only deliver when on power and wifi.
    VeryLow,
    /// Deliver on power or wifi.
    Low,
    /// Time-sensitive; deliver immediately.
    High,
}

impl Urgency {
    /// Header value for this urgency.
    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Normal => "normal",
            Urgency::VeryLow => "very-low",
            Urgency::Low => "low",
            Urgency::High => "high",
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Urgency::Normal),
            "very-low" => Ok(Urgency::VeryLow),
            "low" => Ok(Urgency::Low),
            "high" => Ok(Urgency::High),
            other => Err(format!(
                "unknown urgency '{other}' (expected very-low, low, normal or high)"
            )),
        }
    }
}

/// Text direction of the notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Let the browser decide.
    #[default]
    #[serde(rename = "auto")]
    Auto,
    /// Left to right.
    #[serde(rename = "ltr")]
    LeftToRight,
    /// Right to left.
    #[serde(rename = "rtl")]
    RightToLeft,
}

impl Direction {
    fn is_auto(&self) -> bool {
        *self == Direction::Auto
    }
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

/// A notification to display in the browser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushNotification {
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub body: String,
    /// URL opened when the notification is activated.
    pub navigate: String,
    /// BCP 47 language tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Text direction.
    #[serde(default, skip_serializing_if = "Direction::is_auto")]
    pub dir: Direction,
    /// Suppress sound and vibration.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub silent: bool,
    /// Application badge count.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub app_badge: u32,
    /// Replaces a pending message with the same topic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Delivery priority; sent as a header.
    #[serde(skip)]
    pub urgency: Urgency,
    /// How long the push service may hold the message; sent as a header.
    #[serde(skip)]
    pub ttl: Option<Duration>,
}

#[derive(Serialize)]
struct DeclarativePushNotification<'a> {
    web_push: u16,
    notification: &'a PushNotification,
}

impl PushNotification {
    /// Create a notification with the three required fields.
    pub fn new(title: impl Into<String>, body: impl Into<String>, navigate: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            navigate: navigate.into(),
            ..Self::default()
        }
    }

    /// `TTL` header value in whole seconds.
    pub fn ttl_seconds(&self) -> u64 {
        self.ttl.unwrap_or(DEFAULT_TTL).as_secs()
    }

    /// Topic, if set and non-empty.
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref().filter(|t| !t.is_empty())
    }

    /// Serialize the declarative envelope that gets encrypted.
    pub fn to_payload(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&DeclarativePushNotification {
            web_push: DECLARATIVE_WEB_PUSH,
            notification: self,
        })?)
    }
}
