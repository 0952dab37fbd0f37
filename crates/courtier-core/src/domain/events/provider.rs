//! Email-provider webhook payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One delivery notification as posted by the provider
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderEvent {
    pub event: String,
    pub email: String,
    #[serde(rename = "message-id", default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Seconds since the Unix epoch, possibly fractional
    pub ts: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ProviderEvent {
    /// Provider event time at millisecond precision; `None` when `ts` is
    /// not finite or out of range
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        if !self.ts.is_finite() {
            return None;
        }
        // `as` saturates, and saturated values are outside chrono's range
        DateTime::<Utc>::from_timestamp_millis((self.ts * 1000.0).round() as i64)
    }

    /// First tag, which campaigns use as their identifier
    pub fn campaign_tag(&self) -> Option<&str> {
        self.tags.as_ref().and_then(|t| t.first()).map(String::as_str)
    }

    pub fn kind(&self) -> Option<ProviderEventKind> {
        ProviderEventKind::from_tag(&self.event)
    }
}

/// Recognized event types
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderEventKind {
    Delivered,
    Opened,
    Clicked,
    Bounced,
    Unsubscribed,
}

impl ProviderEventKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "delivered" => Some(Self::Delivered),
            "opened" => Some(Self::Opened),
            "click" => Some(Self::Clicked),
            "bounced" | "hard_bounced" | "soft_bounced" => Some(Self::Bounced),
            "unsubscribed" => Some(Self::Unsubscribed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProviderEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Delivered => write!(f, "delivered"),
            Self::Opened => write!(f, "opened"),
            Self::Clicked => write!(f, "click"),
            Self::Bounced => write!(f, "bounced"),
            Self::Unsubscribed => write!(f, "unsubscribed"),
        }
    }
}
