use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// A stored advertisement. The identifier is serialized twice (`_id` and
/// `ad_id`) because older mobile clients read one or the other.
#[derive(Serialize, Clone, Debug)]
pub struct Ad {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub ad_id: Uuid,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub link_url: String,
    pub location: Option<Value>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub impressions: i64,
    pub clicks: i64,
}

/// Creation payload. All fields are optional at the serde level so that
/// presence checks can report the first missing field instead of a generic
/// deserialization error.
#[derive(Deserialize, Default)]
pub struct AdSpecification {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub location: Option<Value>,
    pub active: Option<bool>,
}

/// Partial update payload; only fields present in the request are applied.
#[derive(Deserialize, Default, Clone)]
pub struct AdUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub location: Option<Value>,
    pub active: Option<bool>,
}

impl AdUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.image_url.is_none()
            && self.link_url.is_none()
            && self.location.is_none()
            && self.active.is_none()
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Impression,
    Click,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Impression => "impression",
            EventKind::Click => "click",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An append-only analytics event. The `ad_id` is taken verbatim from the
/// client and is not validated against the ad store.
#[derive(Serialize, Clone, Debug)]
pub struct AnalyticsEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub ad_id: String,
    pub timestamp: DateTime<Utc>,
    pub user_location: Option<Value>,
}

#[derive(Deserialize, Default)]
pub struct TrackingRequest {
    pub ad_id: Option<String>,
    pub location: Option<Value>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct AnalyticsStats {
    pub total_impressions: i64,
    pub total_clicks: i64,
    pub ctr: f64,
}
