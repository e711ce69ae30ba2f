//! Lead tracking records and the views rendered from them.
//!
//! Stored records keep references as plain ids. Views are what the API
//! returns after the populator has expanded those references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Status value that stamps `closed_at` on write.
pub const STATUS_CLOSED: &str = "Closed";

/// Status given to leads created without one.
pub const STATUS_NEW: &str = "New";

/// A sales agent leads can be assigned to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SalesAgent {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Stored lead document. `sales_agent` and `comments` hold ids only.
#[derive(Debug, Clone, PartialEq)]
pub struct Lead {
    pub id: String,
    pub name: String,
    pub source: Option<String>,
    pub sales_agent: Option<String>,
    pub status: String,
    pub tags: Vec<String>,
    pub time_to_close: Option<i64>,
    pub priority: Option<String>,
    pub closed_at: Option<DateTime<Utc>>,
    pub comments: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    /// Build a lead from a create payload, stamping `closed_at` when the
    /// payload arrives already closed.
    pub fn new(payload: NewLead, now: DateTime<Utc>) -> Self {
        let closed_at = (payload.status == STATUS_CLOSED).then_some(now);
        Self {
            id: Uuid::new_v4().to_string(),
            name: payload.name,
            source: payload.source,
            sales_agent: payload.sales_agent,
            status: payload.status,
            tags: payload.tags,
            time_to_close: payload.time_to_close,
            priority: payload.priority,
            closed_at,
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.status == STATUS_CLOSED
    }

    /// Merge a partial update into this lead.
    ///
    /// Moving to `Closed` stamps `closed_at` if it is not already set. Moving
    /// away from `Closed` leaves an existing `closed_at` untouched.
    pub fn apply(&mut self, update: LeadUpdate, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(source) = update.source {
            self.source = Some(source);
        }
        if let Some(agent) = update.sales_agent {
            self.sales_agent = agent;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        if let Some(days) = update.time_to_close {
            self.time_to_close = Some(days);
        }
        if let Some(priority) = update.priority {
            self.priority = Some(priority);
        }
        if self.is_closed() && self.closed_at.is_none() {
            self.closed_at = Some(now);
        }
        self.updated_at = now;
    }
}

/// A comment left on a lead by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: String,
    pub lead: String,
    pub author: String,
    pub comment_text: String,
    pub created_at: DateTime<Utc>,
}

/// `{id, name}` projection of a referenced agent or user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Summary {
    pub id: String,
    pub name: String,
}

/// A reference that is either still a raw id or has been expanded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Reference {
    Expanded(Summary),
    Id(String),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub lead: String,
    pub author: Reference,
    pub comment_text: String,
    pub created_at: DateTime<Utc>,
}

/// Lead as returned by the API, agent reference expanded.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeadView {
    pub id: String,
    pub name: String,
    pub source: Option<String>,
    pub sales_agent: Option<Summary>,
    pub status: String,
    pub tags: Vec<String>,
    pub time_to_close: Option<i64>,
    pub priority: Option<String>,
    pub closed_at: Option<DateTime<Utc>>,
    pub comments: Vec<CommentView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create payload for `POST /leads`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLead {
    pub name: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub sales_agent: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub time_to_close: Option<i64>,
    #[serde(default)]
    pub priority: Option<String>,
}

fn default_status() -> String {
    STATUS_NEW.to_string()
}

/// Partial update payload for `POST /leads/:leadId`.
///
/// `sales_agent` distinguishes an absent field (keep) from an explicit
/// `null` (unassign).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub sales_agent: Option<Option<String>>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub time_to_close: Option<i64>,
    #[serde(default)]
    pub priority: Option<String>,
}

fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
