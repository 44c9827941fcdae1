//! Core domain types for superexpat
//!
//! These types mirror the backend wire format (`/api/chat`, `/api/status`,
//! `/api/metrics`) and the in-memory chat log built from it.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Turn** | One user message plus its resulting assistant message |
//! | **Item** | One event or job record returned by the backend |
//! | **Sentinel** | The fixed placeholder "Date To Be Announced" shown when an item has no date |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Results requested per turn. Paging beyond the first page is not supported.
pub const PAGE_SIZE: u32 = 20;

// ============================================
// Chat log
// ============================================

/// Who authored a message in the chat log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Label shown in message headers.
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => "AI Assistant",
        }
    }
}

/// One entry in the chat log. Never mutated after it is appended.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: Role,
    /// Text typed by the user, or the error description for failed turns
    pub content: Option<String>,
    /// True for assistant turns that carry a failure instead of results
    pub error: bool,
    pub timestamp: DateTime<Utc>,
    /// Parsed backend response for successful assistant turns
    pub data: Option<ChatResponse>,
}

impl Message {
    /// A message typed by the user.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(text.into()),
            error: false,
            timestamp: Utc::now(),
            data: None,
        }
    }

    /// A successful assistant turn.
    pub fn assistant(data: ChatResponse) -> Self {
        Self {
            role: Role::Assistant,
            content: None,
            error: false,
            timestamp: Utc::now(),
            data: Some(data),
        }
    }

    /// A failed assistant turn.
    pub fn assistant_error(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(text.into()),
            error: true,
            timestamp: Utc::now(),
            data: None,
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

// ============================================
// Wire format: /api/chat
// ============================================

/// Request body for POST /api/chat
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub page: u32,
    pub page_size: u32,
}

impl<'a> ChatRequest<'a> {
    /// First page of results for `message`.
    pub fn first_page(message: &'a str) -> Self {
        Self {
            message,
            page: 1,
            page_size: PAGE_SIZE,
        }
    }
}

/// Response from POST /api/chat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Total number of matches found by the backend
    pub total_results: u64,
    /// AI-generated answer; replaces the result count when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
    /// Items for the requested page, in backend order
    #[serde(default)]
    pub results: Vec<Item>,
    /// Classified intent (e.g. "events", "jobs")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    /// Query as understood by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Location extracted from the query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl ChatResponse {
    /// Summary text, if the backend sent a non-empty one.
    pub fn summary(&self) -> Option<&str> {
        non_empty(&self.ai_summary)
    }
}

/// Page echoed back by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

/// Discriminator for result items.
///
/// Anything other than `"job"` (including a missing field) is an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum ItemKind {
    #[default]
    Event,
    Job,
}

impl From<String> for ItemKind {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("job") {
            ItemKind::Job
        } else {
            ItemKind::Event
        }
    }
}

/// One event or job record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Stable identifier; numbers are accepted and kept as strings
    #[serde(
        default,
        deserialize_with = "deserialize_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: ItemKind,
    #[serde(default)]
    pub title: Option<String>,
    /// Start date as sent by the backend (usually `YYYY-MM-DD`)
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    /// Poster image URL
    #[serde(default)]
    pub poster: Option<String>,
    /// Provider the item came from (eventbrite, serpapi, ...)
    #[serde(default)]
    pub source: Option<String>,
    /// External detail page
    #[serde(default)]
    pub url: Option<String>,
}

fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Treat `Some("")` like `None`; the backend uses both for missing text.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

// ============================================
// Wire format: /api/status and /api/metrics
// ============================================

/// Response from GET /api/status
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

/// Response from GET /api/metrics
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendMetrics {
    #[serde(default)]
    pub avg_response_ms: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
}
