//! Summary version types.
//!
//! A summary panel keeps every generated candidate as a separate version so
//! the user can compare, edit, and accept any of them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One generated (and possibly edited) summary candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryVersion {
    /// Stable identifier, assigned at creation
    pub id: Uuid,
    /// Text body; replaced in place when the user edits it
    pub content: String,
    /// When this version was generated
    pub created_at: DateTime<Utc>,
}

impl SummaryVersion {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Format timestamp for display
    pub fn formatted_time(&self) -> String {
        self.created_at.format("%Y-%m-%d %H:%M").to_string()
    }

    /// Format relative time (e.g., "2 minutes ago")
    pub fn relative_time(&self) -> String {
        relative_to(self.created_at, Utc::now())
    }
}

fn relative_to(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(then);

    if duration.num_seconds() < 60 {
        "just now".to_string()
    } else if duration.num_minutes() < 60 {
        match duration.num_minutes() {
            1 => "1 minute ago".to_string(),
            mins => format!("{} minutes ago", mins),
        }
    } else if duration.num_hours() < 24 {
        match duration.num_hours() {
            1 => "1 hour ago".to_string(),
            hours => format!("{} hours ago", hours),
        }
    } else {
        then.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// Per-version action forwarded from the view layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SummaryAction {
    Accept { id: Uuid },
    Delete { id: Uuid },
    Edit { id: Uuid, content: String },
    Regenerate,
}
