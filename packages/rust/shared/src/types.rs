//! Core domain types for the regulations.gov comment pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hard ceiling on comments processed per document.
///
/// Also the page size requested from the list endpoint, so a single page
/// never yields more summaries than the pipeline is willing to expand.
pub const SAFETY_CAP: usize = 30;

// ---------------------------------------------------------------------------
// ApiKey
// ---------------------------------------------------------------------------

/// A regulations.gov API key.
///
/// `Debug` never prints the key itself so it cannot leak through tracing
/// fields or panic messages.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key. Returns `None` for empty or whitespace-only input.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The key as sent on the wire.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Short prefix for display (`abcdefghij...`), matching how setup tools
    /// echo a saved key back to the user.
    pub fn masked(&self) -> String {
        let prefix: String = self.0.chars().take(10).collect();
        format!("{prefix}...")
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// Comment listing
// ---------------------------------------------------------------------------

/// One row of the comment list endpoint: just enough to fetch the detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentSummary {
    /// Provider comment identifier (e.g. `EPA-HQ-OAR-2021-0317-0105`).
    pub id: String,
    /// Posting date as reported by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_date: Option<String>,
}

/// A single page of comment summaries, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentPage {
    /// Summaries in provider order (`postedDate` descending).
    pub summaries: Vec<CommentSummary>,
    /// Total number of comments the provider reports for the object.
    /// Informational only; may disagree with `summaries.len()`.
    pub total_elements: u64,
}

// ---------------------------------------------------------------------------
// Comment
// ---------------------------------------------------------------------------

/// A fully fetched public comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Provider comment identifier.
    pub id: String,
    /// Document the comment was posted on.
    pub comment_on_document_id: String,
    /// Body text. Empty when the submitter only attached files.
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitter_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Posting date as reported by the provider (ISO-8601).
    pub posted_date: String,
    pub docket_id: String,
    pub agency_id: String,
}

impl Comment {
    /// Parsed posting timestamp, when the provider string is RFC 3339.
    pub fn posted_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.posted_date)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Whether this comment was posted on `document_id`.
    pub fn is_on_document(&self, document_id: &str) -> bool {
        self.comment_on_document_id == document_id
    }

    /// Best human-readable name for whoever submitted the comment.
    ///
    /// Organization wins over an individual's name, which wins over the
    /// first/last name pair.
    pub fn submitter_display(&self) -> Option<String> {
        if let Some(org) = non_blank(self.organization_name.as_deref()) {
            return Some(org.to_string());
        }
        if let Some(name) = non_blank(self.submitter_name.as_deref()) {
            return Some(name.to_string());
        }

        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .filter_map(non_blank)
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
