//! JSON:API response shapes returned by regulations.gov v4.
//!
//! Only the fields the pipeline reads are modelled; everything else in the
//! payload is ignored.

use navi_shared::{Comment, CommentPage, CommentSummary};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// GET /documents/{documentId}
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct DocumentEnvelope {
    #[serde(default)]
    pub data: Option<DocumentData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DocumentData {
    #[serde(default)]
    pub attributes: Option<DocumentAttributes>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DocumentAttributes {
    #[serde(default)]
    pub object_id: Option<String>,
}

impl DocumentEnvelope {
    /// The object id, if present and non-empty.
    pub fn object_id(self) -> Option<String> {
        self.data
            .and_then(|d| d.attributes)
            .and_then(|a| a.object_id)
            .filter(|id| !id.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// GET /comments?filter[...]  (also used for /dockets probes)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct ListEnvelope {
    #[serde(default)]
    pub data: Vec<ListItem>,
    #[serde(default)]
    pub meta: Option<ListMeta>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListItem {
    pub id: String,
    #[serde(default)]
    pub attributes: Option<ListItemAttributes>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListItemAttributes {
    #[serde(default)]
    pub posted_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListMeta {
    #[serde(default)]
    pub total_elements: Option<u64>,
}

impl ListEnvelope {
    pub fn total_elements(&self) -> u64 {
        self.meta
            .as_ref()
            .and_then(|m| m.total_elements)
            .unwrap_or(0)
    }
}

impl From<ListEnvelope> for CommentPage {
    fn from(envelope: ListEnvelope) -> Self {
        let total_elements = envelope.total_elements();
        let summaries = envelope
            .data
            .into_iter()
            .map(|item| CommentSummary {
                id: item.id,
                posted_date: item.attributes.and_then(|a| a.posted_date),
            })
            .collect();

        Self {
            summaries,
            total_elements,
        }
    }
}

// ---------------------------------------------------------------------------
// GET /comments/{commentId}
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct CommentEnvelope {
    pub data: CommentData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentData {
    pub id: String,
    #[serde(default)]
    pub attributes: CommentAttributes,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentAttributes {
    #[serde(default)]
    pub comment_on_document_id: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub comment_text: Option<String>,
    #[serde(default)]
    pub submitter_name: Option<String>,
    #[serde(default)]
    pub organization_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub posted_date: Option<String>,
    #[serde(default)]
    pub docket_id: Option<String>,
    #[serde(default)]
    pub agency_id: Option<String>,
}

impl From<CommentEnvelope> for Comment {
    fn from(envelope: CommentEnvelope) -> Self {
        let CommentData { id, attributes: a } = envelope.data;

        // Older records carry the body under `commentText`
        let body = a
            .comment
            .filter(|c| !c.is_empty())
            .or(a.comment_text)
            .unwrap_or_default();

        Self {
            id,
            comment_on_document_id: a.comment_on_document_id.unwrap_or_default(),
            comment: body,
            submitter_name: a.submitter_name,
            organization_name: a.organization_name,
            first_name: a.first_name,
            last_name: a.last_name,
            title: a.title,
            posted_date: a.posted_date.unwrap_or_default(),
            docket_id: a.docket_id.unwrap_or_default(),
            agency_id: a.agency_id.unwrap_or_default(),
        }
    }
}
