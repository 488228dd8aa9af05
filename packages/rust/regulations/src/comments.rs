//! Comment list, count, and detail endpoints.

use navi_shared::{ApiKey, Comment, CommentPage, Result};
use tracing::{debug, info, instrument, warn};

use crate::wire::{CommentEnvelope, ListEnvelope};
use crate::{RegulationsClient, ensure_success, read_json};

/// Smallest page the provider accepts.
pub const MIN_PAGE_SIZE: usize = 5;

/// Largest page the provider accepts.
pub const MAX_PAGE_SIZE: usize = 250;

impl RegulationsClient {
    /// Fetch one page of comment summaries posted on `object_id`, newest first.
    ///
    /// `page_size` is clamped into the provider's accepted range. 401 and 403
    /// come back as auth/permission errors, any other non-success status as a
    /// transport error.
    #[instrument(skip_all, fields(object_id = %object_id, page_size))]
    pub async fn list_comments(
        &self,
        object_id: &str,
        page_size: usize,
        key: &ApiKey,
    ) -> Result<CommentPage> {
        let envelope = self.list_envelope(object_id, page_size, key).await?;
        let page = CommentPage::from(envelope);

        info!(
            returned = page.summaries.len(),
            total = page.total_elements,
            "listed comments"
        );

        Ok(page)
    }

    /// Total comment count for `object_id`.
    ///
    /// Issues the list request at the minimum page size and reads only
    /// `meta.totalElements`, so no comment bodies are transferred.
    #[instrument(skip_all, fields(object_id = %object_id))]
    pub async fn count_comments(&self, object_id: &str, key: &ApiKey) -> Result<u64> {
        let envelope = self.list_envelope(object_id, MIN_PAGE_SIZE, key).await?;
        let total = envelope.total_elements();
        debug!(total, "counted comments");
        Ok(total)
    }

    /// Fetch full detail for one comment, surfacing the failure cause.
    #[instrument(skip_all, fields(comment_id = %comment_id))]
    pub async fn try_fetch_comment(&self, comment_id: &str, key: &ApiKey) -> Result<Comment> {
        let url = self.endpoint(&["comments", comment_id]);
        let response = ensure_success(self.get(url, &[], key).await?)?;
        let envelope: CommentEnvelope = read_json(response, "comment").await?;
        Ok(Comment::from(envelope))
    }

    /// Fetch full detail for one comment; any failure is a soft miss.
    ///
    /// For callers that only want the comments that arrived. The aggregator
    /// uses [`try_fetch_comment`](Self::try_fetch_comment) instead, since it
    /// also tells deadline expiry and failures apart in its batch counts.
    pub async fn fetch_comment(&self, comment_id: &str, key: &ApiKey) -> Option<Comment> {
        match self.try_fetch_comment(comment_id, key).await {
            Ok(comment) => Some(comment),
            Err(e) => {
                warn!(comment_id, error = %e, "skipping comment detail");
                None
            }
        }
    }

    async fn list_envelope(
        &self,
        object_id: &str,
        page_size: usize,
        key: &ApiKey,
    ) -> Result<ListEnvelope> {
        let page_size = page_size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE);
        tracing::Span::current().record("page_size", page_size);

        let size = page_size.to_string();
        let query = [
            ("filter[commentOnId]", object_id),
            ("page[size]", size.as_str()),
            ("sort", "-postedDate"),
        ];

        let url = self.endpoint(&["comments"]);
        let response = ensure_success(self.get(url, &query, key).await?)?;
        read_json(response, "comment list").await
    }
}
