//! Document id → object id resolution.

use navi_shared::{ApiKey, Result};
use reqwest::StatusCode;
use tracing::{debug, info, instrument};

use crate::wire::DocumentEnvelope;
use crate::{RegulationsClient, ensure_success, read_json};

impl RegulationsClient {
    /// Resolve the provider object id for a document.
    ///
    /// `Ok(None)` is a clean not-found: the document does not exist (404) or
    /// carries no object id. Errors are reserved for transport failures,
    /// rejected credentials and malformed bodies. No retries.
    #[instrument(skip_all, fields(document_id = %document_id))]
    pub async fn resolve_object_id(
        &self,
        document_id: &str,
        key: &ApiKey,
    ) -> Result<Option<String>> {
        let url = self.endpoint(&["documents", document_id]);
        let response = self.get(url, &[], key).await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("document not found");
            return Ok(None);
        }

        let envelope: DocumentEnvelope = read_json(ensure_success(response)?, "document").await?;
        let object_id = envelope.object_id();

        match &object_id {
            Some(id) => info!(object_id = %id, "resolved document object id"),
            None => debug!("document has no object id"),
        }

        Ok(object_id)
    }
}
