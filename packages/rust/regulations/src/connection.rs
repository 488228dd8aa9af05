//! Credential/connectivity probe.

use navi_shared::{ApiKey, NaviError, Result};
use tracing::{info, instrument, warn};

use crate::wire::ListEnvelope;
use crate::{RegulationsClient, ensure_success, read_json};

/// Agency used for the probe queries; any agency with public dockets works.
const PROBE_AGENCY: &str = "EPA";

/// What the key is allowed to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Dockets and comments are both readable.
    Full,
    /// Dockets are denied but comments are readable, which is all the
    /// comment pipeline needs.
    Limited,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => f.write_str("API key is valid and working"),
            Self::Limited => {
                f.write_str("API key is valid (limited access: dockets endpoint restricted)")
            }
        }
    }
}

impl RegulationsClient {
    /// Check that `key` is accepted by the provider.
    ///
    /// Probes the dockets endpoint first; if that is forbidden, falls back to
    /// the comments endpoint and reports [`ConnectionStatus::Limited`].
    #[instrument(skip_all)]
    pub async fn check_connection(&self, key: &ApiKey) -> Result<ConnectionStatus> {
        match self.probe("dockets", key).await {
            Ok(()) => {
                info!("dockets probe succeeded");
                Ok(ConnectionStatus::Full)
            }
            Err(NaviError::Permission { .. }) => {
                warn!("dockets probe forbidden, trying comments");
                self.probe("comments", key).await?;
                Ok(ConnectionStatus::Limited)
            }
            Err(e) => Err(e),
        }
    }

    async fn probe(&self, resource: &str, key: &ApiKey) -> Result<()> {
        let query = [("filter[agencyId]", PROBE_AGENCY), ("page[size]", "5")];
        let url = self.endpoint(&[resource]);
        let response = ensure_success(self.get(url, &query, key).await?)?;
        let _: ListEnvelope = read_json(response, resource).await?;
        Ok(())
    }
}
