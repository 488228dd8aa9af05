//! regulations.gov v4 API client.
//!
//! One concrete [`RegulationsClient`] covers the three calls the comment
//! pipeline needs:
//! - [`RegulationsClient::resolve_object_id`]: document id → object id
//! - [`RegulationsClient::list_comments`] / [`RegulationsClient::count_comments`]:
//!   newest-first comment summaries for an object id
//! - [`RegulationsClient::fetch_comment`]: full detail for one comment
//!
//! Every non-success outcome is mapped through [`classify`] onto the closed
//! [`navi_shared::NaviError`] taxonomy. The client never retries; callers
//! decide whether to run the whole pipeline again.

pub mod classify;
mod comments;
mod connection;
mod documents;
mod wire;

use navi_shared::{ApiKey, ClientConfig, NaviError, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

pub use comments::{MAX_PAGE_SIZE, MIN_PAGE_SIZE};
pub use connection::ConnectionStatus;

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 3;

/// User-Agent string for provider requests.
const USER_AGENT: &str = concat!("Navi-Regulatory-Analysis/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// RegulationsClient
// ---------------------------------------------------------------------------

/// HTTP client bound to one regulations.gov API root.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct RegulationsClient {
    http: Client,
    base_url: Url,
}

impl RegulationsClient {
    /// Create a client for the configured API root.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            NaviError::config(format!(
                "invalid regulations.gov base URL '{}': {e}",
                config.base_url
            ))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(NaviError::config(format!(
                "regulations.gov base URL '{base_url}' cannot carry a path"
            )));
        }

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| NaviError::transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, base_url })
    }

    /// The API root every request is built from.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `<base>/<segments...>`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Issue a GET with the credential attached as `api_key`.
    ///
    /// Returns the raw response whatever its status; transport failures are
    /// already classified.
    async fn get(&self, url: Url, query: &[(&str, &str)], key: &ApiKey) -> Result<Response> {
        debug!(path = url.path(), "GET");

        self.http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .query(&[("api_key", key.expose())])
            .send()
            .await
            .map_err(classify::classify_transport)
    }
}

/// Pass a success response through; classify anything else.
fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        debug!(status = status.as_u16(), "non-success response");
        Err(classify::classify_status(status))
    }
}

/// Read the whole body and decode it as `T`.
async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let body = response
        .bytes()
        .await
        .map_err(classify::classify_transport)?;
    serde_json::from_slice(&body).map_err(|e| classify::classify_malformed(what, e))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::time::Duration;

    use super::*;

    pub const TEST_KEY: &str = "test-key-0123456789";

    pub fn test_key() -> ApiKey {
        ApiKey::new(TEST_KEY).unwrap()
    }

    pub fn client_for(server: &wiremock::MockServer) -> RegulationsClient {
        let config = ClientConfig {
            base_url: server.uri(),
            request_timeout: Duration::from_secs(5),
        };
        RegulationsClient::new(&config).unwrap()
    }

    pub fn fixture(name: &str) -> String {
        let path = format!("../../../fixtures/json/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }
}
