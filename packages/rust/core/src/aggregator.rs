//! End-to-end comment aggregation: document id → object id → comment list →
//! bounded detail fan-out → filtered batch.

use std::sync::Arc;

use futures_util::StreamExt;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use navi_regulations::RegulationsClient;
use navi_shared::{
    AppConfig, ChainCredential, ClientConfig, Comment, CredentialSource, NaviError,
    PipelineConfig, Result, SAFETY_CAP, require_api_key,
};

use crate::context::{FetchContext, Interrupted};
use crate::docket::derive_docket_id;

// ---------------------------------------------------------------------------
// CommentBatch
// ---------------------------------------------------------------------------

/// Result of one aggregation.
#[derive(Debug, Clone, Serialize)]
pub struct CommentBatch {
    /// Document the comments were requested for.
    pub document_id: String,
    /// Owning docket, as supplied by the caller or derived from the document id.
    pub docket_id: Option<String>,
    /// Comments posted on `document_id`, newest first.
    pub comments: Vec<Comment>,
    /// Summaries whose detail was requested (never more than [`SAFETY_CAP`]).
    pub attempted: usize,
    /// Detail fetches that failed or ran past the deadline.
    pub skipped: usize,
    /// Details dropped because they belong to another document.
    pub mismatched: usize,
    /// Total the provider reported for the document. Informational.
    pub total_reported: u64,
    /// The run was cancelled; `comments` holds what was collected until then.
    pub cancelled: bool,
}

impl CommentBatch {
    fn empty(document_id: &str, docket_id: Option<String>) -> Self {
        Self {
            document_id: document_id.to_string(),
            docket_id,
            comments: Vec::new(),
            attempted: 0,
            skipped: 0,
            mismatched: 0,
            total_reported: 0,
            cancelled: false,
        }
    }

    fn into_cancelled(mut self) -> Self {
        self.cancelled = true;
        self
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Progress callback for reporting aggregation status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each detail fetch settles, kept or not.
    fn comment_fetched(&self, comment_id: &str, current: usize, total: usize);
    /// Called when the aggregation returns a batch.
    fn done(&self, batch: &CommentBatch);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn comment_fetched(&self, _comment_id: &str, _current: usize, _total: usize) {}
    fn done(&self, _batch: &CommentBatch) {}
}

// ---------------------------------------------------------------------------
// CommentAggregator
// ---------------------------------------------------------------------------

/// Composes the provider calls into the comment pipeline.
///
/// Holds no per-invocation state; one aggregator can serve any number of
/// concurrent, independent calls.
pub struct CommentAggregator {
    client: RegulationsClient,
    credentials: Arc<dyn CredentialSource>,
    options: PipelineConfig,
}

impl CommentAggregator {
    pub fn new(
        client: RegulationsClient,
        credentials: Arc<dyn CredentialSource>,
        options: PipelineConfig,
    ) -> Self {
        Self {
            client,
            credentials,
            options,
        }
    }

    /// Build an aggregator from the app config: configured API root,
    /// credential file then env var, configured concurrency and deadline.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = RegulationsClient::new(&ClientConfig::from(config))?;
        let credentials = ChainCredential::from_config(config)?;
        Ok(Self::new(
            client,
            Arc::new(credentials),
            PipelineConfig::from(config),
        ))
    }

    pub fn options(&self) -> &PipelineConfig {
        &self.options
    }

    pub fn client(&self) -> &RegulationsClient {
        &self.client
    }

    /// Fetch up to [`SAFETY_CAP`] of the newest comments posted on
    /// `document_id`, bounded by the configured deadline.
    pub async fn fetch_comments_for_document(
        &self,
        docket_id: &str,
        document_id: &str,
    ) -> Result<Vec<Comment>> {
        let ctx = FetchContext::from_config(&self.options);
        let batch = self
            .aggregate(document_id, Some(docket_id), &ctx, &SilentProgress)
            .await?;
        Ok(batch.comments)
    }

    /// Total comment count for a document, or 0 if anything goes wrong.
    pub async fn get_comment_count(&self, document_id: &str) -> u64 {
        let ctx = FetchContext::from_config(&self.options);
        match self.try_comment_count(document_id, &ctx).await {
            Ok(count) => count,
            Err(e) => {
                warn!(document_id, error = %e, "comment count unavailable");
                0
            }
        }
    }

    async fn try_comment_count(&self, document_id: &str, ctx: &FetchContext) -> Result<u64> {
        let key = require_api_key(self.credentials.as_ref())?;

        let lookup = self.client.resolve_object_id(document_id, &key);
        let Some(object_id) = bounded(ctx, "document lookup", lookup).await?? else {
            return Ok(0);
        };

        bounded(ctx, "comment count", self.client.count_comments(&object_id, &key)).await?
    }

    /// Run the full pipeline.
    ///
    /// 1. Resolve the document's object id (not found → empty batch)
    /// 2. List one page of [`SAFETY_CAP`] summaries, newest first
    /// 3. Cap to the rows actually returned, never more than [`SAFETY_CAP`]
    /// 4. Fetch details with bounded concurrency, preserving list order
    /// 5. Drop details that belong to another document
    ///
    /// Lookup and list failures (including the deadline passing) are errors.
    /// Detail failures only reduce the batch. Cancellation is not an error:
    /// the batch collected so far comes back with `cancelled` set.
    #[instrument(skip_all, fields(document_id = %document_id))]
    pub async fn aggregate(
        &self,
        document_id: &str,
        docket_id: Option<&str>,
        ctx: &FetchContext,
        progress: &dyn ProgressReporter,
    ) -> Result<CommentBatch> {
        let key = require_api_key(self.credentials.as_ref())?;

        let docket_id = docket_id
            .map(str::to_string)
            .or_else(|| derive_docket_id(document_id));
        let mut batch = CommentBatch::empty(document_id, docket_id);

        // --- Phase 1: object id ---
        progress.phase("Resolving document");
        let object_id = match ctx.run(self.client.resolve_object_id(document_id, &key)).await {
            Ok(result) => result?,
            Err(Interrupted::Cancelled) => return Ok(finish(batch.into_cancelled(), progress)),
            Err(Interrupted::DeadlineExceeded) => return Err(deadline_error("document lookup")),
        };
        let Some(object_id) = object_id else {
            info!("no object id for document, no comments available");
            return Ok(finish(batch, progress));
        };

        // --- Phase 2: comment list ---
        progress.phase("Listing comments");
        let page = match ctx
            .run(self.client.list_comments(&object_id, SAFETY_CAP, &key))
            .await
        {
            Ok(result) => result?,
            Err(Interrupted::Cancelled) => return Ok(finish(batch.into_cancelled(), progress)),
            Err(Interrupted::DeadlineExceeded) => return Err(deadline_error("comment list")),
        };
        batch.total_reported = page.total_elements;

        // --- Phase 3: safety cap ---
        let mut summaries = page.summaries;
        if summaries.len() > SAFETY_CAP {
            warn!(
                returned = summaries.len(),
                cap = SAFETY_CAP,
                "provider returned more rows than requested, truncating"
            );
            summaries.truncate(SAFETY_CAP);
        }
        if summaries.is_empty() {
            info!("no comments listed for document");
            return Ok(finish(batch, progress));
        }
        if batch.total_reported > summaries.len() as u64 {
            info!(
                total = batch.total_reported,
                processing = summaries.len(),
                "limiting to most recent comments"
            );
        }

        // --- Phase 4/5: details, in list order ---
        progress.phase("Fetching comment details");
        let total = summaries.len();
        batch.attempted = total;

        let client = &self.client;
        let key = &key;
        let fetches = summaries.into_iter().map(|summary| async move {
            let outcome = ctx.run(client.try_fetch_comment(&summary.id, key)).await;
            (summary.id, outcome)
        });
        let mut details =
            futures_util::stream::iter(fetches).buffered(self.options.detail_concurrency);

        let mut settled = 0;
        loop {
            let next = tokio::select! {
                biased;
                _ = ctx.cancel_token().cancelled() => None,
                next = details.next() => next,
            };
            let Some((comment_id, outcome)) = next else {
                break;
            };
            settled += 1;

            match outcome {
                Ok(Ok(comment)) if comment.is_on_document(document_id) => {
                    batch.comments.push(comment);
                }
                Ok(Ok(comment)) => {
                    debug!(
                        %comment_id,
                        posted_on = %comment.comment_on_document_id,
                        "comment belongs to another document, dropping"
                    );
                    batch.mismatched += 1;
                }
                Ok(Err(e)) => {
                    warn!(%comment_id, error = %e, "skipping comment detail");
                    batch.skipped += 1;
                }
                Err(Interrupted::DeadlineExceeded) => {
                    warn!(%comment_id, "deadline passed before comment detail arrived");
                    batch.skipped += 1;
                }
                Err(Interrupted::Cancelled) => break,
            }

            progress.comment_fetched(&comment_id, settled, total);
        }

        if ctx.is_cancelled() {
            batch.cancelled = true;
            warn!(
                collected = batch.comments.len(),
                attempted = total,
                "aggregation cancelled, returning partial batch"
            );
        }

        info!(
            comments = batch.comments.len(),
            attempted = batch.attempted,
            skipped = batch.skipped,
            mismatched = batch.mismatched,
            "aggregation completed"
        );

        Ok(finish(batch, progress))
    }
}

fn finish(batch: CommentBatch, progress: &dyn ProgressReporter) -> CommentBatch {
    progress.done(&batch);
    batch
}

fn deadline_error(stage: &str) -> NaviError {
    NaviError::transport(format!("deadline exceeded during {stage}"))
}

/// Run a pipeline-level call under `ctx`; interruption becomes a transport
/// error.
async fn bounded<F: std::future::Future>(
    ctx: &FetchContext,
    stage: &str,
    fut: F,
) -> Result<F::Output> {
    match ctx.run(fut).await {
        Ok(out) => Ok(out),
        Err(Interrupted::DeadlineExceeded) => Err(deadline_error(stage)),
        Err(Interrupted::Cancelled) => Err(NaviError::transport(format!("{stage} cancelled"))),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use navi_shared::{ApiKey, StaticCredential};
    use serde_json::json;
    use wiremock::matchers::{method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    use crate::context::CancelToken;

    use super::*;

    const DOC: &str = "EPA-HQ-OAR-2021-0317-0001";
    const OTHER_DOC: &str = "EPA-HQ-OAR-2021-0317-0002";
    const OBJECT_ID: &str = "09000064864a5b39";

    fn comment_id(i: usize) -> String {
        format!("EPA-HQ-OAR-2021-0317-{:04}", 1000 - i)
    }

    fn aggregator(server: &MockServer, concurrency: usize) -> CommentAggregator {
        let client = RegulationsClient::new(&ClientConfig {
            base_url: server.uri(),
            request_timeout: Duration::from_secs(5),
        })
        .unwrap();
        let credentials = StaticCredential::new(ApiKey::new("test-key-0123456789").unwrap());
        CommentAggregator::new(
            client,
            Arc::new(credentials),
            PipelineConfig::default().with_concurrency(concurrency),
        )
    }

    async fn mount_document(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path(format!("/documents/{DOC}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "attributes": { "objectId": OBJECT_ID } }
            })))
            .mount(server)
            .await;
    }

    /// List endpoint returning `n` summaries, newest first, regardless of the
    /// requested page size.
    async fn mount_list(server: &MockServer, n: usize, total: u64) {
        let data: Vec<_> = (0..n)
            .map(|i| {
                let posted = format!("2021-12-{:02}T05:00:00Z", 28 - (i % 28));
                json!({ "id": comment_id(i), "attributes": { "postedDate": posted } })
            })
            .collect();

        Mock::given(method("GET"))
            .and(path("/comments"))
            .and(query_param("filter[commentOnId]", OBJECT_ID))
            .and(query_param("page[size]", "30"))
            .and(query_param("sort", "-postedDate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": data,
                "meta": { "totalElements": total }
            })))
            .mount(server)
            .await;
    }

    fn detail_body(id: &str, on_document: &str) -> serde_json::Value {
        json!({
            "data": {
                "id": id,
                "attributes": {
                    "commentOnDocumentId": on_document,
                    "comment": format!("body of {id}"),
                    "postedDate": "2021-12-01T05:00:00Z",
                    "docketId": "EPA-HQ-OAR-2021-0317",
                    "agencyId": "EPA"
                }
            }
        })
    }

    fn requested_comment(req: &Request) -> String {
        req.url
            .path()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string()
    }

    /// Detail endpoint that echoes the requested id back, posted on `DOC`.
    async fn mount_details(server: &MockServer, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path_regex(r"^/comments/.+$"))
            .respond_with(|req: &Request| {
                ResponseTemplate::new(200).set_body_json(detail_body(&requested_comment(req), DOC))
            })
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    fn ids(comments: &[Comment]) -> Vec<String> {
        comments.iter().map(|c| c.id.clone()).collect()
    }

    #[tokio::test]
    async fn unresolved_document_is_empty_not_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/documents/{DOC}")))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/comments"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let agg = aggregator(&server, 4);
        let comments = agg
            .fetch_comments_for_document("EPA-HQ-OAR-2021-0317", DOC)
            .await
            .unwrap();
        assert!(comments.is_empty());
    }

    #[tokio::test]
    async fn missing_credential_fails_before_any_request() {
        let server = MockServer::start().await;

        let client = RegulationsClient::new(&ClientConfig {
            base_url: server.uri(),
            request_timeout: Duration::from_secs(5),
        })
        .unwrap();
        let agg = CommentAggregator::new(
            client,
            Arc::new(StaticCredential::missing()),
            PipelineConfig::default(),
        );

        let err = agg
            .fetch_comments_for_document("EPA-HQ-OAR-2021-0317", DOC)
            .await
            .unwrap_err();
        assert!(matches!(err, NaviError::Configuration { .. }));

        let requests = server.received_requests().await.unwrap();
        assert!(requests.is_empty());
    }

    #[tokio::test]
    async fn empty_list_is_empty_batch() {
        let server = MockServer::start().await;
        mount_document(&server).await;
        mount_list(&server, 0, 0).await;
        mount_details(&server, 0).await;

        let agg = aggregator(&server, 4);
        let batch = agg
            .aggregate(DOC, None, &FetchContext::new(), &SilentProgress)
            .await
            .unwrap();
        assert!(batch.is_empty());
        assert_eq!(batch.attempted, 0);
        assert_eq!(batch.docket_id.as_deref(), Some("EPA-HQ-OAR-2021-0317"));
    }

    #[tokio::test]
    async fn caps_at_thirty_newest_and_keeps_order() {
        let server = MockServer::start().await;
        mount_document(&server).await;
        // Provider ignores page[size] and returns 45 rows
        mount_list(&server, 45, 45).await;
        mount_details(&server, 30).await;

        let agg = aggregator(&server, 4);
        let batch = agg
            .aggregate(DOC, None, &FetchContext::new(), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(batch.attempted, 30);
        assert_eq!(batch.len(), 30);
        assert_eq!(batch.total_reported, 45);
        let expected: Vec<String> = (0..30).map(comment_id).collect();
        assert_eq!(ids(&batch.comments), expected);
        assert!(batch.comments.iter().all(|c| c.comment_on_document_id == DOC));
    }

    #[tokio::test]
    async fn order_survives_out_of_order_completion() {
        let server = MockServer::start().await;
        mount_document(&server).await;
        mount_list(&server, 8, 8).await;

        // Delays are out of list order
        Mock::given(method("GET"))
            .and(path_regex(r"^/comments/.+$"))
            .respond_with(|req: &Request| {
                let id = requested_comment(req);
                let seq: u64 = id.rsplit('-').next().and_then(|s| s.parse().ok()).unwrap_or(0);
                let delay = Duration::from_millis((seq % 10) * 15);
                ResponseTemplate::new(200)
                    .set_body_json(detail_body(&id, DOC))
                    .set_delay(delay)
            })
            .mount(&server)
            .await;

        let agg = aggregator(&server, 6);
        let batch = agg
            .aggregate(DOC, None, &FetchContext::new(), &SilentProgress)
            .await
            .unwrap();

        let expected: Vec<String> = (0..8).map(comment_id).collect();
        assert_eq!(ids(&batch.comments), expected);
    }

    #[tokio::test]
    async fn drops_mismatched_and_skips_failed_details() {
        let server = MockServer::start().await;
        mount_document(&server).await;
        mount_list(&server, 5, 5).await;

        Mock::given(method("GET"))
            .and(path_regex(r"^/comments/.+$"))
            .respond_with(|req: &Request| {
                let id = requested_comment(req);
                if id == comment_id(1) {
                    ResponseTemplate::new(200).set_body_json(detail_body(&id, OTHER_DOC))
                } else if id == comment_id(3) {
                    ResponseTemplate::new(500)
                } else {
                    ResponseTemplate::new(200).set_body_json(detail_body(&id, DOC))
                }
            })
            .mount(&server)
            .await;

        let agg = aggregator(&server, 1);
        let batch = agg
            .aggregate(DOC, Some("EPA-HQ-OAR-2021-0317"), &FetchContext::new(), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(
            ids(&batch.comments),
            vec![comment_id(0), comment_id(2), comment_id(4)]
        );
        assert_eq!(batch.attempted, 5);
        assert_eq!(batch.mismatched, 1);
        assert_eq!(batch.skipped, 1);
        assert!(!batch.cancelled);
    }

    #[tokio::test]
    async fn list_401_is_auth_error() {
        let server = MockServer::start().await;
        mount_document(&server).await;
        Mock::given(method("GET"))
            .and(path("/comments"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let agg = aggregator(&server, 4);
        let err = agg
            .fetch_comments_for_document("EPA-HQ-OAR-2021-0317", DOC)
            .await
            .unwrap_err();
        assert!(matches!(err, NaviError::Auth { .. }));
    }

    #[tokio::test]
    async fn list_403_is_permission_error() {
        let server = MockServer::start().await;
        mount_document(&server).await;
        Mock::given(method("GET"))
            .and(path("/comments"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let agg = aggregator(&server, 4);
        let err = agg
            .fetch_comments_for_document("EPA-HQ-OAR-2021-0317", DOC)
            .await
            .unwrap_err();
        assert!(matches!(err, NaviError::Permission { .. }));
    }

    #[tokio::test]
    async fn slow_details_are_soft_misses_at_deadline() {
        let server = MockServer::start().await;
        mount_document(&server).await;
        mount_list(&server, 3, 3).await;

        Mock::given(method("GET"))
            .and(path_regex(r"^/comments/.+$"))
            .respond_with(|req: &Request| {
                ResponseTemplate::new(200)
                    .set_body_json(detail_body(&requested_comment(req), DOC))
                    .set_delay(Duration::from_secs(3))
            })
            .mount(&server)
            .await;

        let agg = aggregator(&server, 3);
        let ctx = FetchContext::new().with_timeout(Duration::from_millis(500));
        let batch = agg.aggregate(DOC, None, &ctx, &SilentProgress).await.unwrap();

        assert!(batch.is_empty());
        assert_eq!(batch.attempted, 3);
        assert_eq!(batch.skipped, 3);
    }

    #[tokio::test]
    async fn slow_list_past_deadline_is_transport_error() {
        let server = MockServer::start().await;
        mount_document(&server).await;
        Mock::given(method("GET"))
            .and(path("/comments"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": [] }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let agg = aggregator(&server, 4);
        let ctx = FetchContext::new().with_timeout(Duration::from_millis(300));
        let err = agg.aggregate(DOC, None, &ctx, &SilentProgress).await.unwrap_err();

        assert!(matches!(err, NaviError::Transport { status: None, .. }));
        assert!(err.to_string().contains("deadline"));
    }

    /// Cancels the run once `after` comments have settled.
    struct CancelAfter {
        token: CancelToken,
        after: usize,
        seen: Mutex<Vec<String>>,
    }

    impl ProgressReporter for CancelAfter {
        fn phase(&self, _name: &str) {}

        fn comment_fetched(&self, comment_id: &str, current: usize, _total: usize) {
            self.seen.lock().unwrap().push(comment_id.to_string());
            if current == self.after {
                self.token.cancel();
            }
        }

        fn done(&self, _batch: &CommentBatch) {}
    }

    #[tokio::test]
    async fn cancellation_returns_partial_batch() {
        let server = MockServer::start().await;
        mount_document(&server).await;
        mount_list(&server, 10, 10).await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/comments/.+$"))
            .respond_with(|req: &Request| {
                ResponseTemplate::new(200).set_body_json(detail_body(&requested_comment(req), DOC))
            })
            .mount(&server)
            .await;

        let token = CancelToken::new();
        let reporter = CancelAfter {
            token: token.clone(),
            after: 2,
            seen: Mutex::new(Vec::new()),
        };

        let agg = aggregator(&server, 1);
        let ctx = FetchContext::new().with_cancel(token);
        let batch = agg.aggregate(DOC, None, &ctx, &reporter).await.unwrap();

        assert!(batch.cancelled);
        assert_eq!(ids(&batch.comments), vec![comment_id(0), comment_id(1)]);
        assert_eq!(reporter.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn cancelled_before_start_sends_nothing() {
        let server = MockServer::start().await;

        let agg = aggregator(&server, 4);
        let ctx = FetchContext::new();
        ctx.cancel_token().cancel();

        let batch = agg.aggregate(DOC, None, &ctx, &SilentProgress).await.unwrap();
        assert!(batch.cancelled);
        assert!(batch.is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn comment_count_reads_total() {
        let server = MockServer::start().await;
        mount_document(&server).await;
        Mock::given(method("GET"))
            .and(path("/comments"))
            .and(query_param("page[size]", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [],
                "meta": { "totalElements": 1284 }
            })))
            .mount(&server)
            .await;

        let agg = aggregator(&server, 4);
        assert_eq!(agg.get_comment_count(DOC).await, 1284);
    }

    #[tokio::test]
    async fn comment_count_is_zero_on_every_failure() {
        // Missing credential
        let server = MockServer::start().await;
        let client = RegulationsClient::new(&ClientConfig {
            base_url: server.uri(),
            request_timeout: Duration::from_secs(5),
        })
        .unwrap();
        let agg = CommentAggregator::new(
            client,
            Arc::new(StaticCredential::missing()),
            PipelineConfig::default(),
        );
        assert_eq!(agg.get_comment_count(DOC).await, 0);

        // Unresolved document
        let server = MockServer::start().await;
        Mock::given(path(format!("/documents/{DOC}")))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        assert_eq!(aggregator(&server, 4).get_comment_count(DOC).await, 0);

        // Document lookup server error
        let server = MockServer::start().await;
        Mock::given(path(format!("/documents/{DOC}")))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;
        assert_eq!(aggregator(&server, 4).get_comment_count(DOC).await, 0);

        // List rejects the key
        let server = MockServer::start().await;
        mount_document(&server).await;
        Mock::given(path("/comments"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        assert_eq!(aggregator(&server, 4).get_comment_count(DOC).await, 0);

        // Malformed list body
        let server = MockServer::start().await;
        mount_document(&server).await;
        Mock::given(path("/comments"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{"))
            .mount(&server)
            .await;
        assert_eq!(aggregator(&server, 4).get_comment_count(DOC).await, 0);
    }
}
