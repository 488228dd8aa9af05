//! Cancellation and deadline handling for one pipeline invocation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use navi_shared::PipelineConfig;

// ---------------------------------------------------------------------------
// CancelToken
// ---------------------------------------------------------------------------

/// Cloneable cancellation signal. Cancelling any clone cancels them all.
#[derive(Debug, Clone)]
pub struct CancelToken {
    sender: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        let mut rx = self.sender.subscribe();
        // The sender lives as long as `self`, so the channel cannot close here.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// FetchContext
// ---------------------------------------------------------------------------

/// Why a bounded call did not produce its own result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    Cancelled,
    DeadlineExceeded,
}

/// Caller-supplied bounds for one aggregation: a cancel signal and an
/// optional absolute deadline.
#[derive(Debug, Clone, Default)]
pub struct FetchContext {
    cancel: CancelToken,
    deadline: Option<Instant>,
}

impl FetchContext {
    /// Unbounded context (per-request timeouts still apply).
    pub fn new() -> Self {
        Self::default()
    }

    /// Context carrying the deadline configured for the pipeline, if any.
    pub fn from_config(config: &PipelineConfig) -> Self {
        let ctx = Self::new();
        match config.deadline {
            Some(timeout) => ctx.with_timeout(timeout),
            None => ctx,
        }
    }

    /// Use `cancel` as this context's cancellation signal.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Absolute deadline for every call made under this context.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Drive `fut` until it completes, the context is cancelled, or the
    /// deadline passes, whichever happens first. Cancellation is checked
    /// before the future is first polled, so a cancelled context never
    /// starts new work.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, Interrupted> {
        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Interrupted::Cancelled),
            _ = deadline => Err(Interrupted::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }
}
