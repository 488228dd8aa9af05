//! Comment aggregation pipeline for Navi.
//!
//! Ties the regulations.gov client together into end-to-end workflows:
//! document lookup, comment listing, bounded detail fan-out, and the
//! post-fetch summaries built on top of a batch.

pub mod aggregator;
pub mod context;
pub mod docket;
pub mod stakeholders;

pub use aggregator::{CommentAggregator, CommentBatch, ProgressReporter, SilentProgress};
pub use context::{CancelToken, FetchContext, Interrupted};
pub use docket::derive_docket_id;
pub use stakeholders::StakeholderTally;
