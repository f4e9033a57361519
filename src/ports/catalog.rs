//! Catalog Port
//!
//! Remote catalog contract consumed by the pipeline: token discovery per
//! partition, metric snapshots, and analysis submission.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{AnalysisResult, CatalogItem, MarketTab, Snapshot, SubmissionAck};

/// Catalog error taxonomy. Every variant is non-fatal to a session:
/// discovery errors abort one partition pass, fetch and submission errors
/// affect a single token.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Discovery failed for tab '{tab}': {reason}")]
    Discovery { tab: MarketTab, reason: String },

    #[error("Snapshot fetch failed for {mint}: {reason}")]
    Fetch { mint: String, reason: String },

    #[error("Submission failed for {mint}: {reason}")]
    Submission { mint: String, reason: String },
}

#[async_trait]
pub trait CatalogPort: Send + Sync {
    /// Discover up to `limit` tokens in `tab`, in catalog order
    async fn discover(&self, tab: MarketTab, limit: usize) -> Result<Vec<CatalogItem>, CatalogError>;

    /// Fetch the current metric snapshot for a token
    async fn fetch_snapshot(&self, mint: &str) -> Result<Snapshot, CatalogError>;

    /// Submit an analysis. A response the server declines is `Ok` with
    /// `accepted == false`, not an error.
    async fn submit(
        &self,
        item: &CatalogItem,
        snapshot: &Snapshot,
        analysis: &AnalysisResult,
    ) -> Result<SubmissionAck, CatalogError>;
}
