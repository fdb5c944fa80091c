use async_trait::async_trait;

use crate::domain::{PostingQuery, PostingSummary, RankedResult, RawPosting, RelatedQuery, ResultTable};
use crate::error::Result;

/// Read side of the posting store: the complete history of postings.
#[async_trait]
pub trait PostingSourcePort: Send + Sync {
    /// Every stored posting matching `query`, in storage order.
    async fn fetch(&self, query: &PostingQuery) -> Result<Vec<RawPosting>>;
}

/// Lookup of currently open postings related to a ranked row.
#[async_trait]
pub trait RelatedPostingsPort: Send + Sync {
    async fn find_related(&self, query: &RelatedQuery, limit: usize) -> Result<Vec<PostingSummary>>;
}

/// Write side for analysis results.
#[async_trait]
pub trait ResultSinkPort: Send + Sync {
    /// Replace the whole contents of `table` with `rows`. Either every row is
    /// stored or the previous contents are kept. Returns the stored row count.
    async fn replace_all(&self, table: &ResultTable, rows: &[RankedResult]) -> Result<usize>;
}
