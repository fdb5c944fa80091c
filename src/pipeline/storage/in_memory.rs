use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::app::ports::{PostingSourcePort, RelatedPostingsPort, ResultSinkPort};
use crate::domain::{PostingQuery, PostingSummary, RankedResult, RawPosting, RelatedQuery, ResultTable};
use crate::error::Result;
use crate::pipeline::processing::related::select_related;

/// In-memory posting and result store for development/testing
pub struct InMemoryStore {
    complete: Arc<Mutex<Vec<RawPosting>>>,
    latest: Arc<Mutex<Vec<RawPosting>>>,
    results: Arc<Mutex<HashMap<&'static str, Vec<RankedResult>>>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            complete: Arc::new(Mutex::new(Vec::new())),
            latest: Arc::new(Mutex::new(Vec::new())),
            results: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Store whose open postings are the complete history
    pub fn with_postings(postings: Vec<RawPosting>) -> Self {
        Self {
            latest: Arc::new(Mutex::new(postings.clone())),
            complete: Arc::new(Mutex::new(postings)),
            results: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn add_complete(&self, postings: impl IntoIterator<Item = RawPosting>) {
        let mut complete = self.complete.lock().await;
        complete.extend(postings);
        debug!("Complete postings now {}", complete.len());
    }

    pub async fn add_latest(&self, postings: impl IntoIterator<Item = RawPosting>) {
        let mut latest = self.latest.lock().await;
        latest.extend(postings);
        debug!("Open postings now {}", latest.len());
    }

    /// Stored rows of a result table, if it was ever written
    pub async fn results(&self, table: &str) -> Option<Vec<RankedResult>> {
        self.results.lock().await.get(table).cloned()
    }
}

#[async_trait]
impl PostingSourcePort for InMemoryStore {
    async fn fetch(&self, query: &PostingQuery) -> Result<Vec<RawPosting>> {
        let complete = self.complete.lock().await;
        Ok(complete.iter().filter(|p| query.matches(p)).cloned().collect())
    }
}

#[async_trait]
impl RelatedPostingsPort for InMemoryStore {
    async fn find_related(&self, query: &RelatedQuery, limit: usize) -> Result<Vec<PostingSummary>> {
        let latest = self.latest.lock().await;
        Ok(select_related(latest.iter(), query, limit))
    }
}

#[async_trait]
impl ResultSinkPort for InMemoryStore {
    async fn replace_all(&self, table: &ResultTable, rows: &[RankedResult]) -> Result<usize> {
        let replacement = rows.to_vec();
        let mut results = self.results.lock().await;
        results.insert(table.table, replacement);
        debug!("Replaced {} with {} rows", table.table, rows.len());
        Ok(rows.len())
    }
}
