//! The fifteen ranked analyses.
//!
//! Each analysis declares the postings it reads, the table it writes, and a
//! pure `compute` step from normalized postings to ranked rows. Fetching,
//! related-posting enrichment and storage are done by the caller.

pub mod compensation;
pub mod demand;
pub mod employers;
pub mod registry;
pub mod skills;
pub mod workforce;

use chrono::{Duration, NaiveDate, Utc};

use crate::config::AnalysisSettings;
use crate::domain::{PostingQuery, RankedResult, ResultTable};
use crate::error::Result;
use crate::pipeline::processing::normalize::NormalizedPosting;

pub use registry::AnalysisRegistry;

/// Reference date and window sizes for time-windowed analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisContext {
    pub as_of: NaiveDate,
    pub recent_window_days: i64,
    pub history_window_days: i64,
}

impl AnalysisContext {
    pub fn new(as_of: NaiveDate) -> Self {
        Self::with_settings(as_of, &AnalysisSettings::default())
    }

    pub fn with_settings(as_of: NaiveDate, settings: &AnalysisSettings) -> Self {
        Self {
            as_of,
            recent_window_days: settings.recent_window_days,
            history_window_days: settings.history_window_days,
        }
    }

    /// Context anchored at today's UTC date.
    pub fn today(settings: &AnalysisSettings) -> Self {
        Self::with_settings(Utc::now().date_naive(), settings)
    }

    /// First day of the recent window.
    pub fn recent_start(&self) -> NaiveDate {
        self.as_of - Duration::days(self.recent_window_days)
    }

    /// First day of the comparison history.
    pub fn history_start(&self) -> NaiveDate {
        self.as_of - Duration::days(self.history_window_days)
    }

    /// Which side of the recent boundary a posting falls on; `None` when undated.
    pub fn window_of(&self, posting: &NormalizedPosting) -> Option<Window> {
        let created = posting.raw.created_date()?;
        if created >= self.recent_start() {
            Some(Window::Recent)
        } else {
            Some(Window::Older)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Recent,
    Older,
}

/// A named, ranked aggregation over normalized postings.
pub trait Analysis: Send + Sync {
    /// Output table description; its `analysis` field is the registry name.
    fn table(&self) -> &'static ResultTable;

    fn name(&self) -> &'static str {
        self.table().analysis
    }

    /// Postings this analysis reads.
    fn query(&self, ctx: &AnalysisContext) -> PostingQuery;

    /// Group, filter by minimum support and rank. Rows carry their related
    /// query but no related postings yet.
    fn compute(&self, postings: &[NormalizedPosting], ctx: &AnalysisContext) -> Result<Vec<RankedResult>>;
}

/// Lowercased text before the first `/` of a group label, used to look up
/// postings with a similar title.
pub(crate) fn title_stem(label: &str) -> String {
    label.split('/').next().unwrap_or(label).trim().to_lowercase()
}

/// Lowercased first word of a group label.
pub(crate) fn first_word(label: &str) -> String {
    label.split_whitespace().next().unwrap_or("").to_lowercase()
}
