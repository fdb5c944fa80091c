// Analytics pipeline: processing, analyses and storage

pub mod analyses;
pub mod ingestion;
pub mod processing;
pub mod storage;

pub use analyses::{Analysis, AnalysisContext, AnalysisRegistry};
pub use processing::normalize::{DefaultNormalizer, NormalizedPosting, Normalizer};
