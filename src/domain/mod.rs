//! Domain data shapes shared across layers: raw postings, the queries used to
//! select them, and the ranked rows analyses produce.

pub mod posting;
pub mod query;
pub mod result;

pub use posting::{PostingField, RawPosting};
pub use query::{Condition, PostingQuery, RelatedFilter, RelatedOrder, RelatedQuery};
pub use result::{Column, ColumnKind, FieldValue, PostingSummary, RankedResult, ResultTable};
