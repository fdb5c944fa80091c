// Pipeline ingestion: reading posting exports into raw postings

pub mod posting_file;

pub use posting_file::{parse_postings, read_postings};
