// Pipeline processing: normalization, grouping and related-posting selection

pub mod aggregate;
pub mod normalize;
pub mod related;
