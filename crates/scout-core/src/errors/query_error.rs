/// Query builder errors. Raised before any credit is spent.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("conflicting filters: {first} and {second}")]
    FilterConflict { first: String, second: String },

    #[error("keyword '{keyword}' needs {length} characters, ceiling is {ceiling}")]
    KeywordTooLong {
        keyword: String,
        length: usize,
        ceiling: usize,
    },

    #[error("invalid filter {filter}: {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("empty keyword")]
    EmptyKeyword,

    #[error("no keywords to build a query from")]
    NoKeywords,
}
