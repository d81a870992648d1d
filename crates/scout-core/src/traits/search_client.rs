use async_trait::async_trait;

use crate::errors::SearchError;
use crate::models::{SearchQuery, SearchResponse};

/// The external search API.
///
/// Implementations perform the network call and report the credits the call
/// actually consumed. They never retry: rate-limit rejections surface as
/// `SearchError::RateLimited` and the caller decides retry timing.
#[async_trait]
pub trait ISearchClient: Send + Sync {
    async fn search(
        &self,
        query: &SearchQuery,
        max_results: u32,
    ) -> Result<SearchResponse, SearchError>;
}
