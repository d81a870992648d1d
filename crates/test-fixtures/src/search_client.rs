//! In-process stand-in for the search API.
//!
//! Every keyword in a query yields a fixed number of items whose text
//! contains the keyword, so keyword attribution is exercised for real.
//! Failures can be scripted for the next call or for any query carrying a
//! given keyword. All calls are recorded.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use scout_core::errors::SearchError;
use scout_core::models::{SearchItem, SearchQuery, SearchResponse};
use scout_core::traits::ISearchClient;

#[derive(Debug, Default)]
struct FakeState {
    calls: Vec<SearchQuery>,
    next_failures: VecDeque<SearchError>,
    keyword_failures: HashMap<String, SearchError>,
    /// Items every query returns regardless of keywords.
    shared_items: Vec<SearchItem>,
}

pub struct FakeSearchClient {
    state: Mutex<FakeState>,
    items_per_keyword: usize,
    credits_per_call: u64,
    latency: Option<Duration>,
}

impl Default for FakeSearchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeSearchClient {
    /// Two items per keyword, one credit per call, no latency.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState::default()),
            items_per_keyword: 2,
            credits_per_call: 1,
            latency: None,
        }
    }

    pub fn with_items_per_keyword(mut self, n: usize) -> Self {
        self.items_per_keyword = n;
        self
    }

    pub fn with_credits_per_call(mut self, credits: u64) -> Self {
        self.credits_per_call = credits;
        self
    }

    /// Sleep this long inside every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Append an item to every response.
    pub fn with_shared_item(self, id: &str, text: &str) -> Self {
        self.lock().shared_items.push(item(id, text));
        self
    }

    /// Fail the next call with `error`. Queued failures are used in order.
    pub fn fail_next(&self, error: SearchError) {
        self.lock().next_failures.push_back(error);
    }

    /// Fail every call whose query carries `keyword`.
    pub fn fail_on_keyword(&self, keyword: &str, error: SearchError) {
        self.lock()
            .keyword_failures
            .insert(keyword.to_string(), error);
    }

    pub fn calls(&self) -> Vec<SearchQuery> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Every keyword sent to the API, in call order.
    pub fn searched_keywords(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .flat_map(|q| q.keywords.iter().cloned())
            .collect()
    }

    pub fn reset_calls(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ISearchClient for FakeSearchClient {
    async fn search(
        &self,
        query: &SearchQuery,
        max_results: u32,
    ) -> Result<SearchResponse, SearchError> {
        let scripted = {
            let mut state = self.lock();
            state.calls.push(query.clone());
            let next = state.next_failures.pop_front();
            next.or_else(|| {
                query
                    .keywords
                    .iter()
                    .find_map(|k| state.keyword_failures.get(k).cloned())
            })
        };

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(error) = scripted {
            return Err(error);
        }

        let shared = self.lock().shared_items.clone();
        let mut items: Vec<SearchItem> = query
            .keywords
            .iter()
            .flat_map(|keyword| {
                (0..self.items_per_keyword)
                    .map(move |n| item(&format!("{keyword}#{n}"), &format!("post about {keyword}")))
            })
            .chain(shared)
            .collect();
        items.truncate(max_results as usize);

        Ok(SearchResponse {
            items,
            credits_used: self.credits_per_call,
        })
    }
}

fn item(id: &str, text: &str) -> SearchItem {
    SearchItem {
        id: id.to_string(),
        text: text.to_string(),
        author_id: Some("fixture".to_string()),
        created_at: None,
        payload: json!({ "id": id, "text": text }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(keywords: &[&str]) -> SearchQuery {
        SearchQuery {
            text: keywords.join(" OR "),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn items_mention_their_keyword() {
        let client = FakeSearchClient::new();
        let response = client.search(&query(&["a", "b"]), 100).await.unwrap();
        assert_eq!(response.items.len(), 4);
        assert_eq!(response.credits_used, 1);
        assert!(response.items[0].text.contains('a'));
        assert_eq!(client.searched_keywords(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn scripted_failures_fire_in_order() {
        let client = FakeSearchClient::new();
        client.fail_next(SearchError::Timeout {
            elapsed: Duration::from_secs(1),
        });
        assert!(client.search(&query(&["a"]), 10).await.is_err());
        assert!(client.search(&query(&["a"]), 10).await.is_ok());

        client.fail_on_keyword(
            "b",
            SearchError::Network {
                reason: "down".into(),
                credits_charged: 0,
            },
        );
        assert!(client.search(&query(&["a", "b"]), 10).await.is_err());
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn max_results_truncates() {
        let client = FakeSearchClient::new().with_items_per_keyword(5);
        let response = client.search(&query(&["a"]), 3).await.unwrap();
        assert_eq!(response.items.len(), 3);
    }
}
