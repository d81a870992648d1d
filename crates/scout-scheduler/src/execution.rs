//! Bounded-concurrency execution of reserved queries.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{warn, Instrument};

use scout_core::errors::SearchError;
use scout_core::models::{SearchQuery, SearchResponse};
use scout_core::traits::{CancellationToken, ISearchClient};

#[derive(Debug, Clone, Copy)]
pub struct ExecutionSettings {
    pub max_concurrent: usize,
    pub timeout: Duration,
    pub max_results: u32,
}

#[derive(Debug)]
pub enum QueryOutcome {
    Completed(SearchResponse),
    Failed(SearchError),
    /// Sent, then cut off by cancellation before a response arrived.
    Abandoned,
    /// Never sent: the cycle was cancelled or a rate limit halted it first.
    NotIssued,
}

impl QueryOutcome {
    pub fn was_issued(&self) -> bool {
        !matches!(self, Self::NotIssued)
    }
}

/// Run `queries` with at most `max_concurrent` in flight. Outcomes come back
/// in input order. Every call completes, fails, times out or is abandoned on
/// cancellation before this returns; queries still waiting for a slot when
/// the token is cancelled or the API rate-limits are not sent.
pub async fn execute(
    client: Arc<dyn ISearchClient>,
    queries: Vec<SearchQuery>,
    settings: ExecutionSettings,
    cancel: CancellationToken,
) -> Vec<QueryOutcome> {
    let count = queries.len();
    let semaphore = Arc::new(Semaphore::new(settings.max_concurrent.max(1)));
    let halted = Arc::new(AtomicBool::new(false));
    let mut tasks = JoinSet::new();

    for (index, query) in queries.into_iter().enumerate() {
        let client = Arc::clone(&client);
        let semaphore = Arc::clone(&semaphore);
        let halted = Arc::clone(&halted);
        let cancel = cancel.clone();
        let span = scout_observability::query_span!(index, query.keywords.len());

        tasks.spawn(
            async move {
                let permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return (index, QueryOutcome::NotIssued),
                    permit = semaphore.acquire_owned() => permit,
                };
                let Ok(_permit) = permit else {
                    return (index, QueryOutcome::NotIssued);
                };
                if cancel.is_cancelled() || halted.load(Ordering::Acquire) {
                    return (index, QueryOutcome::NotIssued);
                }

                let call = tokio::time::timeout(
                    settings.timeout,
                    client.search(&query, settings.max_results),
                );
                let outcome = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => QueryOutcome::Abandoned,
                    result = call => match result {
                        Ok(Ok(response)) => QueryOutcome::Completed(response),
                        Ok(Err(error)) => {
                            if error.is_rate_limited() {
                                halted.store(true, Ordering::Release);
                            }
                            QueryOutcome::Failed(error)
                        }
                        Err(_) => QueryOutcome::Failed(SearchError::Timeout {
                            elapsed: settings.timeout,
                        }),
                    },
                };
                (index, outcome)
            }
            .instrument(span),
        );
    }

    let mut outcomes: Vec<Option<QueryOutcome>> = (0..count).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => outcomes[index] = Some(outcome),
            Err(e) => warn!(error = %e, "search task aborted"),
        }
    }
    outcomes
        .into_iter()
        .map(|o| o.unwrap_or(QueryOutcome::NotIssued))
        .collect()
}
