//! Span definitions per operation: cycle, query, learning, sweep.

/// Create a scheduler cycle span.
#[macro_export]
macro_rules! cycle_span {
    ($cycle_id:expr, $keyword_count:expr) => {
        tracing::info_span!("scout.cycle", cycle_id = %$cycle_id, keyword_count = $keyword_count)
    };
}

/// Create a span around one search API call.
#[macro_export]
macro_rules! query_span {
    ($query_index:expr, $keyword_count:expr) => {
        tracing::debug_span!("scout.query", query_index = $query_index, keyword_count = $keyword_count)
    };
}

/// Create a feedback learning span.
#[macro_export]
macro_rules! learning_span {
    ($event_id:expr, $outcome:expr) => {
        tracing::info_span!("scout.learning", event_id = %$event_id, outcome = %$outcome)
    };
}

/// Create a cache sweep span.
#[macro_export]
macro_rules! sweep_span {
    ($item_count:expr) => {
        tracing::info_span!("scout.sweep", item_count = $item_count)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const CYCLE: &str = "scout.cycle";
    pub const QUERY: &str = "scout.query";
    pub const LEARNING: &str = "scout.learning";
    pub const SWEEP: &str = "scout.sweep";
}
