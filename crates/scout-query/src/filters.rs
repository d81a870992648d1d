//! Filter validation and clause rendering.

use chrono::{DateTime, Duration, Utc};

use scout_core::errors::QueryError;
use scout_core::models::SearchFilters;

/// Timestamp format of the `since:` operator.
const SINCE_FORMAT: &str = "%Y-%m-%d_%H:%M:%S_UTC";

/// Reject contradictory or malformed filters.
pub fn validate(filters: &SearchFilters) -> Result<(), QueryError> {
    let conflict = |first: &str, second: &str| QueryError::FilterConflict {
        first: first.to_string(),
        second: second.to_string(),
    };

    if filters.exclude_replies && filters.only_replies {
        return Err(conflict("exclude_replies", "only_replies"));
    }
    if filters.exclude_retweets && filters.only_retweets {
        return Err(conflict("exclude_retweets", "only_retweets"));
    }
    if filters.only_replies && filters.only_retweets {
        return Err(conflict("only_replies", "only_retweets"));
    }
    if let Some(lang) = filters.language.as_deref() {
        let lang = lang.trim();
        if !lang.is_empty()
            && !((2..=3).contains(&lang.len()) && lang.chars().all(|c| c.is_ascii_alphabetic()))
        {
            return Err(QueryError::InvalidFilter {
                filter: "language".to_string(),
                reason: format!("'{lang}' is not a 2-3 letter language code"),
            });
        }
    }
    Ok(())
}

/// Render every present, non-zero filter as a clause, in a fixed order.
///
/// `days_back` is resolved against `now` here, not when the config is loaded.
pub fn render_clauses(filters: &SearchFilters, now: DateTime<Utc>) -> Vec<String> {
    let mut clauses = Vec::new();

    if let Some(n) = filters.min_likes.filter(|n| *n > 0) {
        clauses.push(format!("min_faves:{n}"));
    }
    if let Some(n) = filters.min_retweets.filter(|n| *n > 0) {
        clauses.push(format!("min_retweets:{n}"));
    }
    if let Some(n) = filters.min_replies.filter(|n| *n > 0) {
        clauses.push(format!("min_replies:{n}"));
    }
    if filters.exclude_replies {
        clauses.push("-filter:replies".to_string());
    }
    if filters.only_replies {
        clauses.push("filter:replies".to_string());
    }
    if filters.exclude_retweets {
        clauses.push("-filter:retweets".to_string());
    }
    if filters.only_retweets {
        clauses.push("filter:retweets".to_string());
    }
    if let Some(lang) = filters.language.as_deref().map(str::trim) {
        if !lang.is_empty() {
            clauses.push(format!("lang:{}", lang.to_ascii_lowercase()));
        }
    }
    if let Some(days) = filters.days_back.filter(|d| *d > 0) {
        let since = now - Duration::days(i64::from(days));
        clauses.push(format!("since:{}", since.format(SINCE_FORMAT)));
    }

    clauses
}
