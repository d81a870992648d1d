use std::time::Duration;

use scout_core::errors::error_code;
use scout_core::errors::*;

#[test]
fn keyword_too_long_carries_values() {
    let err = QueryError::KeywordTooLong {
        keyword: "abc".into(),
        length: 600,
        ceiling: 512,
    };
    let msg = err.to_string();
    assert!(msg.contains("abc"));
    assert!(msg.contains("600"));
    assert!(msg.contains("512"));
}

#[test]
fn quota_exceeded_carries_values() {
    let err = QuotaError::QuotaExceeded {
        requested: 5,
        available: 2,
        total: 100,
    };
    let msg = err.to_string();
    assert!(msg.contains('5'));
    assert!(msg.contains('2'));
}

#[test]
fn search_error_reports_charged_credits() {
    let err = SearchError::RateLimited {
        retry_after: Some(Duration::from_secs(60)),
        observed_used: Some(900),
        credits_charged: 1,
    };
    assert_eq!(err.credits_charged(), 1);
    assert!(err.is_rate_limited());
    assert_eq!(
        SearchError::Timeout {
            elapsed: Duration::from_secs(30)
        }
        .credits_charged(),
        0
    );
}

// --- From impls ---

#[test]
fn subsystem_errors_convert_to_scout_error() {
    let e: ScoutError = QueryError::NoKeywords.into();
    assert!(matches!(e, ScoutError::QueryError(_)));

    let e: ScoutError = StorageError::SqliteError {
        message: "disk full".into(),
    }
    .into();
    assert!(matches!(e, ScoutError::StorageError(_)));

    let e: ScoutError = SchedulerError::CycleInProgress.into();
    assert!(matches!(e, ScoutError::SchedulerError(_)));

    let json_err = serde_json::from_str::<String>("not valid json").unwrap_err();
    let e: ScoutError = json_err.into();
    assert!(matches!(e, ScoutError::SerializationError(_)));
}

// --- Error codes ---

#[test]
fn error_codes_are_stable() {
    let e: ScoutError = QueryError::FilterConflict {
        first: "exclude_replies".into(),
        second: "only_replies".into(),
    }
    .into();
    assert_eq!(e.error_code(), error_code::FILTER_CONFLICT);

    let e: ScoutError = StorageError::CorruptionDetected {
        table: "cached_items".into(),
        key: "1".into(),
        details: "bad json".into(),
    }
    .into();
    assert_eq!(e.error_code(), error_code::CACHE_CORRUPTION);

    let e = SearchError::Network {
        reason: "reset".into(),
        credits_charged: 0,
    };
    assert_eq!(e.error_code(), error_code::SEARCH_API_ERROR);
}
