//! Property tests: the ledger never exceeds its budget.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use scout_core::config::QuotaConfig;
use scout_quota::QuotaManager;

#[derive(Debug, Clone)]
enum Op {
    Reserve(u64),
    Commit(u64),
    Release,
    RateLimited(u64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u64..8).prop_map(Op::Reserve),
        (0u64..20).prop_map(Op::Commit),
        Just(Op::Release),
        (0u64..200).prop_map(Op::RateLimited),
    ]
}

proptest! {
    #[test]
    fn used_never_exceeds_total(total in 1u64..60, ops in prop::collection::vec(op(), 1..80)) {
        let config = QuotaConfig {
            period_credits: total,
            rate_window_max_calls: 1000,
            ..Default::default()
        };
        let start = Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap();
        let quota = QuotaManager::new(config, start);
        let mut open = Vec::new();

        for (i, op) in ops.into_iter().enumerate() {
            let now = start + Duration::seconds(i as i64);
            match op {
                Op::Reserve(c) => {
                    if let Ok(token) = quota.reserve(c, "search", now) {
                        open.push(token);
                    }
                }
                Op::Commit(actual) => {
                    if let Some(token) = open.pop() {
                        quota.commit(token, actual, now).unwrap();
                    }
                }
                Op::Release => {
                    if let Some(token) = open.pop() {
                        quota.release(token).unwrap();
                    }
                }
                Op::RateLimited(observed) => {
                    quota
                        .record_rate_limited(now, Some(std::time::Duration::ZERO), Some(observed))
                        .unwrap();
                }
            }
            let usage = quota.current_usage(now);
            prop_assert!(usage.used <= usage.total);
        }
    }
}
