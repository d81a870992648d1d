//! Structured log events for key operations.
//!
//! Each function emits a `tracing` event with an `event` field naming it,
//! so log pipelines can filter without parsing messages.

use scout_core::models::{CycleReport, Outcome, QuotaUsage, SkipReason};

/// Summary of a finished cycle.
pub fn cycle_completed(report: &CycleReport) {
    tracing::info!(
        event = "cycle_completed",
        cycle_id = %report.cycle_id,
        status = ?report.status,
        searched = report.searched.len(),
        skipped = report.skipped.len(),
        queries = report.queries_issued,
        credits_spent = report.credits_spent,
        items_found = report.items_found,
        new_items = report.new_items,
        errors = report.errors.len(),
        budget_remaining = report.budget_remaining(),
        "cycle completed"
    );
}

/// Why one keyword was left out of a cycle.
pub fn keyword_skipped(keyword: &str, reason: SkipReason, weight: f64) {
    tracing::debug!(
        event = "keyword_skipped",
        keyword = %keyword,
        reason = %reason,
        weight = weight,
        "keyword skipped"
    );
}

/// Period usage crossed the warning threshold.
pub fn quota_warning(usage: &QuotaUsage, threshold_percent: f64) {
    tracing::warn!(
        event = "quota_warning",
        used = usage.used,
        total = usage.total,
        percent = usage.percent,
        threshold = threshold_percent,
        projected_exhaustion = ?usage.projected_exhaustion_date,
        "quota usage above warning threshold"
    );
}

/// A call consumed more than was reserved for it.
pub fn quota_overage(reserved: u64, actual: u64, applied: u64) {
    tracing::warn!(
        event = "quota_overage",
        reserved = reserved,
        actual = actual,
        applied = applied,
        "search consumed more credits than reserved"
    );
}

/// A feedback event moved keyword weights.
pub fn feedback_applied(event_id: &str, outcome: Outcome, keywords: usize, tier_changes: usize) {
    tracing::info!(
        event = "feedback_applied",
        event_id = %event_id,
        outcome = %outcome,
        keywords = keywords,
        tier_changes = tier_changes,
        "feedback applied"
    );
}

/// Cache sweep finished.
pub fn cache_swept(purged: usize, remaining: usize, search_log_pruned: usize) {
    tracing::info!(
        event = "cache_swept",
        purged = purged,
        remaining = remaining,
        search_log_pruned = search_log_pruned,
        "cache swept"
    );
}

/// Persisted rows were unreadable and left out of a load.
pub fn corrupt_record_skipped(source: &str, count: usize) {
    tracing::warn!(
        event = "corrupt_record_skipped",
        source = %source,
        count = count,
        "corrupt persisted records skipped"
    );
}

/// A search call failed.
pub fn search_failed(code: &str, message: &str, keywords: &[String], credits_charged: u64) {
    tracing::warn!(
        event = "search_failed",
        code = %code,
        error = %message,
        keywords = ?keywords,
        credits_charged = credits_charged,
        "search failed"
    );
}
