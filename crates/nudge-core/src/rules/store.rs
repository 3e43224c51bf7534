//! Storage seams used by the evaluator
//!
//! `Database` implements all of these; tests can wrap or replace it.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{FeedbackRecord, FeedbackUpsert, ProgressUpsert, UserProgress};
use crate::Result;

use super::types::{RuleId, WeekRange, WeeklySummary};

/// Per-week expense aggregation
pub trait WeeklyAggregator: Send + Sync {
    /// Aggregate expenses dated inside `week`. Amounts strictly below
    /// `small_limit` count as small purchases.
    fn weekly_summary(&self, user_id: i64, week: WeekRange, small_limit: f64)
        -> Result<WeeklySummary>;

    /// Latest `updated_at` of any transaction dated inside `week`
    fn last_transaction_update(&self, user_id: i64, week: WeekRange)
        -> Result<Option<DateTime<Utc>>>;
}

/// Durable weekly progress rows, one per (user, week_start)
pub trait ProgressHistoryStore: Send + Sync {
    /// Most recent weeks, newest first
    fn recent_progress(&self, user_id: i64, limit: usize) -> Result<Vec<UserProgress>>;

    /// Most recent weeks strictly before `week_start`, newest first
    fn recent_progress_before(
        &self,
        user_id: i64,
        week_start: NaiveDate,
        limit: usize,
    ) -> Result<Vec<UserProgress>>;

    fn progress_for_week(&self, user_id: i64, week_start: NaiveDate)
        -> Result<Option<UserProgress>>;

    /// Insert or update, always advancing `updated_at`
    fn upsert_progress(&self, progress: &ProgressUpsert) -> Result<UserProgress>;
}

/// Durable feedback rows, one per (user, week_start, rule, category)
pub trait FeedbackHistoryStore: Send + Sync {
    fn feedback_for_week(&self, user_id: i64, week_start: NaiveDate)
        -> Result<Vec<FeedbackRecord>>;

    /// Feedback for one rule (and category) from weeks before `before`,
    /// newest first
    fn recent_feedback_for_rule(
        &self,
        user_id: i64,
        rule: RuleId,
        category: Option<&str>,
        before: NaiveDate,
        limit: usize,
    ) -> Result<Vec<FeedbackRecord>>;

    /// Insert or update, keeping `displayed` and `user_acknowledged`
    fn upsert_feedback(&self, feedback: &FeedbackUpsert) -> Result<FeedbackRecord>;
}

/// Everything an evaluation reads and writes
pub trait EvaluationStore: WeeklyAggregator + ProgressHistoryStore + FeedbackHistoryStore {
    /// Write the progress row and all feedback rows atomically.
    ///
    /// On error nothing is persisted.
    fn commit_evaluation(
        &self,
        progress: &ProgressUpsert,
        feedback: &[FeedbackUpsert],
    ) -> Result<(UserProgress, Vec<FeedbackRecord>)>;
}
