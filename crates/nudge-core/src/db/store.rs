//! Evaluator storage traits backed by SQLite

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::TransactionBehavior;

use super::feedback::upsert_feedback_on;
use super::progress::upsert_progress_on;
use super::Database;
use crate::error::Result;
use crate::models::{FeedbackRecord, FeedbackUpsert, ProgressUpsert, UserProgress};
use crate::rules::{
    EvaluationStore, FeedbackHistoryStore, ProgressHistoryStore, RuleId, WeekRange,
    WeeklyAggregator, WeeklySummary,
};

impl WeeklyAggregator for Database {
    fn weekly_summary(&self, user_id: i64, week: WeekRange, small_limit: f64) -> Result<WeeklySummary> {
        Database::weekly_summary(self, user_id, week, small_limit)
    }

    fn last_transaction_update(&self, user_id: i64, week: WeekRange) -> Result<Option<DateTime<Utc>>> {
        Database::last_transaction_update(self, user_id, week)
    }
}

impl ProgressHistoryStore for Database {
    fn recent_progress(&self, user_id: i64, limit: usize) -> Result<Vec<UserProgress>> {
        Database::recent_progress(self, user_id, limit)
    }

    fn recent_progress_before(
        &self,
        user_id: i64,
        week_start: NaiveDate,
        limit: usize,
    ) -> Result<Vec<UserProgress>> {
        Database::recent_progress_before(self, user_id, week_start, limit)
    }

    fn progress_for_week(&self, user_id: i64, week_start: NaiveDate) -> Result<Option<UserProgress>> {
        Database::progress_for_week(self, user_id, week_start)
    }

    fn upsert_progress(&self, progress: &ProgressUpsert) -> Result<UserProgress> {
        Database::upsert_progress(self, progress)
    }
}

impl FeedbackHistoryStore for Database {
    fn feedback_for_week(&self, user_id: i64, week_start: NaiveDate) -> Result<Vec<FeedbackRecord>> {
        Database::feedback_for_week(self, user_id, week_start)
    }

    fn recent_feedback_for_rule(
        &self,
        user_id: i64,
        rule: RuleId,
        category: Option<&str>,
        before: NaiveDate,
        limit: usize,
    ) -> Result<Vec<FeedbackRecord>> {
        Database::recent_feedback_for_rule(self, user_id, rule, category, before, limit)
    }

    fn upsert_feedback(&self, feedback: &FeedbackUpsert) -> Result<FeedbackRecord> {
        Database::upsert_feedback(self, feedback)
    }
}

impl EvaluationStore for Database {
    fn commit_evaluation(
        &self,
        progress: &ProgressUpsert,
        feedback: &[FeedbackUpsert],
    ) -> Result<(UserProgress, Vec<FeedbackRecord>)> {
        let mut conn = self.conn()?;
        // Take the write lock up front; a deferred transaction that reads
        // first cannot be upgraded once another writer has committed
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        // Dropping `tx` on an early return rolls everything back
        let records = feedback
            .iter()
            .map(|fb| upsert_feedback_on(&tx, fb))
            .collect::<Result<Vec<_>>>()?;
        let progress = upsert_progress_on(&tx, progress)?;

        tx.commit()?;
        Ok((progress, records))
    }
}
