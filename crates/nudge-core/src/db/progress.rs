//! Weekly progress operations

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{date_column, format_datetime, json_column, parse_datetime, touch, Database};
use crate::error::{Error, Result};
use crate::models::{ProgressUpsert, UserProgress};

const PROGRESS_COLUMNS: &str = r#"
    id, user_id, week_start, week_end, rules_triggered, rules_not_triggered,
    improvement_score, triggered_outcomes, created_at, updated_at
"#;

fn row_to_progress(row: &Row<'_>) -> rusqlite::Result<UserProgress> {
    let created_at: String = row.get(8)?;
    let updated_at: String = row.get(9)?;
    Ok(UserProgress {
        id: row.get(0)?,
        user_id: row.get(1)?,
        week_start: date_column(row, 2)?,
        week_end: date_column(row, 3)?,
        rules_triggered: json_column(row, 4)?,
        rules_not_triggered: json_column(row, 5)?,
        improvement_score: row.get(6)?,
        triggered_outcomes: json_column(row, 7)?,
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}

fn select_progress(conn: &Connection, user_id: i64, week_start: NaiveDate) -> Result<Option<UserProgress>> {
    let sql = format!(
        "SELECT {} FROM user_progress WHERE user_id = ? AND week_start = ?",
        PROGRESS_COLUMNS
    );
    let progress = conn
        .query_row(&sql, params![user_id, week_start.to_string()], row_to_progress)
        .optional()?;
    Ok(progress)
}

/// Upsert on an existing connection (or open transaction)
///
/// `updated_at` always advances, even when nothing else changed.
pub(super) fn upsert_progress_on(conn: &Connection, progress: &ProgressUpsert) -> Result<UserProgress> {
    let week_start = progress.week.start.to_string();
    let rules_triggered = serde_json::to_string(&progress.rules_triggered)?;
    let rules_not_triggered = serde_json::to_string(&progress.rules_not_triggered())?;
    let outcomes = serde_json::to_string(&progress.triggered_outcomes)?;

    let existing = select_progress(conn, progress.user_id, progress.week.start)?;
    let ts = format_datetime(touch(existing.as_ref().map(|p| p.updated_at)));

    if existing.is_some() {
        conn.execute(
            r#"
            UPDATE user_progress
            SET week_end = ?, rules_triggered = ?, rules_not_triggered = ?,
                improvement_score = ?, triggered_outcomes = ?, updated_at = ?
            WHERE user_id = ? AND week_start = ?
            "#,
            params![
                progress.week.end.to_string(),
                rules_triggered,
                rules_not_triggered,
                progress.improvement_score,
                outcomes,
                ts,
                progress.user_id,
                week_start,
            ],
        )?;
    } else {
        conn.execute(
            r#"
            INSERT INTO user_progress (
                user_id, week_start, week_end, rules_triggered, rules_not_triggered,
                improvement_score, triggered_outcomes, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                progress.user_id,
                week_start,
                progress.week.end.to_string(),
                rules_triggered,
                rules_not_triggered,
                progress.improvement_score,
                outcomes,
                ts,
                ts,
            ],
        )?;
    }

    select_progress(conn, progress.user_id, progress.week.start)?.ok_or_else(|| {
        Error::NotFound(format!(
            "Progress for user {} week {}",
            progress.user_id, progress.week.start
        ))
    })
}

impl Database {
    /// Progress row for one week
    pub fn progress_for_week(&self, user_id: i64, week_start: NaiveDate) -> Result<Option<UserProgress>> {
        let conn = self.conn()?;
        select_progress(&conn, user_id, week_start)
    }

    /// Most recent progress rows, newest week first
    pub fn recent_progress(&self, user_id: i64, limit: usize) -> Result<Vec<UserProgress>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM user_progress WHERE user_id = ? ORDER BY week_start DESC LIMIT ?",
            PROGRESS_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![user_id, limit as i64], row_to_progress)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Most recent progress rows for weeks before `week_start`, newest first
    pub fn recent_progress_before(
        &self,
        user_id: i64,
        week_start: NaiveDate,
        limit: usize,
    ) -> Result<Vec<UserProgress>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM user_progress WHERE user_id = ? AND week_start < ? \
             ORDER BY week_start DESC LIMIT ?",
            PROGRESS_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(
                params![user_id, week_start.to_string(), limit as i64],
                row_to_progress,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Insert or update the progress row for a week
    pub fn upsert_progress(&self, progress: &ProgressUpsert) -> Result<UserProgress> {
        let conn = self.conn()?;
        upsert_progress_on(&conn, progress)
    }
}
