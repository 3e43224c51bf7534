//! Feedback history operations

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{
    date_column, enum_column, format_datetime, json_column, now, parse_datetime, touch, Database,
};
use crate::error::{Error, Result};
use crate::models::{FeedbackPage, FeedbackRecord, FeedbackUpsert};
use crate::rules::RuleId;

const FEEDBACK_COLUMNS: &str = r#"
    id, user_id, week_start, week_end, rule_id, category_name, template_id, level,
    explanation, suggestion, data, displayed, user_acknowledged, created_at, updated_at
"#;

/// Largest page the listing accepts
pub const MAX_PER_PAGE: i64 = 100;

fn row_to_feedback(row: &Row<'_>) -> rusqlite::Result<FeedbackRecord> {
    let created_at: String = row.get(13)?;
    let updated_at: String = row.get(14)?;
    Ok(FeedbackRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        week_start: date_column(row, 2)?,
        week_end: date_column(row, 3)?,
        rule_id: enum_column(row, 4)?,
        category_name: row.get(5)?,
        template_id: row.get(6)?,
        level: enum_column(row, 7)?,
        explanation: row.get(8)?,
        suggestion: row.get(9)?,
        data: json_column(row, 10)?,
        displayed: row.get(11)?,
        user_acknowledged: row.get(12)?,
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}

fn select_by_key(
    conn: &Connection,
    user_id: i64,
    week_start: &str,
    rule_id: RuleId,
    category: Option<&str>,
) -> Result<Option<FeedbackRecord>> {
    let sql = format!(
        "SELECT {} FROM feedback_history \
         WHERE user_id = ? AND week_start = ? AND rule_id = ? AND category_name IS ?",
        FEEDBACK_COLUMNS
    );
    let record = conn
        .query_row(
            &sql,
            params![user_id, week_start, rule_id.as_str(), category],
            row_to_feedback,
        )
        .optional()?;
    Ok(record)
}

/// Upsert on an existing connection (or open transaction)
///
/// Keeps `displayed` and `user_acknowledged`; `updated_at` always advances.
pub(super) fn upsert_feedback_on(conn: &Connection, fb: &FeedbackUpsert) -> Result<FeedbackRecord> {
    let week_start = fb.week.start.to_string();
    let category = fb.category_name.as_deref();
    let data_json = serde_json::to_string(&fb.data)?;

    let existing = select_by_key(conn, fb.user_id, &week_start, fb.rule_id, category)?;
    let ts = format_datetime(touch(existing.as_ref().map(|r| r.updated_at)));

    match existing {
        Some(record) => {
            conn.execute(
                r#"
                UPDATE feedback_history
                SET week_end = ?, template_id = ?, level = ?, explanation = ?,
                    suggestion = ?, data = ?, updated_at = ?
                WHERE id = ?
                "#,
                params![
                    fb.week.end.to_string(),
                    fb.template_id,
                    fb.level.as_str(),
                    fb.explanation,
                    fb.suggestion,
                    data_json,
                    ts,
                    record.id,
                ],
            )?;
        }
        None => {
            conn.execute(
                r#"
                INSERT INTO feedback_history (
                    user_id, week_start, week_end, rule_id, category_name, template_id,
                    level, explanation, suggestion, data, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
                params![
                    fb.user_id,
                    week_start,
                    fb.week.end.to_string(),
                    fb.rule_id.as_str(),
                    category,
                    fb.template_id,
                    fb.level.as_str(),
                    fb.explanation,
                    fb.suggestion,
                    data_json,
                    ts,
                    ts,
                ],
            )?;
        }
    }

    select_by_key(conn, fb.user_id, &week_start, fb.rule_id, category)?.ok_or_else(|| {
        Error::NotFound(format!(
            "Feedback for user {} week {} rule {}",
            fb.user_id, fb.week.start, fb.rule_id
        ))
    })
}

impl Database {
    /// Insert or update one feedback row
    pub fn upsert_feedback(&self, feedback: &FeedbackUpsert) -> Result<FeedbackRecord> {
        let conn = self.conn()?;
        upsert_feedback_on(&conn, feedback)
    }

    /// All feedback generated for one week
    pub fn feedback_for_week(&self, user_id: i64, week_start: NaiveDate) -> Result<Vec<FeedbackRecord>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM feedback_history WHERE user_id = ? AND week_start = ? ORDER BY id",
            FEEDBACK_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![user_id, week_start.to_string()], row_to_feedback)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Earlier feedback for one rule (and category), newest week first
    pub fn recent_feedback_for_rule(
        &self,
        user_id: i64,
        rule: RuleId,
        category: Option<&str>,
        before: NaiveDate,
        limit: usize,
    ) -> Result<Vec<FeedbackRecord>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM feedback_history \
             WHERE user_id = ? AND rule_id = ? AND category_name IS ? AND week_start < ? \
             ORDER BY week_start DESC LIMIT ?",
            FEEDBACK_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(
                params![
                    user_id,
                    rule.as_str(),
                    category,
                    before.to_string(),
                    limit as i64
                ],
                row_to_feedback,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Get one of a user's feedback rows
    pub fn get_feedback(&self, user_id: i64, id: i64) -> Result<Option<FeedbackRecord>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM feedback_history WHERE user_id = ? AND id = ?",
            FEEDBACK_COLUMNS
        );
        let record = conn
            .query_row(&sql, params![user_id, id], row_to_feedback)
            .optional()?;
        Ok(record)
    }

    /// Page through a user's feedback, newest week first
    ///
    /// `page` is 1-based; `per_page` is clamped to 1..=100. Pages past the
    /// end come back empty.
    pub fn list_feedback(&self, user_id: i64, page: i64, per_page: i64) -> Result<FeedbackPage> {
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        // Keeps the OFFSET below within i64
        let page = page.clamp(1, i64::MAX / per_page);
        let conn = self.conn()?;

        let total: i64 = conn.query_row(
            "SELECT COUNT(*) FROM feedback_history WHERE user_id = ?",
            params![user_id],
            |row| row.get(0),
        )?;

        let sql = format!(
            "SELECT {} FROM feedback_history WHERE user_id = ? \
             ORDER BY week_start DESC, id ASC LIMIT ? OFFSET ?",
            FEEDBACK_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(
                params![user_id, per_page, (page - 1) * per_page],
                row_to_feedback,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(FeedbackPage {
            items,
            current_page: page,
            last_page: ((total + per_page - 1) / per_page).max(1),
            per_page,
            total,
        })
    }

    /// Mark feedback as acknowledged by the user
    pub fn acknowledge_feedback(&self, user_id: i64, id: i64) -> Result<FeedbackRecord> {
        self.set_feedback_flag(user_id, id, "user_acknowledged")
    }

    /// Mark feedback as shown to the user
    pub fn mark_feedback_displayed(&self, user_id: i64, id: i64) -> Result<FeedbackRecord> {
        self.set_feedback_flag(user_id, id, "displayed")
    }

    fn set_feedback_flag(&self, user_id: i64, id: i64, column: &'static str) -> Result<FeedbackRecord> {
        let conn = self.conn()?;
        let sql = format!(
            "UPDATE feedback_history SET {} = 1, updated_at = ? WHERE user_id = ? AND id = ?",
            column
        );
        let updated = conn.execute(&sql, params![format_datetime(now()), user_id, id])?;

        if updated == 0 {
            return Err(Error::NotFound(format!("Feedback {}", id)));
        }

        tracing::debug!(user_id, feedback_id = id, flag = column, "Feedback updated");
        self.get_feedback(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("Feedback {}", id)))
    }
}
