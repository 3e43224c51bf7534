//! Weekly expense aggregation

use chrono::{DateTime, Utc};
use rusqlite::params;

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::rules::{WeekRange, WeeklySummary};

impl Database {
    /// Aggregate a user's expenses dated inside `week`
    ///
    /// Income is ignored. Amounts strictly below `small_limit` also count
    /// toward the small purchase figures. Uncategorized expenses count toward
    /// the totals only.
    pub fn weekly_summary(
        &self,
        user_id: i64,
        week: WeekRange,
        small_limit: f64,
    ) -> Result<WeeklySummary> {
        let conn = self.conn()?;
        let start = week.start.to_string();
        let end = week.end.to_string();

        let (total_expenses, transaction_count, small_transaction_count, small_transaction_total) =
            conn.query_row(
                r#"
                SELECT
                    COALESCE(SUM(amount), 0),
                    COUNT(*),
                    COALESCE(SUM(CASE WHEN amount < ?1 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN amount < ?1 THEN amount ELSE 0 END), 0)
                FROM transactions
                WHERE user_id = ?2 AND kind = 'expense' AND date >= ?3 AND date <= ?4
                "#,
                params![small_limit, user_id, start, end],
                |row| {
                    Ok((
                        row.get::<_, f64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, f64>(3)?,
                    ))
                },
            )?;

        let mut stmt = conn.prepare(
            r#"
            SELECT c.name, SUM(t.amount)
            FROM transactions t
            JOIN categories c ON c.id = t.category_id
            WHERE t.user_id = ? AND t.kind = 'expense' AND t.date >= ? AND t.date <= ?
            GROUP BY c.name
            ORDER BY c.name
            "#,
        )?;

        let category_totals = stmt
            .query_map(params![user_id, start, end], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })?
            .collect::<std::result::Result<_, _>>()?;

        Ok(WeeklySummary {
            total_expenses,
            transaction_count,
            small_transaction_count,
            small_transaction_total,
            category_totals,
        })
    }

    /// Latest `updated_at` among the user's transactions dated inside `week`
    pub fn last_transaction_update(
        &self,
        user_id: i64,
        week: WeekRange,
    ) -> Result<Option<DateTime<Utc>>> {
        let conn = self.conn()?;
        let latest: Option<String> = conn.query_row(
            "SELECT MAX(updated_at) FROM transactions WHERE user_id = ? AND date >= ? AND date <= ?",
            params![user_id, week.start.to_string(), week.end.to_string()],
            |row| row.get(0),
        )?;

        Ok(latest.map(|s| parse_datetime(&s)))
    }
}
