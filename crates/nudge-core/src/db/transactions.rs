//! Category and transaction operations

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::{date_column, enum_column, format_datetime, now, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Category, NewTransaction, Transaction, TransactionKind};

/// Fields to change on an existing transaction (`None` leaves a field as is)
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub amount: Option<f64>,
    pub date: Option<NaiveDate>,
    pub category_id: Option<i64>,
    pub description: Option<String>,
}

const TRANSACTION_COLUMNS: &str = r#"
    t.id, t.user_id, t.category_id, c.name, t.kind, t.amount, t.date,
    t.description, t.created_at, t.updated_at
"#;

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let created_at: String = row.get(8)?;
    let updated_at: String = row.get(9)?;
    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        category_id: row.get(2)?,
        category: row.get(3)?,
        kind: enum_column(row, 4)?,
        amount: row.get(5)?,
        date: date_column(row, 6)?,
        description: row.get(7)?,
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}

fn check_amount(amount: f64) -> Result<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "Transaction amount must be positive, got {}",
            amount
        )))
    }
}

impl Database {
    /// Get a user's category by name, creating it as an expense category if missing
    pub fn get_or_create_category(&self, user_id: i64, name: &str) -> Result<Category> {
        self.get_or_create_category_with_kind(user_id, name, TransactionKind::Expense)
    }

    pub fn get_or_create_category_with_kind(
        &self,
        user_id: i64,
        name: &str,
        kind: TransactionKind,
    ) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("Category name is empty".into()));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO categories (user_id, name, kind) VALUES (?, ?, ?)",
            params![user_id, name, kind.as_str()],
        )?;

        let category = conn.query_row(
            "SELECT id, user_id, name, kind, created_at FROM categories WHERE user_id = ? AND name = ?",
            params![user_id, name],
            |row| {
                let created_at: String = row.get(4)?;
                Ok(Category {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    name: row.get(2)?,
                    kind: enum_column(row, 3)?,
                    created_at: parse_datetime(&created_at),
                })
            },
        )?;

        Ok(category)
    }

    /// List a user's categories by name
    pub fn list_categories(&self, user_id: i64) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, kind, created_at FROM categories WHERE user_id = ? ORDER BY name",
        )?;

        let categories = stmt
            .query_map(params![user_id], |row| {
                let created_at: String = row.get(4)?;
                Ok(Category {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    name: row.get(2)?,
                    kind: enum_column(row, 3)?,
                    created_at: parse_datetime(&created_at),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Insert a transaction, returning its id
    pub fn insert_transaction(&self, tx: &NewTransaction) -> Result<i64> {
        check_amount(tx.amount)?;
        if let Some(category_id) = tx.category_id {
            self.ensure_category_owner(tx.user_id, category_id)?;
        }

        let conn = self.conn()?;
        let ts = format_datetime(now());

        conn.execute(
            r#"
            INSERT INTO transactions (user_id, category_id, kind, amount, date, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                tx.user_id,
                tx.category_id,
                tx.kind.as_str(),
                tx.amount,
                tx.date.to_string(),
                tx.description,
                ts,
                ts,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Get a user's transaction by id
    pub fn get_transaction(&self, user_id: i64, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM transactions t LEFT JOIN categories c ON c.id = t.category_id \
             WHERE t.user_id = ? AND t.id = ?",
            TRANSACTION_COLUMNS
        );

        let tx = conn
            .query_row(&sql, params![user_id, id], row_to_transaction)
            .optional()?;
        Ok(tx)
    }

    /// Apply changes to a transaction and bump its `updated_at`
    pub fn update_transaction(
        &self,
        user_id: i64,
        id: i64,
        update: &TransactionUpdate,
    ) -> Result<Transaction> {
        if let Some(amount) = update.amount {
            check_amount(amount)?;
        }
        if let Some(category_id) = update.category_id {
            self.ensure_category_owner(user_id, category_id)?;
        }

        let conn = self.conn()?;
        let updated = conn.execute(
            r#"
            UPDATE transactions
            SET amount = COALESCE(?, amount),
                date = COALESCE(?, date),
                category_id = COALESCE(?, category_id),
                description = COALESCE(?, description),
                updated_at = ?
            WHERE user_id = ? AND id = ?
            "#,
            params![
                update.amount,
                update.date.map(|d| d.to_string()),
                update.category_id,
                update.description,
                format_datetime(now()),
                user_id,
                id,
            ],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("Transaction {}", id)));
        }

        self.get_transaction(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("Transaction {}", id)))
    }

    /// List a user's transactions, newest first
    pub fn list_transactions(&self, user_id: i64, limit: i64, offset: i64) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM transactions t LEFT JOIN categories c ON c.id = t.category_id \
             WHERE t.user_id = ? ORDER BY t.date DESC, t.id DESC LIMIT ? OFFSET ?",
            TRANSACTION_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let transactions = stmt
            .query_map(params![user_id, limit, offset], row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Count a user's transactions
    pub fn count_transactions(&self, user_id: i64) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE user_id = ?",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Reject category ids that belong to someone else
    fn ensure_category_owner(&self, user_id: i64, category_id: i64) -> Result<()> {
        let conn = self.conn()?;
        let owner: Option<i64> = conn
            .query_row(
                "SELECT user_id FROM categories WHERE id = ?",
                params![category_id],
                |row| row.get(0),
            )
            .optional()?;

        match owner {
            Some(owner) if owner == user_id => Ok(()),
            _ => Err(Error::NotFound(format!("Category {}", category_id))),
        }
    }
}
