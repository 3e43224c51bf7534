//! Transaction command implementations

use anyhow::{bail, Result};
use nudge_core::db::Database;
use nudge_core::models::{NewTransaction, TransactionKind};
use nudge_core::rules::parse_target_date;
use nudge_core::TransactionUpdate;

use super::{parse_date_or_today, truncate};

fn check_user_id(user_id: i64) -> Result<()> {
    if user_id <= 0 {
        bail!("Invalid user id: {} (must be positive)", user_id);
    }
    Ok(())
}

/// Arguments for `nudge transactions add`
pub struct AddTransaction<'a> {
    pub user_id: i64,
    pub amount: f64,
    pub category: Option<&'a str>,
    pub date: Option<&'a str>,
    pub description: Option<&'a str>,
    pub income: bool,
}

pub fn cmd_transactions_add(db: &Database, args: AddTransaction<'_>) -> Result<i64> {
    check_user_id(args.user_id)?;
    let kind = if args.income {
        TransactionKind::Income
    } else {
        TransactionKind::Expense
    };
    let category_id = match args.category {
        Some(name) => Some(db.get_or_create_category_with_kind(args.user_id, name, kind)?.id),
        None => None,
    };

    let tx = NewTransaction {
        user_id: args.user_id,
        category_id,
        kind,
        amount: args.amount,
        date: parse_date_or_today(args.date)?,
        description: args.description.map(str::to_string),
    };
    let id = db.insert_transaction(&tx)?;

    println!(
        "✅ Added {} #{}: ${:.2} on {}{}",
        tx.kind,
        id,
        tx.amount,
        tx.date,
        args.category.map(|c| format!(" ({})", c)).unwrap_or_default()
    );

    Ok(id)
}

pub fn cmd_transactions_list(db: &Database, user_id: i64, limit: i64) -> Result<()> {
    let transactions = db.list_transactions(user_id, limit, 0)?;

    if transactions.is_empty() {
        println!("No transactions found. Add one with:");
        println!("  nudge transactions add --user {} --amount 12.50 --category Food", user_id);
        return Ok(());
    }

    println!();
    println!("📝 Recent Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        let amount_str = match tx.kind {
            TransactionKind::Expense => format!("\x1b[31m${:.2}\x1b[0m", tx.amount), // Red for expenses
            TransactionKind::Income => format!("\x1b[32m+${:.2}\x1b[0m", tx.amount), // Green for income
        };

        println!(
            "   [{}] {} │ {:>10} │ {:<12} │ {}",
            tx.id,
            tx.date,
            amount_str,
            truncate(tx.category.as_deref().unwrap_or("-"), 12),
            truncate(tx.description.as_deref().unwrap_or(""), 35)
        );
    }

    Ok(())
}

/// Arguments for `nudge transactions update`
pub struct UpdateTransaction<'a> {
    pub user_id: i64,
    pub id: i64,
    pub amount: Option<f64>,
    pub category: Option<&'a str>,
    pub date: Option<&'a str>,
    pub description: Option<&'a str>,
}

pub fn cmd_transactions_update(db: &Database, args: UpdateTransaction<'_>) -> Result<()> {
    check_user_id(args.user_id)?;
    let category_id = match args.category {
        Some(name) => Some(db.get_or_create_category(args.user_id, name)?.id),
        None => None,
    };

    let update = TransactionUpdate {
        amount: args.amount,
        date: args.date.map(parse_target_date).transpose()?,
        category_id,
        description: args.description.map(str::to_string),
    };

    let tx = db.update_transaction(args.user_id, args.id, &update)?;
    println!(
        "✅ Updated transaction {}: ${:.2} on {}",
        tx.id, tx.amount, tx.date
    );
    println!("   The week of {} will be re-evaluated on the next run.", tx.date);

    Ok(())
}
