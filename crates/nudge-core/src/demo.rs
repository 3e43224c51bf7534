//! Demo data
//!
//! Seeds five weeks of transactions for one user and evaluates each week in
//! order, so the feedback history shows level changes.

use chrono::{Duration, NaiveDate};
use tracing::info;

use crate::config::EngineConfig;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{EvaluationResult, NewTransaction};
use crate::rules::{Evaluator, WeekRange};

const SMALL_ITEMS: &[(&str, f64)] = &[
    ("Coffee", 4.50),
    ("Snack", 3.25),
    ("Bus", 2.90),
    ("Quick Bite", 7.80),
    ("Coffee", 5.10),
    ("Snack", 6.40),
];

/// Seed and evaluate five weeks ending with the week containing `today`.
///
/// Refuses to touch a user that already has transactions.
pub fn seed_demo(
    db: &Database,
    user_id: i64,
    today: NaiveDate,
    config: EngineConfig,
) -> Result<Vec<EvaluationResult>> {
    if user_id <= 0 {
        return Err(Error::InvalidInput(format!("Invalid user id: {}", user_id)));
    }
    if db.count_transactions(user_id)? > 0 {
        return Err(Error::InvalidInput(format!(
            "User {} already has transactions",
            user_id
        )));
    }

    let food = db.get_or_create_category(user_id, "Food")?.id;
    let shopping = db.get_or_create_category(user_id, "Shopping")?.id;
    let rent = db.get_or_create_category(user_id, "Rent")?.id;

    let evaluator = Evaluator::new(db, config);
    let mut results = Vec::with_capacity(5);

    for weeks_ago in (0..=4).rev() {
        let target = today - Duration::weeks(weeks_ago);
        let monday = WeekRange::containing(target).start;

        match weeks_ago {
            // Baseline
            4 => {
                add(db, user_id, food, 50.0, monday + Duration::days(1), "Groceries")?;
                add(db, user_id, rent, 500.0, monday, "Rent")?;
            }
            // Spike in food and overall
            3 => {
                add(db, user_id, food, 150.0, monday + Duration::days(1), "Groceries")?;
                add(db, user_id, shopping, 200.0, monday + Duration::days(2), "Shoes")?;
            }
            // Calmer week
            2 => {
                add(db, user_id, food, 80.0, monday + Duration::days(1), "Groceries")?;
            }
            1 => add_small(db, user_id, food, monday, 12)?,
            _ => {
                add(db, user_id, food, 200.0, monday + Duration::days(1), "Dinner party")?;
                add_small(db, user_id, shopping, monday, 12)?;
            }
        }

        results.push(evaluator.evaluate(user_id, Some(target))?);
    }

    info!(user_id, weeks = results.len(), "Seeded demo history");
    Ok(results)
}

fn add(
    db: &Database,
    user_id: i64,
    category_id: i64,
    amount: f64,
    date: NaiveDate,
    description: &str,
) -> Result<()> {
    let mut tx = NewTransaction::expense(user_id, Some(category_id), amount, date);
    tx.description = Some(description.to_string());
    db.insert_transaction(&tx)?;
    Ok(())
}

/// `count` purchases under 10.00 spread over Monday to Friday
fn add_small(db: &Database, user_id: i64, category_id: i64, monday: NaiveDate, count: usize) -> Result<()> {
    for i in 0..count {
        let (description, amount) = SMALL_ITEMS[i % SMALL_ITEMS.len()];
        let date = monday + Duration::days((i % 5) as i64);
        add(db, user_id, category_id, amount, date, description)?;
    }
    Ok(())
}
