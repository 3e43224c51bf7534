//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;

use chrono::NaiveDate;
use nudge_core::db::Database;
use nudge_core::models::TransactionKind;
use nudge_core::rules::RuleId;
use nudge_core::EngineConfig;

use crate::commands::{self, truncate, AddTransaction, UpdateTransaction};

const USER: i64 = 1;

fn setup_test_db() -> Database {
    Database::in_memory().unwrap()
}

fn add(db: &Database, amount: f64, category: &str, date: &str) -> i64 {
    commands::cmd_transactions_add(
        db,
        AddTransaction {
            user_id: USER,
            amount,
            category: Some(category),
            date: Some(date),
            description: None,
            income: false,
        },
    )
    .unwrap()
}

// ========== Core ==========

#[test]
fn test_cmd_init_creates_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nudge.db");

    commands::cmd_init(&path, true).unwrap();
    assert!(path.exists());

    // Reopening sees the migrated schema
    let db = commands::open_db(&path, true).unwrap();
    assert_eq!(db.count_transactions(USER).unwrap(), 0);
}

#[test]
fn test_load_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[thresholds]\nsmall_purchase_count = 3").unwrap();

    let config = commands::load_config(Some(file.path())).unwrap();
    assert_eq!(config.thresholds.small_purchase_count, 3);
    assert_eq!(config.thresholds.weekly_spike, 0.20);
}

#[test]
fn test_load_config_rejects_bad_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[thresholds\nweekly_spike = ").unwrap();

    assert!(commands::load_config(Some(file.path())).is_err());
}

#[test]
fn test_parse_date_or_today() {
    assert_eq!(
        commands::parse_date_or_today(Some("2026-01-14")).unwrap(),
        NaiveDate::from_ymd_opt(2026, 1, 14).unwrap()
    );
    assert_eq!(
        commands::parse_date_or_today(None).unwrap(),
        chrono::Local::now().date_naive()
    );
    assert!(commands::parse_date_or_today(Some("January 14")).is_err());
}

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a much longer description", 10), "a much ...");
    // Multi-byte characters are counted, not sliced
    assert_eq!(truncate("café crème brûlée", 8), "café ...");
}

// ========== Transactions ==========

#[test]
fn test_cmd_transactions_add() {
    let db = setup_test_db();
    let id = add(&db, 12.5, "Food", "2026-01-14");

    let tx = db.get_transaction(USER, id).unwrap().unwrap();
    assert_eq!(tx.amount, 12.5);
    assert_eq!(tx.category.as_deref(), Some("Food"));
    assert_eq!(tx.kind, TransactionKind::Expense);
}

#[test]
fn test_cmd_transactions_add_income() {
    let db = setup_test_db();
    let id = commands::cmd_transactions_add(
        &db,
        AddTransaction {
            user_id: USER,
            amount: 2000.0,
            category: Some("Salary"),
            date: Some("2026-01-14"),
            description: Some("January pay"),
            income: true,
        },
    )
    .unwrap();

    let tx = db.get_transaction(USER, id).unwrap().unwrap();
    assert_eq!(tx.kind, TransactionKind::Income);
    assert_eq!(tx.description.as_deref(), Some("January pay"));
}

#[test]
fn test_cmd_transactions_add_rejects_non_positive_amount() {
    let db = setup_test_db();
    let result = commands::cmd_transactions_add(
        &db,
        AddTransaction {
            user_id: USER,
            amount: -5.0,
            category: None,
            date: Some("2026-01-14"),
            description: None,
            income: false,
        },
    );
    assert!(result.is_err());
    assert_eq!(db.count_transactions(USER).unwrap(), 0);
}

#[test]
fn test_cmd_transactions_list() {
    let db = setup_test_db();
    assert!(commands::cmd_transactions_list(&db, USER, 20).is_ok());

    add(&db, 12.5, "Food", "2026-01-14");
    assert!(commands::cmd_transactions_list(&db, USER, 20).is_ok());
}

#[test]
fn test_cmd_transactions_update() {
    let db = setup_test_db();
    let id = add(&db, 12.5, "Food", "2026-01-14");

    commands::cmd_transactions_update(
        &db,
        UpdateTransaction {
            user_id: USER,
            id,
            amount: Some(40.0),
            category: Some("Dining"),
            date: None,
            description: Some("Dinner"),
        },
    )
    .unwrap();

    let tx = db.get_transaction(USER, id).unwrap().unwrap();
    assert_eq!(tx.amount, 40.0);
    assert_eq!(tx.category.as_deref(), Some("Dining"));
    assert_eq!(tx.description.as_deref(), Some("Dinner"));
    assert_eq!(tx.date, NaiveDate::from_ymd_opt(2026, 1, 14).unwrap());
}

#[test]
fn test_cmd_transactions_update_other_user_fails() {
    let db = setup_test_db();
    let id = add(&db, 12.5, "Food", "2026-01-14");

    let result = commands::cmd_transactions_update(
        &db,
        UpdateTransaction {
            user_id: 2,
            id,
            amount: Some(1.0),
            category: None,
            date: None,
            description: None,
        },
    );
    assert!(result.is_err());
    assert_eq!(db.get_transaction(USER, id).unwrap().unwrap().amount, 12.5);
}

#[test]
fn test_cmd_transactions_rejects_non_positive_user() {
    let db = setup_test_db();
    let id = add(&db, 12.5, "Food", "2026-01-14");

    for user_id in [0, -1] {
        let result = commands::cmd_transactions_add(
            &db,
            AddTransaction {
                user_id,
                amount: 5.0,
                category: Some("Food"),
                date: Some("2026-01-14"),
                description: None,
                income: false,
            },
        );
        assert!(result.is_err());
        assert_eq!(db.count_transactions(user_id).unwrap(), 0);

        let result = commands::cmd_transactions_update(
            &db,
            UpdateTransaction {
                user_id,
                id,
                amount: Some(1.0),
                category: Some("Dining"),
                date: None,
                description: None,
            },
        );
        assert!(result.is_err());
    }

    // Nothing was created or changed under the bad ids
    assert_eq!(db.count_transactions(USER).unwrap(), 1);
    assert_eq!(db.get_transaction(USER, id).unwrap().unwrap().amount, 12.5);
}

// ========== Evaluation ==========

#[test]
fn test_cmd_evaluate_persists_progress() {
    let db = setup_test_db();
    add(&db, 100.0, "Food", "2026-01-07");
    add(&db, 130.0, "Food", "2026-01-14");

    commands::cmd_evaluate(&db, EngineConfig::default(), USER, Some("2026-01-14"), false).unwrap();

    let progress = db.recent_progress(USER, 5).unwrap();
    assert_eq!(progress.len(), 1);
    assert!(progress[0].triggered(RuleId::CategoryOverspend));
    assert!(progress[0].triggered(RuleId::WeeklySpendingSpike));

    // JSON output path reuses the cached result
    commands::cmd_evaluate(&db, EngineConfig::default(), USER, Some("2026-01-14"), true).unwrap();
    assert_eq!(db.recent_progress(USER, 5).unwrap().len(), 1);
}

#[test]
fn test_cmd_evaluate_rejects_bad_input() {
    let db = setup_test_db();
    assert!(
        commands::cmd_evaluate(&db, EngineConfig::default(), 0, Some("2026-01-14"), false).is_err()
    );
    assert!(commands::cmd_evaluate(&db, EngineConfig::default(), USER, Some("nope"), false).is_err());
}

#[test]
fn test_cmd_progress() {
    let db = setup_test_db();
    assert!(commands::cmd_progress(&db, USER, 8).is_ok());

    commands::cmd_evaluate(&db, EngineConfig::default(), USER, Some("2026-01-14"), false).unwrap();
    assert!(commands::cmd_progress(&db, USER, 8).is_ok());
}

#[test]
fn test_cmd_seed_demo() {
    let db = setup_test_db();
    commands::cmd_seed_demo(&db, EngineConfig::default(), 5).unwrap();

    assert_eq!(db.recent_progress(5, 10).unwrap().len(), 5);
    assert!(db.list_feedback(5, 1, 100).unwrap().total > 0);

    // Second run refuses to touch existing data
    assert!(commands::cmd_seed_demo(&db, EngineConfig::default(), 5).is_err());
}

// ========== Feedback ==========

#[test]
fn test_cmd_feedback_list_and_ack() {
    let db = setup_test_db();
    assert!(commands::cmd_feedback_list(&db, USER, 1, 20).is_ok());

    add(&db, 100.0, "Food", "2026-01-07");
    add(&db, 130.0, "Food", "2026-01-14");
    commands::cmd_evaluate(&db, EngineConfig::default(), USER, Some("2026-01-14"), false).unwrap();

    assert!(commands::cmd_feedback_list(&db, USER, 1, 20).is_ok());

    let id = db.list_feedback(USER, 1, 20).unwrap().items[0].id;
    commands::cmd_feedback_ack(&db, USER, id).unwrap();
    assert!(db.get_feedback(USER, id).unwrap().unwrap().user_acknowledged);
}

#[test]
fn test_cmd_feedback_ack_unknown_id() {
    let db = setup_test_db();
    assert!(commands::cmd_feedback_ack(&db, USER, 999).is_err());
}
