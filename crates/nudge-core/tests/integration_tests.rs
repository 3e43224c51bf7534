//! Integration tests for nudge-core
//!
//! These tests exercise the full transactions → evaluate → feedback workflow
//! against a real database.

use chrono::{Duration, NaiveDate};
use serde_json::json;

use nudge_core::{
    db::Database,
    models::{EvaluationResult, NewTransaction},
    rules::{Evaluator, FeedbackLevel, RuleId},
    EngineConfig, Error, TransactionUpdate,
};

const USER: i64 = 1;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Wednesday of the n-th week after the week of 2026-01-05
fn week(n: i64) -> NaiveDate {
    date(2026, 1, 7) + Duration::weeks(n)
}

fn spend(db: &Database, category: Option<&str>, amount: f64, on: NaiveDate) -> i64 {
    let category_id = category.map(|name| db.get_or_create_category(USER, name).unwrap().id);
    db.insert_transaction(&NewTransaction::expense(USER, category_id, amount, on))
        .unwrap()
}

fn evaluate(db: &Database, on: NaiveDate) -> EvaluationResult {
    Evaluator::new(db, EngineConfig::default())
        .evaluate(USER, Some(on))
        .expect("evaluation failed")
}

fn rules(result: &EvaluationResult) -> Vec<RuleId> {
    result.triggered_rules.iter().map(|o| o.rule_id).collect()
}

fn feedback_for(result: &EvaluationResult, rule: RuleId) -> &nudge_core::models::FeedbackRecord {
    result
        .feedback
        .iter()
        .find(|f| f.rule_id == rule)
        .unwrap_or_else(|| panic!("no feedback for {}", rule))
}

/// Give `updated_at` timestamps room to differ
fn pause() {
    std::thread::sleep(std::time::Duration::from_millis(5));
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_food_increase_triggers_overspend_and_spike() {
    let db = Database::in_memory().unwrap();
    spend(&db, Some("Food"), 100.0, week(0));
    spend(&db, Some("Food"), 130.0, week(1));

    let result = evaluate(&db, week(1));

    assert!(!result.cached);
    assert_eq!(
        rules(&result),
        vec![RuleId::CategoryOverspend, RuleId::WeeklySpendingSpike]
    );
    assert_eq!(result.triggered_rules[0].data["increase_percentage"], json!(30.0));
    assert_eq!(result.triggered_rules[0].data["category"], json!("Food"));
    assert_eq!(result.triggered_rules[1].data["increase_percentage"], json!(30.0));
    assert_eq!(result.improvement_score, 50);

    let overspend = feedback_for(&result, RuleId::CategoryOverspend);
    assert_eq!(overspend.level, FeedbackLevel::Basic);
    assert_eq!(overspend.category_name.as_deref(), Some("Food"));
    assert_eq!(
        overspend.explanation,
        "You spent 130.00 in Food this week, which is 30.00% higher than last week (100.00)."
    );
    assert_eq!(
        overspend.suggestion,
        "Try limiting Food spending to 117.00 next week."
    );

    let spike = feedback_for(&result, RuleId::WeeklySpendingSpike);
    assert_eq!(spike.template_id, "weekly_spike_basic");
    assert_eq!(
        spike.explanation,
        "Your total spending this week (130.00) is 30.00% higher than last week (100.00)."
    );
}

#[test]
fn test_ten_small_purchases_trigger_only_small_rule() {
    let db = Database::in_memory().unwrap();
    for i in 0..10 {
        spend(&db, Some("Coffee"), 5.0, week(1) + Duration::days(i % 3));
    }

    let result = evaluate(&db, week(1));

    assert_eq!(rules(&result), vec![RuleId::FrequentSmallPurchases]);
    let data = &result.triggered_rules[0].data;
    assert_eq!(data["transaction_count"], json!(10));
    assert_eq!(data["average_amount"], json!(5.0));

    let small = feedback_for(&result, RuleId::FrequentSmallPurchases);
    assert_eq!(
        small.explanation,
        "You made 10 small purchases (under 10.00) this week, totaling 50.00."
    );
}

#[test]
fn test_empty_week() {
    let db = Database::in_memory().unwrap();
    let result = evaluate(&db, week(1));

    assert!(result.triggered_rules.is_empty());
    assert!(result.feedback.is_empty());
    assert_eq!(result.improvement_score, 50);
    assert!(!result.cached);

    let progress = db.progress_for_week(USER, result.weeks.current.start).unwrap().unwrap();
    assert!(progress.rules_triggered.is_empty());
    assert_eq!(progress.rules_not_triggered.len(), 3);
}

#[test]
fn test_new_category_never_overspends() {
    let db = Database::in_memory().unwrap();
    spend(&db, Some("Food"), 100.0, week(0));
    spend(&db, Some("Food"), 100.0, week(1));
    spend(&db, Some("Travel"), 15.0, week(1));

    let result = evaluate(&db, week(1));
    assert!(rules(&result).is_empty());
}

// =============================================================================
// Caching
// =============================================================================

#[test]
fn test_second_call_is_cached_and_identical() {
    let db = Database::in_memory().unwrap();
    spend(&db, Some("Food"), 100.0, week(0));
    spend(&db, Some("Food"), 130.0, week(1));

    let first = evaluate(&db, week(1));
    let second = evaluate(&db, week(1) + Duration::days(2));

    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(first.weeks, second.weeks);
    assert_eq!(first.triggered_rules, second.triggered_rules);
    assert_eq!(first.improvement_score, second.improvement_score);

    let texts = |r: &EvaluationResult| {
        r.feedback
            .iter()
            .map(|f| (f.explanation.clone(), f.suggestion.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(texts(&first), texts(&second));

    let first_json = serde_json::to_value(&first).unwrap();
    let second_json = serde_json::to_value(&second).unwrap();
    assert!(first_json.get("cached").is_none());
    assert_eq!(second_json["cached"], json!(true));
    assert_eq!(first_json["evaluation_date"], json!("2026-01-14T00:00:00"));
    assert_eq!(first_json["weeks"]["current"]["start"], json!("2026-01-12"));
}

#[test]
fn test_changed_transaction_forces_reevaluation() {
    let db = Database::in_memory().unwrap();
    spend(&db, Some("Food"), 100.0, week(0));
    let id = spend(&db, Some("Food"), 110.0, week(1));

    let first = evaluate(&db, week(1));
    assert!(rules(&first).is_empty());

    pause();
    db.update_transaction(
        USER,
        id,
        &TransactionUpdate {
            amount: Some(140.0),
            ..Default::default()
        },
    )
    .unwrap();

    let second = evaluate(&db, week(1));
    assert!(!second.cached);
    assert_eq!(
        rules(&second),
        vec![RuleId::CategoryOverspend, RuleId::WeeklySpendingSpike]
    );

    let third = evaluate(&db, week(1));
    assert!(third.cached);
    assert_eq!(third.triggered_rules, second.triggered_rules);
}

#[test]
fn test_new_transaction_in_week_forces_reevaluation() {
    let db = Database::in_memory().unwrap();
    spend(&db, Some("Food"), 100.0, week(0));
    spend(&db, Some("Food"), 100.0, week(1));
    evaluate(&db, week(1));

    pause();
    spend(&db, Some("Food"), 50.0, week(1));

    let result = evaluate(&db, week(1));
    assert!(!result.cached);
    assert!(rules(&result).contains(&RuleId::WeeklySpendingSpike));
}

#[test]
fn test_transaction_outside_week_keeps_cache() {
    let db = Database::in_memory().unwrap();
    spend(&db, Some("Food"), 100.0, week(1));
    evaluate(&db, week(1));

    pause();
    spend(&db, Some("Food"), 500.0, week(2));
    spend(&db, Some("Food"), 500.0, week(0));

    assert!(evaluate(&db, week(1)).cached);
}

#[test]
fn test_reevaluation_preserves_acknowledgement() {
    let db = Database::in_memory().unwrap();
    spend(&db, Some("Food"), 100.0, week(0));
    let id = spend(&db, Some("Food"), 130.0, week(1));

    let first = evaluate(&db, week(1));
    let spike = feedback_for(&first, RuleId::WeeklySpendingSpike);
    db.acknowledge_feedback(USER, spike.id).unwrap();

    pause();
    db.update_transaction(
        USER,
        id,
        &TransactionUpdate {
            amount: Some(150.0),
            ..Default::default()
        },
    )
    .unwrap();

    let second = evaluate(&db, week(1));
    assert!(!second.cached);
    let spike_again = feedback_for(&second, RuleId::WeeklySpendingSpike);
    assert_eq!(spike_again.id, spike.id);
    assert!(spike_again.user_acknowledged);
    assert!(spike_again.explanation.contains("150.00"));
    assert!(spike_again.updated_at > spike.updated_at);
}

// =============================================================================
// History and levels
// =============================================================================

#[test]
fn test_clean_streak_switches_to_advanced_with_average() {
    let db = Database::in_memory().unwrap();
    let amounts = [100.0, 130.0, 100.0, 100.0, 140.0];
    let mut results = Vec::new();
    for (n, amount) in amounts.iter().enumerate() {
        spend(&db, Some("Food"), *amount, week(n as i64));
        results.push(evaluate(&db, week(n as i64)));
    }

    // Week 1 fired both rules after a single clean week: still basic
    assert_eq!(
        feedback_for(&results[1], RuleId::CategoryOverspend).level,
        FeedbackLevel::Basic
    );

    // Fewer rules than the week before: 50 + 30 + 15
    assert_eq!(results[2].improvement_score, 95);

    let last = &results[4];
    let overspend = feedback_for(last, RuleId::CategoryOverspend);
    assert_eq!(overspend.level, FeedbackLevel::Advanced);
    assert_eq!(overspend.template_id, "category_overspend_advanced");
    assert_eq!(
        overspend.explanation,
        "Your Food spending increased by 40.00% (140.00 vs 100.00). Your recent weekly average is 135.00."
    );

    let spike = feedback_for(last, RuleId::WeeklySpendingSpike);
    assert_eq!(spike.level, FeedbackLevel::Advanced);
    assert_eq!(
        spike.explanation,
        "Weekly spending increased 40.00% to 140.00. Your 4-week average is 135.00."
    );

    // Two rules after a clean week: 50 + 10 - 10
    assert_eq!(last.improvement_score, 50);
}

#[test]
fn test_repeated_violations_stay_basic() {
    let db = Database::in_memory().unwrap();
    let amounts = [100.0, 130.0, 170.0, 230.0];
    let mut last = None;
    for (n, amount) in amounts.iter().enumerate() {
        spend(&db, None, *amount, week(n as i64));
        last = Some(evaluate(&db, week(n as i64)));
    }

    let last = last.unwrap();
    assert_eq!(rules(&last), vec![RuleId::WeeklySpendingSpike]);
    assert_eq!(
        feedback_for(&last, RuleId::WeeklySpendingSpike).level,
        FeedbackLevel::Basic
    );
    // Same count as last week
    assert_eq!(last.improvement_score, 70);
}

#[test]
fn test_reevaluating_old_week_ignores_later_history() {
    let db = Database::in_memory().unwrap();
    spend(&db, None, 100.0, week(0));
    spend(&db, None, 200.0, week(1));
    spend(&db, None, 100.0, week(2));
    spend(&db, None, 100.0, week(3));
    for n in 0..4 {
        evaluate(&db, week(n));
    }

    pause();
    spend(&db, None, 1.0, week(1));
    let result = evaluate(&db, week(1));

    assert!(!result.cached);
    // Only week 0 is prior history for week 1
    assert_eq!(result.improvement_score, 60);
    assert_eq!(
        feedback_for(&result, RuleId::WeeklySpendingSpike).level,
        FeedbackLevel::Basic
    );
}

// =============================================================================
// Errors and listing
// =============================================================================

#[test]
fn test_invalid_user_rejected_before_storage() {
    let db = Database::in_memory().unwrap();
    let err = Evaluator::new(&db, EngineConfig::default())
        .evaluate(0, Some(week(0)))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(db.recent_progress(0, 10).unwrap().is_empty());
}

#[test]
fn test_feedback_listing_across_weeks() {
    let db = Database::in_memory().unwrap();
    let amounts = [100.0, 130.0, 100.0, 170.0];
    for (n, amount) in amounts.iter().enumerate() {
        spend(&db, Some("Food"), *amount, week(n as i64));
        evaluate(&db, week(n as i64));
    }

    let page = db.list_feedback(USER, 1, 20).unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(page.items[0].week_start, date(2026, 1, 26));

    let progress = db.recent_progress(USER, 10).unwrap();
    assert_eq!(progress.len(), 4);
    assert_eq!(progress[0].week_start, date(2026, 1, 26));
}

#[test]
fn test_injected_thresholds() {
    let db = Database::in_memory().unwrap();
    spend(&db, None, 100.0, week(0));
    spend(&db, None, 110.0, week(1));

    let config = EngineConfig::from_toml("[thresholds]\nweekly_spike = 0.05\n").unwrap();
    let result = Evaluator::new(&db, config)
        .evaluate(USER, Some(week(1)))
        .unwrap();

    assert_eq!(rules(&result), vec![RuleId::WeeklySpendingSpike]);
    assert_eq!(result.triggered_rules[0].data["threshold"], json!(5.0));
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_parallel_evaluations_for_different_users() {
    let db = Database::in_memory().unwrap();
    let users: Vec<i64> = (1..=24).collect();
    for &user in &users {
        let food = db.get_or_create_category(user, "Food").unwrap().id;
        db.insert_transaction(&NewTransaction::expense(user, Some(food), 100.0, week(0)))
            .unwrap();
        db.insert_transaction(&NewTransaction::expense(user, Some(food), 130.0, week(1)))
            .unwrap();
    }

    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = users
            .iter()
            .map(|&user| {
                let db = db.clone();
                s.spawn(move || {
                    Evaluator::new(&db, EngineConfig::default()).evaluate(user, Some(week(1)))
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for result in &results {
        let result = result.as_ref().expect("parallel evaluation failed");
        assert_eq!(
            rules(result),
            vec![RuleId::CategoryOverspend, RuleId::WeeklySpendingSpike]
        );
    }
    for &user in &users {
        assert_eq!(db.recent_progress(user, 5).unwrap().len(), 1);
        assert_eq!(db.list_feedback(user, 1, 20).unwrap().total, 2);
    }
}

#[test]
fn test_racing_evaluations_of_one_week_all_succeed() {
    let db = Database::in_memory().unwrap();
    spend(&db, Some("Food"), 100.0, week(0));
    spend(&db, Some("Food"), 130.0, week(1));

    let outcomes: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let db = db.clone();
                s.spawn(move || {
                    Evaluator::new(&db, EngineConfig::default()).evaluate(USER, Some(week(1)))
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for outcome in &outcomes {
        let result = outcome.as_ref().expect("racing evaluation failed");
        assert_eq!(result.feedback.len(), 2);
    }

    // Last write wins on the unique keys: still one row per key
    assert_eq!(db.recent_progress(USER, 5).unwrap().len(), 1);
    assert_eq!(db.list_feedback(USER, 1, 20).unwrap().total, 2);
}
