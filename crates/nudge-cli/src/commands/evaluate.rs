//! Evaluation, progress and demo command implementations

use anyhow::{Context, Result};
use nudge_core::db::Database;
use nudge_core::demo::seed_demo;
use nudge_core::models::EvaluationResult;
use nudge_core::rules::{Evaluator, FeedbackLevel, RuleId};
use nudge_core::EngineConfig;

use super::parse_date_or_today;

pub fn cmd_evaluate(
    db: &Database,
    config: EngineConfig,
    user_id: i64,
    date: Option<&str>,
    json: bool,
) -> Result<()> {
    let target = parse_date_or_today(date)?;
    let result = Evaluator::new(db, config)
        .evaluate(user_id, Some(target))
        .context("Evaluation failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_evaluation(&result);
    }

    Ok(())
}

fn print_evaluation(result: &EvaluationResult) {
    let week = result.weeks.current;

    println!();
    println!(
        "📅 Week {} → {}{}",
        week.start,
        week.end,
        if result.cached { " (cached)" } else { "" }
    );
    println!("   ─────────────────────────────");
    println!("   Improvement score: {}/100", result.improvement_score);

    if result.triggered_rules.is_empty() {
        println!();
        println!("✅ No rules triggered this week. Nice work!");
        return;
    }

    println!(
        "   Rules triggered: {}",
        result
            .triggered_rules
            .iter()
            .map(|o| match o.category() {
                Some(cat) => format!("{} ({})", o.rule_id, cat),
                None => o.rule_id.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    );

    for fb in &result.feedback {
        println!();
        let icon = match fb.level {
            FeedbackLevel::Basic => "💡",
            FeedbackLevel::Advanced => "📈",
        };
        println!("{} [{}] {} ({})", icon, fb.id, rule_title(fb.rule_id), fb.level);
        println!("   {}", fb.explanation);
        println!("   → {}", fb.suggestion);
    }
}

fn rule_title(rule: RuleId) -> &'static str {
    match rule {
        RuleId::CategoryOverspend => "Category overspend",
        RuleId::WeeklySpendingSpike => "Weekly spending spike",
        RuleId::FrequentSmallPurchases => "Frequent small purchases",
    }
}

pub fn cmd_progress(db: &Database, user_id: i64, limit: usize) -> Result<()> {
    let weeks = db.recent_progress(user_id, limit.max(1))?;

    if weeks.is_empty() {
        println!("No evaluated weeks yet. Run:");
        println!("  nudge evaluate --user {}", user_id);
        return Ok(());
    }

    println!();
    println!("📊 Weekly Progress");
    println!("   ─────────────────────────────────────────────────────────────");

    for week in weeks {
        let triggered = if week.rules_triggered.is_empty() {
            "clean".to_string()
        } else {
            week.rules_triggered
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!(
            "   {} │ {:>3} │ {}",
            week.week_start, week.improvement_score, triggered
        );
    }

    Ok(())
}

pub fn cmd_seed_demo(db: &Database, config: EngineConfig, user_id: i64) -> Result<()> {
    println!("🌱 Seeding demo data for user {}...", user_id);

    let today = chrono::Local::now().date_naive();
    let results = seed_demo(db, user_id, today, config).context("Failed to seed demo data")?;

    for result in &results {
        println!(
            "   {} │ score {:>3} │ {} rule(s), {} feedback",
            result.weeks.current.start,
            result.improvement_score,
            result.triggered_rules.len(),
            result.feedback.len()
        );
    }

    println!("✅ Seeded {} weeks", results.len());
    println!();
    println!("Next: nudge feedback list --user {}", user_id);

    Ok(())
}
