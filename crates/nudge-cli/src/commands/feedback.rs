//! Feedback command implementations

use anyhow::Result;
use nudge_core::db::Database;

use super::truncate;

pub fn cmd_feedback_list(db: &Database, user_id: i64, page: i64, per_page: i64) -> Result<()> {
    let page = db.list_feedback(user_id, page, per_page)?;

    if page.items.is_empty() {
        println!("No feedback yet. Evaluate a week with:");
        println!("  nudge evaluate --user {}", user_id);
        return Ok(());
    }

    println!();
    println!(
        "💬 Feedback (page {}/{}, {} total)",
        page.current_page, page.last_page, page.total
    );
    println!("   ─────────────────────────────────────────────────────────────");

    for fb in page.items {
        let mark = if fb.user_acknowledged { "✓" } else { " " };
        println!(
            "   [{}] {} {} │ {:<8} │ {}",
            fb.id,
            mark,
            fb.week_start,
            fb.level,
            truncate(&fb.explanation, 60)
        );
    }

    println!();
    println!("   Use 'nudge feedback ack --user {} <id>' to acknowledge.", user_id);

    Ok(())
}

pub fn cmd_feedback_ack(db: &Database, user_id: i64, id: i64) -> Result<()> {
    let fb = db.acknowledge_feedback(user_id, id)?;
    println!("✅ Acknowledged feedback {} ({})", fb.id, fb.rule_id);
    Ok(())
}
