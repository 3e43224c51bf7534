//! Weekly improvement score

use std::collections::BTreeSet;

use crate::models::UserProgress;

use super::types::RuleId;

/// Score for users with no earlier weeks on record
pub const BASELINE_SCORE: i32 = 50;

const PER_CLEAN_RULE: i32 = 10;
const FEWER_THAN_LAST_WEEK: i32 = 15;
const MORE_THAN_LAST_WEEK: i32 = -10;

/// Score a week in [0, 100].
///
/// `prior` is progress for earlier weeks, newest first; only the first entry
/// is compared against.
pub fn improvement_score(triggered: &[RuleId], prior: &[UserProgress]) -> i32 {
    let Some(last_week) = prior.first() else {
        return BASELINE_SCORE;
    };

    let distinct: BTreeSet<RuleId> = triggered.iter().copied().collect();
    let clean = RuleId::all().len() as i32 - distinct.len() as i32;
    let mut score = BASELINE_SCORE + clean * PER_CLEAN_RULE;

    let previous = last_week.rules_triggered.len();
    score += match distinct.len().cmp(&previous) {
        std::cmp::Ordering::Less => FEWER_THAN_LAST_WEEK,
        std::cmp::Ordering::Greater => MORE_THAN_LAST_WEEK,
        std::cmp::Ordering::Equal => 0,
    };

    score.clamp(0, 100)
}
