//! Feedback level selection from rolling progress history

use std::collections::HashMap;

use crate::models::UserProgress;

use super::types::{FeedbackLevel, RuleId};

/// Chooses basic vs. advanced feedback per rule
#[derive(Debug, Clone)]
pub struct FeedbackLevelSelector {
    /// Consecutive weeks needed to count as a streak
    streak_weeks: usize,
}

impl Default for FeedbackLevelSelector {
    fn default() -> Self {
        Self { streak_weeks: 2 }
    }
}

impl FeedbackLevelSelector {
    pub fn new(streak_weeks: usize) -> Self {
        Self { streak_weeks }
    }

    /// Select a level for each triggered rule.
    ///
    /// `recent_progress` must be ordered newest week first.
    pub fn select_levels(
        &self,
        triggered: &[RuleId],
        recent_progress: &[UserProgress],
    ) -> HashMap<RuleId, FeedbackLevel> {
        triggered
            .iter()
            .map(|&rule| (rule, self.select(rule, recent_progress)))
            .collect()
    }

    /// Level for a single rule
    pub fn select(&self, rule: RuleId, recent_progress: &[UserProgress]) -> FeedbackLevel {
        let violations = recent_progress
            .iter()
            .take_while(|p| p.triggered(rule))
            .count();
        let improvements = recent_progress
            .iter()
            .take_while(|p| !p.triggered(rule))
            .count();

        if violations >= self.streak_weeks {
            FeedbackLevel::Basic
        } else if improvements >= self.streak_weeks {
            FeedbackLevel::Advanced
        } else {
            FeedbackLevel::Basic
        }
    }
}
