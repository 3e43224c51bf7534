//! Feedback message templates
//!
//! One template per (rule, level). Texts use `${name}` tokens; every token a
//! template uses is listed in its `placeholders`.

use super::types::{FeedbackLevel, RuleId};

/// A static feedback template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub id: &'static str,
    pub rule: RuleId,
    pub level: FeedbackLevel,
    pub explanation: &'static str,
    pub suggestion: &'static str,
    pub placeholders: &'static [&'static str],
    /// Higher sorts first when several feedback items are shown together
    pub priority: u8,
}

const CATEGORY_OVERSPEND_BASIC: Template = Template {
    id: "category_overspend_basic",
    rule: RuleId::CategoryOverspend,
    level: FeedbackLevel::Basic,
    explanation: "You spent ${current_week_amount} in ${category} this week, which is ${increase_percentage}% higher than last week (${previous_week_amount}).",
    suggestion: "Try limiting ${category} spending to ${target_amount} next week.",
    placeholders: &[
        "current_week_amount",
        "category",
        "increase_percentage",
        "previous_week_amount",
        "target_amount",
    ],
    priority: 8,
};

const CATEGORY_OVERSPEND_ADVANCED: Template = Template {
    id: "category_overspend_advanced",
    rule: RuleId::CategoryOverspend,
    level: FeedbackLevel::Advanced,
    explanation: "Your ${category} spending increased by ${increase_percentage}% (${current_week_amount} vs ${previous_week_amount}). Your recent weekly average is ${four_week_average}.",
    suggestion: "Consider setting a weekly ${category} budget to stay on track. Track daily to stay aware.",
    placeholders: &[
        "category",
        "increase_percentage",
        "current_week_amount",
        "previous_week_amount",
        "four_week_average",
    ],
    priority: 8,
};

const WEEKLY_SPIKE_BASIC: Template = Template {
    id: "weekly_spike_basic",
    rule: RuleId::WeeklySpendingSpike,
    level: FeedbackLevel::Basic,
    explanation: "Your total spending this week (${current_week_total}) is ${increase_percentage}% higher than last week (${previous_week_total}).",
    suggestion: "Review your transactions to identify unexpected expenses. Try to reduce discretionary spending next week.",
    placeholders: &[
        "current_week_total",
        "increase_percentage",
        "previous_week_total",
    ],
    priority: 9,
};

const WEEKLY_SPIKE_ADVANCED: Template = Template {
    id: "weekly_spike_advanced",
    rule: RuleId::WeeklySpendingSpike,
    level: FeedbackLevel::Advanced,
    explanation: "Weekly spending increased ${increase_percentage}% to ${current_week_total}. Your 4-week average is ${four_week_average}.",
    suggestion: "Focus on reducing discretionary categories to get back to your baseline. Set daily spending limits.",
    placeholders: &[
        "increase_percentage",
        "current_week_total",
        "four_week_average",
    ],
    priority: 9,
};

const SMALL_PURCHASES_BASIC: Template = Template {
    id: "small_purchases_basic",
    rule: RuleId::FrequentSmallPurchases,
    level: FeedbackLevel::Basic,
    explanation: "You made ${transaction_count} small purchases (under ${amount_limit}) this week, totaling ${total_amount}.",
    suggestion: "Small purchases add up quickly. Try consolidating purchases or setting a daily spending limit.",
    placeholders: &["transaction_count", "amount_limit", "total_amount"],
    priority: 6,
};

const SMALL_PURCHASES_ADVANCED: Template = Template {
    id: "small_purchases_advanced",
    rule: RuleId::FrequentSmallPurchases,
    level: FeedbackLevel::Advanced,
    explanation: "${transaction_count} small purchases totaling ${total_amount} (avg: ${average_amount}).",
    suggestion: "Implement a \"wait 24 hours\" rule for purchases under ${amount_limit}. Prepare alternatives to reduce impulse spending.",
    placeholders: &[
        "transaction_count",
        "total_amount",
        "average_amount",
        "amount_limit",
    ],
    priority: 6,
};

/// The built-in template for a (rule, level) pair.
///
/// Exhaustive over both enums, so a new rule or level fails to compile
/// until it has a template.
pub fn builtin_template(rule: RuleId, level: FeedbackLevel) -> &'static Template {
    match (rule, level) {
        (RuleId::CategoryOverspend, FeedbackLevel::Basic) => &CATEGORY_OVERSPEND_BASIC,
        (RuleId::CategoryOverspend, FeedbackLevel::Advanced) => &CATEGORY_OVERSPEND_ADVANCED,
        (RuleId::WeeklySpendingSpike, FeedbackLevel::Basic) => &WEEKLY_SPIKE_BASIC,
        (RuleId::WeeklySpendingSpike, FeedbackLevel::Advanced) => &WEEKLY_SPIKE_ADVANCED,
        (RuleId::FrequentSmallPurchases, FeedbackLevel::Basic) => &SMALL_PURCHASES_BASIC,
        (RuleId::FrequentSmallPurchases, FeedbackLevel::Advanced) => &SMALL_PURCHASES_ADVANCED,
    }
}

/// Read-only template catalog used by the evaluator
#[derive(Debug, Clone)]
pub struct TemplateLibrary {
    templates: Vec<&'static Template>,
}

impl Default for TemplateLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TemplateLibrary {
    /// All six built-in templates
    pub fn builtin() -> Self {
        let templates = RuleId::all()
            .iter()
            .flat_map(|&rule| {
                [FeedbackLevel::Basic, FeedbackLevel::Advanced]
                    .into_iter()
                    .map(move |level| builtin_template(rule, level))
            })
            .collect();
        Self { templates }
    }

    /// Catalog with one entry removed
    pub fn without(mut self, rule: RuleId, level: FeedbackLevel) -> Self {
        self.templates.retain(|t| !(t.rule == rule && t.level == level));
        self
    }

    /// Look up a template; `None` means feedback for this outcome is skipped
    pub fn get(&self, rule: RuleId, level: FeedbackLevel) -> Option<&'static Template> {
        self.templates
            .iter()
            .find(|t| t.rule == rule && t.level == level)
            .copied()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
