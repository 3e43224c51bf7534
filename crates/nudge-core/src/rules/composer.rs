//! Feedback Composer
//!
//! Fills a template's `${placeholder}` tokens from rule outcome data. Advanced
//! feedback is enriched with a rolling average taken from earlier weeks'
//! feedback for the same rule (and category).

use serde::Serialize;
use serde_json::Value;

use crate::models::FeedbackRecord;

use super::evaluator::round2;
use super::templates::Template;
use super::types::{FeedbackLevel, RuleData, RuleId};

/// Rendered text for one rule outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposedFeedback {
    pub template_id: &'static str,
    pub level: FeedbackLevel,
    pub explanation: String,
    pub suggestion: String,
}

/// Rendered in place of a placeholder with no value
pub const MISSING_VALUE: &str = "[N/A]";

/// Placeholder name fragments that render as money
const MONEY_HINTS: &[&str] = &["amount", "total", "average", "limit", "budget", "target"];

#[derive(Debug, Clone)]
pub struct FeedbackComposer {
    /// Prior weeks included in `four_week_average`
    history_depth: usize,
}

impl Default for FeedbackComposer {
    fn default() -> Self {
        Self { history_depth: 4 }
    }
}

impl FeedbackComposer {
    pub fn new(history_depth: usize) -> Self {
        Self { history_depth }
    }

    /// Render `template` against `data`.
    ///
    /// `history` is earlier feedback, newest first. Only records for the
    /// template's rule (and the outcome's category) are used.
    pub fn compose(
        &self,
        template: &Template,
        data: &RuleData,
        level: FeedbackLevel,
        history: &[FeedbackRecord],
    ) -> ComposedFeedback {
        let enriched = self.enrich(template.rule, data, level, history);

        let mut explanation = template.explanation.to_string();
        let mut suggestion = template.suggestion.to_string();

        for name in template.placeholders {
            let token = format!("${{{}}}", name);
            let value = resolve(name, &enriched);
            explanation = explanation.replace(&token, &value);
            suggestion = suggestion.replace(&token, &value);
        }

        ComposedFeedback {
            template_id: template.id,
            level,
            explanation,
            suggestion,
        }
    }

    fn enrich(
        &self,
        rule: RuleId,
        data: &RuleData,
        level: FeedbackLevel,
        history: &[FeedbackRecord],
    ) -> RuleData {
        let mut enriched = data.clone();
        if level != FeedbackLevel::Advanced {
            return enriched;
        }

        match rule {
            RuleId::CategoryOverspend => {
                if let Some(avg) = self.rolling_average(data, "current_week_amount", rule, history)
                {
                    enriched.insert("four_week_average".into(), Value::from(avg));
                }
            }
            RuleId::WeeklySpendingSpike => {
                if let Some(avg) = self.rolling_average(data, "current_week_total", rule, history) {
                    enriched.insert("four_week_average".into(), Value::from(avg));
                }
            }
            RuleId::FrequentSmallPurchases => {
                enriched.insert(
                    "average_amount".into(),
                    Value::from(small_purchase_average(data)),
                );
            }
        }

        enriched
    }

    /// Mean of `key` over this week plus up to `history_depth` prior weeks
    fn rolling_average(
        &self,
        data: &RuleData,
        key: &str,
        rule: RuleId,
        history: &[FeedbackRecord],
    ) -> Option<f64> {
        let current = data.get(key)?.as_f64()?;
        let category = data.get("category").and_then(Value::as_str);

        let mut values = vec![current];
        values.extend(
            history
                .iter()
                .filter(|r| r.rule_id == rule && r.category_name.as_deref() == category)
                .filter_map(|r| r.data.get(key).and_then(Value::as_f64))
                .take(self.history_depth),
        );

        Some(round2(values.iter().sum::<f64>() / values.len() as f64))
    }
}

/// Per-purchase average for the small purchases rule
fn small_purchase_average(data: &RuleData) -> f64 {
    if let Some(amounts) = data.get("small_purchase_amounts").and_then(Value::as_array) {
        let amounts: Vec<f64> = amounts.iter().filter_map(Value::as_f64).collect();
        if !amounts.is_empty() {
            return round2(amounts.iter().sum::<f64>() / amounts.len() as f64);
        }
    }

    let total = data.get("total_amount").and_then(Value::as_f64).unwrap_or(0.0);
    let count = data
        .get("transaction_count")
        .and_then(Value::as_i64)
        .unwrap_or(0)
        .max(1);
    round2(total / count as f64)
}

/// Text for one placeholder
fn resolve(name: &str, data: &RuleData) -> String {
    if let Some(value) = data.get(name) {
        return format_value(name, value);
    }

    if name == "target_amount" {
        let base = data
            .get("current_week_amount")
            .or_else(|| data.get("current_week_total"))
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        return format_money(base * 0.9);
    }

    MISSING_VALUE.to_string()
}

/// Format a value according to its placeholder name
pub fn format_value(name: &str, value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            let money = MONEY_HINTS.iter().any(|hint| name.contains(hint));
            if money || name.contains("percentage") {
                n.as_f64().map(format_money).unwrap_or_else(|| n.to_string())
            } else if let Some(i) = n.as_i64() {
                i.to_string()
            } else {
                n.to_string()
            }
        }
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => MISSING_VALUE.to_string(),
    }
}

/// Two decimals with thousands separators, e.g. `1,234.56`
pub fn format_money(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && fixed.chars().any(|c| c != '0' && c != '.');
    format!("{}{}.{}", if negative { "-" } else { "" }, grouped, frac)
}
