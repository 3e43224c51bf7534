//! Rule Evaluator
//!
//! Compares the current week's aggregate against the previous week's and
//! reports which spending rules fired. Pure computation; no storage access.

use serde_json::json;

use crate::config::RuleThresholds;

use super::types::{RuleData, RuleId, RuleOutcome, WeeklySummary};

/// Runs the three spending rules with injected thresholds
#[derive(Debug, Clone, Default)]
pub struct RuleEvaluator {
    thresholds: RuleThresholds,
}

impl RuleEvaluator {
    pub fn new(thresholds: RuleThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &RuleThresholds {
        &self.thresholds
    }

    /// Evaluate all rules. Returns every outcome, triggered or not.
    ///
    /// category_overspend contributes zero or more outcomes (only triggered
    /// ones); the other two rules contribute exactly one each.
    pub fn evaluate(&self, current: &WeeklySummary, previous: &WeeklySummary) -> Vec<RuleOutcome> {
        let mut outcomes = self.check_category_overspend(current, previous);
        outcomes.push(self.check_weekly_spending_spike(current, previous));
        outcomes.push(self.check_frequent_small_purchases(current));
        outcomes
    }

    /// Evaluate and keep only the outcomes that fired
    pub fn triggered(&self, current: &WeeklySummary, previous: &WeeklySummary) -> Vec<RuleOutcome> {
        self.evaluate(current, previous)
            .into_iter()
            .filter(|o| o.triggered)
            .collect()
    }

    fn check_category_overspend(
        &self,
        current: &WeeklySummary,
        previous: &WeeklySummary,
    ) -> Vec<RuleOutcome> {
        let mut triggers = Vec::new();

        for (category, &current_amount) in &current.category_totals {
            let previous_amount = previous.category_totals.get(category).copied().unwrap_or(0.0);

            // No baseline for categories that are new this week
            if previous_amount <= 0.0 {
                continue;
            }

            let increase = (current_amount - previous_amount) / previous_amount;
            if increase > self.thresholds.category_overspend {
                triggers.push(RuleOutcome::new(
                    RuleId::CategoryOverspend,
                    true,
                    data(json!({
                        "category": category,
                        "current_week_amount": current_amount,
                        "previous_week_amount": previous_amount,
                        "increase_percentage": round2(increase * 100.0),
                        "threshold": round2(self.thresholds.category_overspend * 100.0),
                    })),
                ));
            }
        }

        triggers
    }

    fn check_weekly_spending_spike(
        &self,
        current: &WeeklySummary,
        previous: &WeeklySummary,
    ) -> RuleOutcome {
        let current_total = current.total_expenses;
        let previous_total = previous.total_expenses;

        if previous_total <= 0.0 {
            return RuleOutcome::new(RuleId::WeeklySpendingSpike, false, RuleData::new());
        }

        let increase = (current_total - previous_total) / previous_total;

        RuleOutcome::new(
            RuleId::WeeklySpendingSpike,
            increase > self.thresholds.weekly_spike,
            data(json!({
                "current_week_total": current_total,
                "previous_week_total": previous_total,
                "increase_percentage": round2(increase * 100.0),
                "threshold": round2(self.thresholds.weekly_spike * 100.0),
            })),
        )
    }

    fn check_frequent_small_purchases(&self, current: &WeeklySummary) -> RuleOutcome {
        let count = current.small_transaction_count;
        let total = current.small_transaction_total;
        let average = if count > 0 {
            round2(total / count as f64)
        } else {
            0.0
        };

        RuleOutcome::new(
            RuleId::FrequentSmallPurchases,
            count >= self.thresholds.small_purchase_count,
            data(json!({
                "transaction_count": count,
                "total_amount": total,
                "average_amount": average,
                "count_threshold": self.thresholds.small_purchase_count,
                "amount_limit": self.thresholds.small_purchase_amount_limit,
            })),
        )
    }
}

/// Round half away from zero to 2 decimal places
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn data(value: serde_json::Value) -> RuleData {
    match value {
        serde_json::Value::Object(map) => map,
        _ => RuleData::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn summary(total: f64, categories: &[(&str, f64)]) -> WeeklySummary {
        WeeklySummary {
            total_expenses: total,
            transaction_count: categories.len() as i64,
            small_transaction_count: 0,
            small_transaction_total: 0.0,
            category_totals: categories
                .iter()
                .map(|(name, amount)| (name.to_string(), *amount))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn find(outcomes: &[RuleOutcome], rule: RuleId) -> Option<&RuleOutcome> {
        outcomes.iter().find(|o| o.rule_id == rule)
    }

    #[test]
    fn test_food_30_percent_increase_triggers_both() {
        let evaluator = RuleEvaluator::default();
        let outcomes = evaluator.evaluate(
            &summary(130.0, &[("Food", 130.0)]),
            &summary(100.0, &[("Food", 100.0)]),
        );

        let overspend = find(&outcomes, RuleId::CategoryOverspend).unwrap();
        assert!(overspend.triggered);
        assert_eq!(overspend.category(), Some("Food"));
        assert_eq!(overspend.data["increase_percentage"], json!(30.0));
        assert_eq!(overspend.data["threshold"], json!(25.0));
        assert_eq!(overspend.data["previous_week_amount"], json!(100.0));

        let spike = find(&outcomes, RuleId::WeeklySpendingSpike).unwrap();
        assert!(spike.triggered);
        assert_eq!(spike.data["increase_percentage"], json!(30.0));
        assert_eq!(spike.data["threshold"], json!(20.0));
    }

    #[test]
    fn test_category_overspend_skips_zero_baseline() {
        let evaluator = RuleEvaluator::default();
        let outcomes = evaluator.evaluate(
            &summary(500.0, &[("Travel", 400.0), ("Food", 100.0)]),
            &summary(100.0, &[("Food", 100.0), ("Travel", 0.0)]),
        );
        assert!(outcomes
            .iter()
            .filter(|o| o.rule_id == RuleId::CategoryOverspend)
            .all(|o| o.category() != Some("Travel")));
    }

    #[test]
    fn test_category_overspend_exactly_at_threshold_does_not_trigger() {
        let evaluator = RuleEvaluator::default();
        let outcomes = evaluator.evaluate(
            &summary(125.0, &[("Food", 125.0)]),
            &summary(100.0, &[("Food", 100.0)]),
        );
        assert!(find(&outcomes, RuleId::CategoryOverspend).is_none());
    }

    #[test]
    fn test_category_overspend_one_outcome_per_category() {
        let evaluator = RuleEvaluator::default();
        let outcomes = evaluator.evaluate(
            &summary(400.0, &[("Food", 200.0), ("Fun", 150.0), ("Rent", 50.0)]),
            &summary(250.0, &[("Food", 100.0), ("Fun", 100.0), ("Rent", 50.0)]),
        );
        let categories: Vec<_> = outcomes
            .iter()
            .filter(|o| o.rule_id == RuleId::CategoryOverspend)
            .filter_map(|o| o.category())
            .collect();
        assert_eq!(categories, vec!["Food", "Fun"]);
    }

    #[test]
    fn test_spike_without_baseline_is_not_triggered_and_empty() {
        let evaluator = RuleEvaluator::default();
        let outcomes = evaluator.evaluate(&summary(900.0, &[]), &summary(0.0, &[]));
        let spike = find(&outcomes, RuleId::WeeklySpendingSpike).unwrap();
        assert!(!spike.triggered);
        assert!(spike.data.is_empty());
    }

    #[test]
    fn test_spike_below_threshold_still_reports_data() {
        let evaluator = RuleEvaluator::default();
        let outcomes = evaluator.evaluate(&summary(110.0, &[]), &summary(100.0, &[]));
        let spike = find(&outcomes, RuleId::WeeklySpendingSpike).unwrap();
        assert!(!spike.triggered);
        assert_eq!(spike.data["increase_percentage"], json!(10.0));
    }

    #[test]
    fn test_small_purchases_count_threshold() {
        let evaluator = RuleEvaluator::default();
        let mut current = summary(50.0, &[]);
        current.small_transaction_count = 10;
        current.small_transaction_total = 50.0;

        let outcomes = evaluator.evaluate(&current, &WeeklySummary::default());
        let small = find(&outcomes, RuleId::FrequentSmallPurchases).unwrap();
        assert!(small.triggered);
        assert_eq!(small.data["transaction_count"], json!(10));
        assert_eq!(small.data["average_amount"], json!(5.0));
        assert_eq!(small.data["count_threshold"], json!(10));
        assert_eq!(small.data["amount_limit"], json!(10.0));

        current.small_transaction_count = 9;
        let outcomes = evaluator.evaluate(&current, &WeeklySummary::default());
        assert!(!find(&outcomes, RuleId::FrequentSmallPurchases).unwrap().triggered);
    }

    #[test]
    fn test_small_purchases_zero_count_average() {
        let evaluator = RuleEvaluator::default();
        let outcomes = evaluator.evaluate(&WeeklySummary::default(), &WeeklySummary::default());
        let small = find(&outcomes, RuleId::FrequentSmallPurchases).unwrap();
        assert!(!small.triggered);
        assert_eq!(small.data["average_amount"], json!(0.0));
    }

    #[test]
    fn test_spike_and_small_always_present() {
        let evaluator = RuleEvaluator::default();
        let outcomes = evaluator.evaluate(&WeeklySummary::default(), &WeeklySummary::default());
        assert_eq!(outcomes.len(), 2);
        assert!(evaluator
            .triggered(&WeeklySummary::default(), &WeeklySummary::default())
            .is_empty());
    }

    #[test]
    fn test_injected_thresholds() {
        let evaluator = RuleEvaluator::new(RuleThresholds {
            weekly_spike: 0.05,
            small_purchase_count: 2,
            ..Default::default()
        });
        let mut current = summary(110.0, &[]);
        current.small_transaction_count = 2;
        current.small_transaction_total = 8.0;

        let triggered = evaluator.triggered(&current, &summary(100.0, &[]));
        assert!(find(&triggered, RuleId::WeeklySpendingSpike).is_some());
        assert!(find(&triggered, RuleId::FrequentSmallPurchases).is_some());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(30.000000000000004), 30.0);
        assert_eq!(round2(33.3333), 33.33);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
    }
}
