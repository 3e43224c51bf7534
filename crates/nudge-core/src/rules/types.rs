//! Core types for the rule engine

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Payload attached to a rule outcome (string keys, number or string values)
pub type RuleData = serde_json::Map<String, serde_json::Value>;

/// The fixed set of behavioral spending rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    /// A single category grew too much week over week
    CategoryOverspend,
    /// Total weekly expenses grew too much week over week
    WeeklySpendingSpike,
    /// Too many small purchases in one week
    FrequentSmallPurchases,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::CategoryOverspend => "category_overspend",
            RuleId::WeeklySpendingSpike => "weekly_spending_spike",
            RuleId::FrequentSmallPurchases => "frequent_small_purchases",
        }
    }

    /// Every rule, in evaluation order
    pub fn all() -> &'static [RuleId] {
        &[
            RuleId::CategoryOverspend,
            RuleId::WeeklySpendingSpike,
            RuleId::FrequentSmallPurchases,
        ]
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RuleId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "category_overspend" => Ok(RuleId::CategoryOverspend),
            "weekly_spending_spike" => Ok(RuleId::WeeklySpendingSpike),
            "frequent_small_purchases" => Ok(RuleId::FrequentSmallPurchases),
            _ => Err(format!("Unknown rule: {}", s)),
        }
    }
}

/// Feedback tone, chosen from the user's recent history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackLevel {
    /// Simple, directive messaging for users who keep triggering a rule
    #[default]
    Basic,
    /// Trend-aware messaging for users who have been avoiding a rule
    Advanced,
}

impl FeedbackLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackLevel::Basic => "basic",
            FeedbackLevel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for FeedbackLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FeedbackLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(FeedbackLevel::Basic),
            "advanced" => Ok(FeedbackLevel::Advanced),
            _ => Err(format!("Unknown feedback level: {}", s)),
        }
    }
}

/// Result of running one rule against a pair of weeks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleOutcome {
    pub rule_id: RuleId,
    pub triggered: bool,
    pub data: RuleData,
}

impl RuleOutcome {
    pub fn new(rule_id: RuleId, triggered: bool, data: RuleData) -> Self {
        Self {
            rule_id,
            triggered,
            data,
        }
    }

    /// Category this outcome is scoped to (category_overspend only)
    pub fn category(&self) -> Option<&str> {
        self.data.get("category").and_then(|v| v.as_str())
    }
}

/// A Monday–Sunday week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekRange {
    /// The ISO week containing `date`
    pub fn containing(date: NaiveDate) -> Self {
        let start = date - Duration::days(date.weekday().num_days_from_monday() as i64);
        Self {
            start,
            end: start + Duration::days(6),
        }
    }

    /// The week immediately before this one
    pub fn previous(&self) -> Self {
        Self {
            start: self.start - Duration::days(7),
            end: self.end - Duration::days(7),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Aggregated expenses for one user and one week (never persisted)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub total_expenses: f64,
    pub transaction_count: i64,
    pub small_transaction_count: i64,
    pub small_transaction_total: f64,
    /// Expense totals per category name, ordered by name
    pub category_totals: BTreeMap<String, f64>,
}
