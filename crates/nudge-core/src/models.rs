//! Domain models for Nudge

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rules::{FeedbackLevel, RuleData, RuleId, RuleOutcome, WeekRange};

/// Whether a transaction is money out or money in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    #[default]
    Expense,
    Income,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            _ => Err(format!("Unknown transaction kind: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user-owned spending category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub kind: TransactionKind,
    pub created_at: DateTime<Utc>,
}

/// A stored transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub category_id: Option<i64>,
    /// Resolved category name (joined)
    pub category: Option<String>,
    pub kind: TransactionKind,
    /// Always positive; `kind` carries the direction
    pub amount: f64,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A transaction to be inserted
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: i64,
    pub category_id: Option<i64>,
    pub kind: TransactionKind,
    pub amount: f64,
    pub date: NaiveDate,
    pub description: Option<String>,
}

impl NewTransaction {
    /// Shorthand for an expense in a category
    pub fn expense(user_id: i64, category_id: Option<i64>, amount: f64, date: NaiveDate) -> Self {
        Self {
            user_id,
            category_id,
            kind: TransactionKind::Expense,
            amount,
            date,
            description: None,
        }
    }
}

/// One week of rule compliance for one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProgress {
    pub id: i64,
    pub user_id: i64,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub rules_triggered: Vec<RuleId>,
    pub rules_not_triggered: Vec<RuleId>,
    /// 0-100, see `rules::score`
    pub improvement_score: i32,
    /// Triggered outcomes of the evaluation that last wrote this row
    pub triggered_outcomes: Vec<RuleOutcome>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProgress {
    pub fn triggered(&self, rule: RuleId) -> bool {
        self.rules_triggered.contains(&rule)
    }
}

/// Values written by a progress upsert, keyed by (user_id, week.start)
#[derive(Debug, Clone)]
pub struct ProgressUpsert {
    pub user_id: i64,
    pub week: WeekRange,
    /// Distinct triggered rules; the complement is stored as not-triggered
    pub rules_triggered: Vec<RuleId>,
    pub improvement_score: i32,
    pub triggered_outcomes: Vec<RuleOutcome>,
}

impl ProgressUpsert {
    /// Rules from the fixed universe that did not trigger
    pub fn rules_not_triggered(&self) -> Vec<RuleId> {
        RuleId::all()
            .iter()
            .copied()
            .filter(|r| !self.rules_triggered.contains(r))
            .collect()
    }
}

/// Stored feedback for one rule (and category) in one week
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: i64,
    pub user_id: i64,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub rule_id: RuleId,
    pub category_name: Option<String>,
    pub template_id: String,
    pub level: FeedbackLevel,
    pub explanation: String,
    pub suggestion: String,
    /// Rule outcome data the text was rendered from
    pub data: RuleData,
    pub displayed: bool,
    pub user_acknowledged: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values written by a feedback upsert.
///
/// Key: (user_id, week.start, rule_id, category_name).
#[derive(Debug, Clone)]
pub struct FeedbackUpsert {
    pub user_id: i64,
    pub week: WeekRange,
    pub rule_id: RuleId,
    pub category_name: Option<String>,
    pub template_id: String,
    pub level: FeedbackLevel,
    pub explanation: String,
    pub suggestion: String,
    pub data: RuleData,
}

/// A page of feedback records, newest week first
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackPage {
    pub items: Vec<FeedbackRecord>,
    pub current_page: i64,
    pub last_page: i64,
    pub per_page: i64,
    pub total: i64,
}

/// Current and previous week of an evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationWeeks {
    pub current: WeekRange,
    pub previous: WeekRange,
}

/// Output of one `Evaluator::evaluate` call
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResult {
    pub user_id: i64,
    pub evaluation_date: NaiveDateTime,
    pub weeks: EvaluationWeeks,
    pub triggered_rules: Vec<RuleOutcome>,
    pub improvement_score: i32,
    pub feedback: Vec<FeedbackRecord>,
    /// Set when the result was rebuilt from storage instead of recomputed
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub cached: bool,
}
