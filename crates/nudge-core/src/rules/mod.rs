//! Rule Engine - weekly spending rules with adaptive feedback
//!
//! Once per ISO week (Monday to Sunday) the engine compares a user's
//! expenses against the previous week, records which rules fired, and writes
//! one piece of feedback per triggered rule. The tone of that feedback adapts
//! to how the user has been doing lately.
//!
//! ## Rules
//!
//! - **category_overspend** - one category grew more than 25% week over week
//! - **weekly_spending_spike** - total expenses grew more than 20%
//! - **frequent_small_purchases** - ten or more purchases under 10.00
//!
//! ## Feedback levels
//!
//! Two or more consecutive prior weeks with a rule triggered keep it at
//! `basic`. Two or more consecutive clean weeks move it to `advanced`, which
//! adds trend context from earlier feedback.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nudge_core::rules::Evaluator;
//!
//! let evaluator = Evaluator::new(&db, EngineConfig::load()?);
//! let result = evaluator.evaluate(user_id, None)?;
//! for fb in &result.feedback {
//!     println!("{}", fb.explanation);
//! }
//! ```

pub mod composer;
pub mod engine;
pub mod evaluator;
pub mod levels;
pub mod score;
pub mod store;
pub mod templates;
pub mod types;

pub use composer::{format_money, ComposedFeedback, FeedbackComposer};
pub use engine::{parse_target_date, Evaluator};
pub use evaluator::RuleEvaluator;
pub use levels::FeedbackLevelSelector;
pub use score::improvement_score;
pub use store::{EvaluationStore, FeedbackHistoryStore, ProgressHistoryStore, WeeklyAggregator};
pub use templates::{builtin_template, Template, TemplateLibrary};
pub use types::{FeedbackLevel, RuleData, RuleId, RuleOutcome, WeekRange, WeeklySummary};
