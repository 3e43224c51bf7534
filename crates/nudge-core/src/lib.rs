//! Nudge Core Library
//!
//! Shared functionality for the Nudge weekly spending coach:
//! - Database access and migrations
//! - Weekly expense aggregation
//! - Spending rules, feedback levels and message templates
//! - Cached weekly evaluation with adaptive feedback
//! - Demo data seeding

pub mod config;
pub mod db;
pub mod demo;
pub mod error;
pub mod models;
pub mod rules;

pub use config::{EngineConfig, RuleThresholds};
pub use db::{Database, TransactionUpdate};
pub use error::{Error, Result};
pub use rules::{Evaluator, FeedbackLevel, RuleId, RuleOutcome, WeekRange};
