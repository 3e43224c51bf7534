//! Evaluator - weekly rule evaluation with cached results
//!
//! A (user, week) pair is evaluated once and then served from storage until a
//! transaction dated in that week changes.

use std::collections::BTreeSet;

use chrono::{Local, NaiveDate, NaiveTime};

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::models::{
    EvaluationResult, EvaluationWeeks, FeedbackRecord, FeedbackUpsert, ProgressUpsert,
    UserProgress,
};

use super::composer::FeedbackComposer;
use super::evaluator::RuleEvaluator;
use super::levels::FeedbackLevelSelector;
use super::score::improvement_score;
use super::store::EvaluationStore;
use super::templates::TemplateLibrary;
use super::types::{FeedbackLevel, RuleId, RuleOutcome, WeekRange};

/// Parse a `YYYY-MM-DD` target date
pub fn parse_target_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| Error::InvalidInput(format!("Invalid date '{}', expected YYYY-MM-DD", s)))
}

/// Top-level entry point for weekly evaluations
pub struct Evaluator<'a, S: EvaluationStore + ?Sized> {
    store: &'a S,
    rules: RuleEvaluator,
    levels: FeedbackLevelSelector,
    templates: TemplateLibrary,
    composer: FeedbackComposer,
    history_depth: usize,
}

impl<'a, S: EvaluationStore + ?Sized> Evaluator<'a, S> {
    pub fn new(store: &'a S, config: EngineConfig) -> Self {
        Self {
            store,
            rules: RuleEvaluator::new(config.thresholds),
            levels: FeedbackLevelSelector::new(config.streak_weeks),
            templates: TemplateLibrary::builtin(),
            composer: FeedbackComposer::new(config.history_depth),
            history_depth: config.history_depth,
        }
    }

    /// Replace the template catalog
    pub fn with_templates(mut self, templates: TemplateLibrary) -> Self {
        self.templates = templates;
        self
    }

    /// Evaluate the week containing `target_date` (today if `None`).
    ///
    /// Returns the stored result with `cached: true` when the week was already
    /// evaluated and none of its transactions changed since.
    pub fn evaluate(&self, user_id: i64, target_date: Option<NaiveDate>) -> Result<EvaluationResult> {
        if user_id <= 0 {
            return Err(Error::InvalidInput(format!("Invalid user id: {}", user_id)));
        }

        let date = target_date.unwrap_or_else(|| Local::now().date_naive());
        let current = WeekRange::containing(date);
        let weeks = EvaluationWeeks {
            current,
            previous: current.previous(),
        };

        let result = match self.cached(user_id, current).map_err(Error::evaluation)? {
            Some(progress) => self.reconstruct(user_id, date, weeks, progress),
            None => self.run(user_id, date, weeks),
        };

        result.map_err(|e| {
            tracing::error!(user_id, week_start = %current.start, error = %e, "Evaluation failed");
            Error::evaluation(e)
        })
    }

    /// Progress row for the week if it is still fresh
    fn cached(&self, user_id: i64, week: WeekRange) -> Result<Option<UserProgress>> {
        let Some(progress) = self.store.progress_for_week(user_id, week.start)? else {
            return Ok(None);
        };

        match self.store.last_transaction_update(user_id, week)? {
            Some(changed) if changed > progress.updated_at => {
                tracing::debug!(
                    user_id,
                    week_start = %week.start,
                    "Transactions changed since last evaluation"
                );
                Ok(None)
            }
            _ => Ok(Some(progress)),
        }
    }

    fn reconstruct(
        &self,
        user_id: i64,
        date: NaiveDate,
        weeks: EvaluationWeeks,
        progress: UserProgress,
    ) -> Result<EvaluationResult> {
        let triggered = progress.triggered_outcomes;

        let mut feedback: Vec<FeedbackRecord> = self
            .store
            .feedback_for_week(user_id, weeks.current.start)?
            .into_iter()
            .filter(|record| {
                triggered.iter().any(|o| {
                    o.rule_id == record.rule_id && o.category() == record.category_name.as_deref()
                })
            })
            .collect();
        sort_feedback(&mut feedback);

        tracing::info!(
            user_id,
            week_start = %weeks.current.start,
            cached = true,
            "Returning stored evaluation"
        );

        Ok(EvaluationResult {
            user_id,
            evaluation_date: date.and_time(NaiveTime::MIN),
            weeks,
            triggered_rules: triggered,
            improvement_score: progress.improvement_score,
            feedback,
            cached: true,
        })
    }

    fn run(&self, user_id: i64, date: NaiveDate, weeks: EvaluationWeeks) -> Result<EvaluationResult> {
        let limit = self.rules.thresholds().small_purchase_amount_limit;
        let current = self.store.weekly_summary(user_id, weeks.current, limit)?;
        let previous = self.store.weekly_summary(user_id, weeks.previous, limit)?;

        let outcomes = self.rules.evaluate(&current, &previous);
        tracing::debug!(user_id, ?outcomes, "Rule outcomes");

        let triggered: Vec<RuleOutcome> = outcomes.into_iter().filter(|o| o.triggered).collect();
        let triggered_ids: Vec<RuleId> = triggered
            .iter()
            .map(|o| o.rule_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let prior = self
            .store
            .recent_progress_before(user_id, weeks.current.start, self.history_depth)?;
        let levels = self.levels.select_levels(&triggered_ids, &prior);

        let mut feedback = Vec::with_capacity(triggered.len());
        for outcome in &triggered {
            let level = levels.get(&outcome.rule_id).copied().unwrap_or_default();
            let Some(template) = self.templates.get(outcome.rule_id, level) else {
                tracing::warn!(
                    rule = outcome.rule_id.as_str(),
                    level = level.as_str(),
                    "No template for rule, skipping feedback"
                );
                continue;
            };

            let history = if level == FeedbackLevel::Advanced {
                self.store.recent_feedback_for_rule(
                    user_id,
                    outcome.rule_id,
                    outcome.category(),
                    weeks.current.start,
                    self.history_depth,
                )?
            } else {
                Vec::new()
            };

            let composed = self.composer.compose(template, &outcome.data, level, &history);
            feedback.push(FeedbackUpsert {
                user_id,
                week: weeks.current,
                rule_id: outcome.rule_id,
                category_name: outcome.category().map(String::from),
                template_id: composed.template_id.to_string(),
                level,
                explanation: composed.explanation,
                suggestion: composed.suggestion,
                data: outcome.data.clone(),
            });
        }

        let score = improvement_score(&triggered_ids, &prior);
        let progress = ProgressUpsert {
            user_id,
            week: weeks.current,
            rules_triggered: triggered_ids,
            improvement_score: score,
            triggered_outcomes: triggered.clone(),
        };

        let (_, mut records) = self.store.commit_evaluation(&progress, &feedback)?;
        sort_feedback(&mut records);

        tracing::info!(
            user_id,
            week_start = %weeks.current.start,
            triggered = triggered.len(),
            feedback = records.len(),
            improvement_score = score,
            cached = false,
            "Evaluated week"
        );

        Ok(EvaluationResult {
            user_id,
            evaluation_date: date.and_time(NaiveTime::MIN),
            weeks,
            triggered_rules: triggered,
            improvement_score: score,
            feedback: records,
            cached: false,
        })
    }
}

/// Rule order, then category name
fn sort_feedback(records: &mut [FeedbackRecord]) {
    records.sort_by(|a, b| {
        a.rule_id
            .cmp(&b.rule_id)
            .then_with(|| a.category_name.cmp(&b.category_name))
    });
}
