//! Evaluation handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::check_user_id;
use crate::{ApiResponse, AppError, AppState};
use nudge_core::models::EvaluationResult;
use nudge_core::rules::{parse_target_date, Evaluator};

/// Query parameters for an evaluation
#[derive(Debug, Deserialize)]
pub struct EvaluateQuery {
    /// Any date inside the week to evaluate (YYYY-MM-DD, default: today)
    pub date: Option<String>,
}

/// GET /api/users/:user_id/evaluate - Evaluate the week containing `date`
///
/// Returns the stored result when no transaction in the week changed since
/// the last run.
pub async fn evaluate(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Query(params): Query<EvaluateQuery>,
) -> Result<Json<ApiResponse<EvaluationResult>>, AppError> {
    let user_id = check_user_id(user_id)?;
    let target = params
        .date
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(parse_target_date)
        .transpose()?;

    let evaluator = Evaluator::new(&state.db, state.config.engine.clone());
    let result = evaluator.evaluate(user_id, target)?;

    Ok(ApiResponse::ok(result))
}
