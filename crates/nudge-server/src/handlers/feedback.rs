//! Feedback history handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::check_user_id;
use crate::{ApiResponse, AppError, AppState};
use nudge_core::models::{FeedbackPage, FeedbackRecord};

/// Query parameters for listing feedback
#[derive(Debug, Deserialize)]
pub struct FeedbackQuery {
    /// Page number, 1-based (default: 1)
    #[serde(default = "default_page")]
    pub page: i64,
    /// Items per page (default: 20, max: 100)
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    20
}

/// GET /api/users/:user_id/feedback - Paginated feedback, newest week first
pub async fn list_feedback(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Query(params): Query<FeedbackQuery>,
) -> Result<Json<ApiResponse<FeedbackPage>>, AppError> {
    let user_id = check_user_id(user_id)?;
    let page = state.db.list_feedback(user_id, params.page, params.per_page)?;
    Ok(ApiResponse::ok(page))
}

/// POST /api/users/:user_id/feedback/:id/acknowledge - Acknowledge feedback
pub async fn acknowledge_feedback(
    State(state): State<Arc<AppState>>,
    Path((user_id, id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<FeedbackRecord>>, AppError> {
    let user_id = check_user_id(user_id)?;
    let record = state.db.acknowledge_feedback(user_id, id)?;
    Ok(ApiResponse::ok(record))
}

/// POST /api/users/:user_id/feedback/:id/displayed - Mark feedback as shown
pub async fn mark_feedback_displayed(
    State(state): State<Arc<AppState>>,
    Path((user_id, id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<FeedbackRecord>>, AppError> {
    let user_id = check_user_id(user_id)?;
    let record = state.db.mark_feedback_displayed(user_id, id)?;
    Ok(ApiResponse::ok(record))
}
