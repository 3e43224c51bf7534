//! Weekly progress handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::check_user_id;
use crate::{ApiResponse, AppError, AppState};
use nudge_core::models::UserProgress;

/// Maximum number of weeks returned at once
const MAX_LIMIT: usize = 52;

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    12
}

/// GET /api/users/:user_id/progress - Recent weeks, newest first
pub async fn list_progress(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Query(params): Query<ProgressQuery>,
) -> Result<Json<ApiResponse<Vec<UserProgress>>>, AppError> {
    let user_id = check_user_id(user_id)?;
    let limit = params.limit.clamp(1, MAX_LIMIT);
    let progress = state.db.recent_progress(user_id, limit)?;
    Ok(ApiResponse::ok(progress))
}
