//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod evaluate;
pub mod feedback;
pub mod health;
pub mod progress;

// Re-export all handlers for use in router
pub use evaluate::*;
pub use feedback::*;
pub use health::*;
pub use progress::*;

use crate::AppError;

/// Reject non-positive user ids before touching the database
pub(crate) fn check_user_id(user_id: i64) -> Result<i64, AppError> {
    if user_id <= 0 {
        return Err(AppError::bad_request("user_id must be a positive integer"));
    }
    Ok(user_id)
}
