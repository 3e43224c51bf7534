//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init and shared utilities (open_db, load_config, parse_date)
//! - `evaluate` - Weekly evaluation, progress and demo seeding
//! - `feedback` - Feedback listing and acknowledgement
//! - `serve` - Web server command
//! - `transactions` - Transaction commands (add, list, update)

pub mod core;
pub mod evaluate;
pub mod feedback;
pub mod serve;
pub mod transactions;

// Re-export command functions for main.rs
pub use core::*;
pub use evaluate::*;
pub use feedback::*;
pub use serve::*;
pub use transactions::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
