//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` - Rule config from `--config` or the default location
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use nudge_core::db::Database;
use nudge_core::rules::parse_target_date;
use nudge_core::EngineConfig;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Load rule thresholds, preferring an explicit `--config` file
pub fn load_config(config_path: Option<&Path>) -> Result<EngineConfig> {
    let config = match config_path {
        Some(path) => EngineConfig::from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EngineConfig::load().context("Failed to load config")?,
    };
    tracing::debug!(?config, "Rule config loaded");
    Ok(config)
}

/// Parse an optional `YYYY-MM-DD` argument, defaulting to today
pub fn parse_date_or_today(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(s) => Ok(parse_target_date(s)?),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    // Migrations run on open
    let db = open_db(db_path, no_encrypt)?;
    println!("   Schema ready at {}", db.path());

    if db.is_encrypted()? {
        println!("   🔒 Encryption: ENABLED");
    } else {
        println!("   ⚠️  Encryption: DISABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Add spending: nudge transactions add --user 1 --amount 12.50 --category Food");
    println!("  2. Or try demo data: nudge seed-demo --user 1");
    println!("  3. Evaluate this week: nudge evaluate --user 1");

    Ok(())
}
