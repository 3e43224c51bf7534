//! Rule engine configuration
//!
//! Thresholds and history depth are plain values injected into the evaluator,
//! so tests can build whatever configuration they need.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/nudge/config/rules.toml)
//!    or an explicit path
//! 2. Fall back to embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/rules.toml");

/// Numeric limits for the three rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleThresholds {
    /// Ratio, e.g. 0.25 = 25% week-over-week growth in one category
    pub category_overspend: f64,
    /// Ratio for total weekly expenses
    pub weekly_spike: f64,
    /// Transactions strictly below this amount are "small"
    pub small_purchase_amount_limit: f64,
    /// Small transactions per week that trigger the rule
    pub small_purchase_count: i64,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            category_overspend: 0.25,
            weekly_spike: 0.20,
            small_purchase_amount_limit: 10.00,
            small_purchase_count: 10,
        }
    }
}

/// Full engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub thresholds: RuleThresholds,
    /// Prior weeks consulted for level selection and averages
    pub history_depth: usize,
    /// Consecutive weeks needed to switch feedback level
    pub streak_weeks: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            thresholds: RuleThresholds::default(),
            history_depth: 4,
            streak_weeks: 2,
        }
    }
}

impl EngineConfig {
    /// Load from the default override location, falling back to built-ins
    pub fn load() -> Result<Self> {
        load_config(None)
    }

    /// Load from an explicit file (missing file falls back to built-ins)
    pub fn from_path(path: &Path) -> Result<Self> {
        load_config(Some(path))
    }

    /// Parse TOML content directly
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("nudge").join("config").join("rules.toml"))
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&Path>) -> Result<EngineConfig> {
    let path = match override_path {
        Some(p) => Some(p.to_path_buf()),
        None => default_config_path(),
    };

    let content = match path {
        Some(ref p) if p.exists() => {
            tracing::debug!(path = %p.display(), "Loading rule config override");
            fs::read_to_string(p)
                .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?
        }
        _ => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    thresholds: Option<RawThresholds>,
    history: Option<RawHistory>,
}

#[derive(Debug, Deserialize)]
struct RawThresholds {
    category_overspend: Option<f64>,
    weekly_spike: Option<f64>,
    small_purchase_amount_limit: Option<f64>,
    small_purchase_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawHistory {
    depth: Option<usize>,
    streak_weeks: Option<usize>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<EngineConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = EngineConfig::default();

    if let Some(t) = raw.thresholds {
        if let Some(v) = t.category_overspend {
            config.thresholds.category_overspend = v;
        }
        if let Some(v) = t.weekly_spike {
            config.thresholds.weekly_spike = v;
        }
        if let Some(v) = t.small_purchase_amount_limit {
            config.thresholds.small_purchase_amount_limit = v;
        }
        if let Some(v) = t.small_purchase_count {
            config.thresholds.small_purchase_count = v;
        }
    }

    if let Some(h) = raw.history {
        if let Some(depth) = h.depth {
            config.history_depth = depth;
        }
        if let Some(streak) = h.streak_weeks {
            config.streak_weeks = streak;
        }
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &EngineConfig) -> Result<()> {
    let t = &config.thresholds;
    if t.category_overspend < 0.0 || t.weekly_spike < 0.0 {
        return Err(Error::Config("thresholds must not be negative".into()));
    }
    if t.small_purchase_amount_limit <= 0.0 {
        return Err(Error::Config(
            "small_purchase_amount_limit must be positive".into(),
        ));
    }
    if t.small_purchase_count < 1 {
        return Err(Error::Config("small_purchase_count must be at least 1".into()));
    }
    if config.history_depth == 0 || config.streak_weeks == 0 {
        return Err(Error::Config(
            "history depth and streak_weeks must be at least 1".into(),
        ));
    }
    Ok(())
}
