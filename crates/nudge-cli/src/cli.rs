//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Nudge - Weekly spending feedback that adapts to you
#[derive(Parser)]
#[command(name = "nudge")]
#[command(about = "Weekly spending rules with adaptive feedback", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "nudge.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set NUDGE_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Rule config file (defaults to ~/.local/share/nudge/config/rules.toml,
    /// then built-in thresholds)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Evaluate the spending rules for one week
    Evaluate {
        /// User ID
        #[arg(short, long)]
        user: i64,

        /// Any date inside the week (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<String>,

        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Browse and acknowledge feedback
    Feedback {
        #[command(subcommand)]
        action: FeedbackAction,
    },

    /// Show weekly progress, newest first
    Progress {
        /// User ID
        #[arg(short, long)]
        user: i64,

        /// Number of weeks to show
        #[arg(short, long, default_value = "8")]
        limit: usize,
    },

    /// Manage transactions (add, list, update)
    Transactions {
        #[command(subcommand)]
        action: TransactionsAction,
    },

    /// Seed five weeks of demo data for a user and evaluate them
    SeedDemo {
        /// User ID to seed (must have no transactions yet)
        #[arg(short, long, default_value = "1")]
        user: i64,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

#[derive(Subcommand)]
pub enum FeedbackAction {
    /// List feedback, newest week first
    List {
        /// User ID
        #[arg(short, long)]
        user: i64,

        /// Page number
        #[arg(long, default_value = "1")]
        page: i64,

        /// Items per page
        #[arg(long, default_value = "20")]
        per_page: i64,
    },

    /// Mark feedback as acknowledged
    Ack {
        /// User ID
        #[arg(short, long)]
        user: i64,

        /// Feedback ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// Record an expense
    Add {
        /// User ID
        #[arg(short, long)]
        user: i64,

        /// Amount (positive)
        #[arg(short, long)]
        amount: f64,

        /// Category name (created if missing)
        #[arg(short, long)]
        category: Option<String>,

        /// Transaction date (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<String>,

        /// Description
        #[arg(long)]
        description: Option<String>,

        /// Record as income instead of an expense
        #[arg(long)]
        income: bool,
    },

    /// List recent transactions
    List {
        /// User ID
        #[arg(short, long)]
        user: i64,

        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Change an existing transaction
    Update {
        /// User ID
        #[arg(short, long)]
        user: i64,

        /// Transaction ID
        id: i64,

        /// New amount
        #[arg(short, long)]
        amount: Option<f64>,

        /// New category name (created if missing)
        #[arg(short, long)]
        category: Option<String>,

        /// New date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,
    },
}
