//! Nudge CLI - Weekly spending feedback
//!
//! Usage:
//!   nudge init                          Initialize database
//!   nudge transactions add --user 1 --amount 12.50 --category Food
//!   nudge evaluate --user 1             Evaluate the current week
//!   nudge feedback list --user 1        Browse feedback history
//!   nudge serve --port 3000             Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Evaluate { user, date, json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_evaluate(&db, config, user, date.as_deref(), json)
        }
        Commands::Feedback { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                FeedbackAction::List {
                    user,
                    page,
                    per_page,
                } => commands::cmd_feedback_list(&db, user, page, per_page),
                FeedbackAction::Ack { user, id } => commands::cmd_feedback_ack(&db, user, id),
            }
        }
        Commands::Progress { user, limit } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_progress(&db, user, limit)
        }
        Commands::Transactions { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                TransactionsAction::Add {
                    user,
                    amount,
                    category,
                    date,
                    description,
                    income,
                } => commands::cmd_transactions_add(
                    &db,
                    commands::AddTransaction {
                        user_id: user,
                        amount,
                        category: category.as_deref(),
                        date: date.as_deref(),
                        description: description.as_deref(),
                        income,
                    },
                )
                .map(|_| ()),
                TransactionsAction::List { user, limit } => {
                    commands::cmd_transactions_list(&db, user, limit)
                }
                TransactionsAction::Update {
                    user,
                    id,
                    amount,
                    category,
                    date,
                    description,
                } => commands::cmd_transactions_update(
                    &db,
                    commands::UpdateTransaction {
                        user_id: user,
                        id,
                        amount,
                        category: category.as_deref(),
                        date: date.as_deref(),
                        description: description.as_deref(),
                    },
                ),
            }
        }
        Commands::SeedDemo { user } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_seed_demo(&db, config, user)
        }
        Commands::Serve { port, host } => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_serve(&cli.db, &host, port, cli.no_encrypt, config).await
        }
    }
}
