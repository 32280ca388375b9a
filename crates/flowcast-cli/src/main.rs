//! Flowcast CLI - Household finance manager
//!
//! Usage:
//!   flowcast init                 Initialize database
//!   flowcast detect               Detect recurring patterns
//!   flowcast upcoming --days 30   Show expected charges
//!   flowcast serve --port 3000    Start web server

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
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt),
        Commands::Accounts { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(AccountsAction::List) => commands::cmd_accounts_list(&db),
                Some(AccountsAction::Add { name, account_type }) => {
                    commands::cmd_accounts_add(&db, &name, account_type.as_deref())
                }
            }
        }
        Commands::Transactions { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_transactions_list(&db, None, 20),
                Some(TransactionsAction::List { account, limit }) => {
                    commands::cmd_transactions_list(&db, account, limit)
                }
                Some(TransactionsAction::Add {
                    account,
                    date,
                    amount,
                    counterparty,
                    description,
                }) => commands::cmd_transactions_add(
                    &db,
                    account,
                    &date,
                    amount,
                    counterparty.as_deref(),
                    &description,
                ),
            }
        }
        Commands::Detect { account, force } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_detect(&db, account, force)
        }
        Commands::Recurring { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_recurring_list(&db, None, false),
                Some(RecurringAction::List { account, active }) => {
                    commands::cmd_recurring_list(&db, account, active)
                }
                Some(RecurringAction::Rename { id, name }) => {
                    commands::cmd_recurring_rename(&db, id, &name)
                }
                Some(RecurringAction::Activate { id }) => {
                    commands::cmd_recurring_set_active(&db, id, true)
                }
                Some(RecurringAction::Deactivate { id }) => {
                    commands::cmd_recurring_set_active(&db, id, false)
                }
                Some(RecurringAction::Summary) => commands::cmd_recurring_summary(&db),
            }
        }
        Commands::Upcoming { days } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_upcoming(&db, days)
        }
        Commands::Forecast => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_forecast(&db)
        }
        Commands::Serve {
            port,
            host,
            static_dir,
        } => commands::cmd_serve(&cli.db, &host, port, cli.no_encrypt, static_dir.as_deref()).await,
    }
}
