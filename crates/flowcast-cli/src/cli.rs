//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Flowcast - Recurring-transaction detection and cashflow forecasting
#[derive(Parser)]
#[command(name = "flowcast")]
#[command(about = "Self-hosted household finance manager", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "flowcast.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set FLOWCAST_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Show database status (encryption, counts)
    Status,

    /// Manage accounts
    Accounts {
        #[command(subcommand)]
        action: Option<AccountsAction>,
    },

    /// Manage transactions
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Detect recurring transaction patterns
    Detect {
        /// Account to detect for (all accounts if omitted)
        #[arg(short, long)]
        account: Option<i64>,

        /// Wipe existing patterns and re-detect from scratch.
        /// Discards user renames/category assignments/deactivations.
        #[arg(long)]
        force: bool,
    },

    /// Manage detected recurring patterns
    Recurring {
        #[command(subcommand)]
        action: Option<RecurringAction>,
    },

    /// Show charges expected in the next N days
    Upcoming {
        /// Window size in days
        #[arg(short, long, default_value = "30")]
        days: u32,
    },

    /// Show the expected cashflow for the current month
    Forecast,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum AccountsAction {
    /// List accounts
    List,
    /// Add an account
    Add {
        /// Account name
        name: String,
        /// Account type: checking, savings, credit
        #[arg(short = 't', long)]
        account_type: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List recent transactions
    List {
        /// Account to list (all accounts if omitted)
        #[arg(short, long)]
        account: Option<i64>,

        /// Maximum number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },
    /// Record a transaction manually
    Add {
        /// Account ID
        #[arg(short, long)]
        account: i64,
        /// Transaction date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Signed amount in minor units (negative = expense)
        #[arg(long)]
        amount: i64,
        /// Counterparty identifier (IBAN or payee)
        #[arg(long)]
        counterparty: Option<String>,
        /// Description
        description: String,
    },
}

#[derive(Subcommand)]
pub enum RecurringAction {
    /// List detected patterns
    List {
        /// Account to list (all accounts if omitted)
        #[arg(short, long)]
        account: Option<i64>,

        /// Only active patterns
        #[arg(long)]
        active: bool,
    },
    /// Rename a pattern (survives merge re-detection)
    Rename {
        /// Pattern ID
        id: i64,
        /// New display name
        name: String,
    },
    /// Reactivate a pattern
    Activate {
        /// Pattern ID
        id: i64,
    },
    /// Soft-delete a pattern (hidden from forecasts)
    Deactivate {
        /// Pattern ID
        id: i64,
    },
    /// Show the aggregate summary
    Summary,
}
