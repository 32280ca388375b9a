//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database
//! - `cmd_detect` - Run recurring pattern detection

use std::path::Path;

use anyhow::{Context, Result};
use flowcast_core::{db::Database, detect::RecurringDetector};

use super::{format_cents, truncate};

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path.to_str().unwrap();
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let _db = open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Add an account: flowcast accounts add \"Joint checking\"");
    println!("  2. Detect recurring patterns: flowcast detect");
    println!("  3. Start web UI: flowcast serve");

    Ok(())
}

pub fn cmd_detect(db: &Database, account: Option<i64>, force: bool) -> Result<()> {
    println!("🔍 Detecting recurring transactions...");
    if force {
        println!("   Mode: force (existing patterns and overrides are discarded)");
    }

    let detector = RecurringDetector::new(db);

    let accounts = match account {
        Some(id) => {
            let account = db
                .get_account(id)?
                .ok_or_else(|| anyhow::anyhow!("Account not found: {}", id))?;
            vec![account]
        }
        None => db.list_accounts()?,
    };

    if accounts.is_empty() {
        println!("No accounts yet. Add one with: flowcast accounts add <name>");
        return Ok(());
    }

    let mut total = 0;
    for account in &accounts {
        tracing::debug!(account_id = account.id, "Running detection");
        let patterns = detector.detect(account.id, force)?;
        total += patterns.len();

        println!();
        println!(
            "   {} - {} pattern(s)",
            account.name,
            patterns.len()
        );
        for pattern in &patterns {
            println!(
                "     {:24} │ {:>10}/{:<9} │ confidence {:.2} │ next {}",
                truncate(&pattern.display_name, 24),
                format_cents(pattern.predicted_amount_cents),
                pattern.frequency.as_str(),
                pattern.confidence_score,
                pattern.next_expected
            );
        }
    }

    println!();
    println!("📊 {} recurring pattern(s) detected", total);

    Ok(())
}
