//! Transaction command implementations

use anyhow::{Context, Result};
use chrono::NaiveDate;
use flowcast_core::db::Database;
use flowcast_core::models::{NewTransaction, TransactionType};

use super::{format_cents, truncate};

pub fn cmd_transactions_list(db: &Database, account: Option<i64>, limit: i64) -> Result<()> {
    let transactions = db.list_transactions(account, limit, 0)?;

    if transactions.is_empty() {
        println!("No transactions yet. Record one with:");
        println!("  flowcast transactions add --account 1 --date 2024-06-01 --amount -1499 \"NETFLIX.COM\"");
        return Ok(());
    }

    println!();
    println!("💳 Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        println!(
            "   {} │ {:>10} │ {:6} │ {}",
            tx.date,
            format_cents(tx.amount_cents),
            tx.transaction_type.as_str(),
            truncate(&tx.description, 32)
        );
    }

    Ok(())
}

pub fn cmd_transactions_add(
    db: &Database,
    account: i64,
    date: &str,
    amount_cents: i64,
    counterparty: Option<&str>,
    description: &str,
) -> Result<()> {
    db.get_account(account)?
        .ok_or_else(|| anyhow::anyhow!("Account not found: {}", account))?;

    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .context("Invalid --date format (use YYYY-MM-DD)")?;

    let transaction_type = if amount_cents < 0 {
        TransactionType::Debit
    } else {
        TransactionType::Credit
    };

    let tx = NewTransaction {
        date,
        amount_cents,
        counterparty: counterparty.map(|s| s.to_string()),
        description: description.to_string(),
        transaction_type,
        category_id: None,
    };

    match db.insert_transaction(account, &tx)? {
        Some(id) => println!("✅ Transaction recorded (ID: {})", id),
        None => println!("↩️  Skipped: identical transaction already recorded"),
    }

    Ok(())
}
