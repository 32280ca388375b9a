//! Recurring pattern command implementations

use anyhow::Result;
use flowcast_core::db::Database;

use super::{format_cents, truncate};

pub fn cmd_recurring_list(db: &Database, account: Option<i64>, active_only: bool) -> Result<()> {
    let patterns = db.list_recurring(account, active_only, None)?;

    if patterns.is_empty() {
        println!("No recurring patterns detected yet. Run:");
        println!("  flowcast detect");
        return Ok(());
    }

    println!();
    println!("📋 Recurring Transactions");
    println!("   ─────────────────────────────────────────────────────────────────────");

    for pattern in patterns {
        let status_icon = if pattern.is_active { "✅" } else { "💤" };

        println!(
            "   {} [{}] {:24} │ {:>10}/{:<9} │ conf {:.2} │ next {}",
            status_icon,
            pattern.id,
            truncate(&pattern.display_name, 24),
            format_cents(pattern.predicted_amount_cents),
            pattern.frequency.as_str(),
            pattern.confidence_score,
            pattern.next_expected
        );
    }

    Ok(())
}

pub fn cmd_recurring_rename(db: &Database, id: i64, name: &str) -> Result<()> {
    db.get_recurring(id)?
        .ok_or_else(|| anyhow::anyhow!("Recurring pattern not found: {}", id))?;

    db.rename_recurring(id, name)?;
    println!("✅ Pattern {} renamed to \"{}\"", id, name);
    println!("   The name survives re-detection (unless run with --force)");

    Ok(())
}

pub fn cmd_recurring_set_active(db: &Database, id: i64, is_active: bool) -> Result<()> {
    db.get_recurring(id)?
        .ok_or_else(|| anyhow::anyhow!("Recurring pattern not found: {}", id))?;

    db.set_recurring_active(id, is_active)?;
    if is_active {
        println!("✅ Pattern {} reactivated", id);
    } else {
        println!("💤 Pattern {} deactivated (hidden from forecasts)", id);
    }

    Ok(())
}

pub fn cmd_recurring_summary(db: &Database) -> Result<()> {
    let summary = db.recurring_summary(None)?;

    println!();
    println!("📊 Recurring Summary");
    println!("   ─────────────────────────────");
    println!("   Patterns: {}", summary.total_patterns);
    println!("   Active: {}", summary.active_patterns);
    println!(
        "   Monthly outflow: {}",
        format_cents(summary.monthly_debit_cents)
    );
    println!(
        "   Monthly inflow: {}",
        format_cents(summary.monthly_credit_cents)
    );

    Ok(())
}
