//! Forecast command implementations

use anyhow::Result;
use chrono::Utc;
use flowcast_core::db::Database;
use flowcast_core::forecast;

use super::{format_cents, truncate};

pub fn cmd_upcoming(db: &Database, days: u32) -> Result<()> {
    let today = Utc::now().date_naive();
    let charges = forecast::upcoming_charges(db, None, days, today)?;

    if charges.is_empty() {
        println!("Nothing expected in the next {} days.", days);
        return Ok(());
    }

    println!();
    println!("📅 Expected in the next {} days", days);
    println!("   ─────────────────────────────────────────────────────");

    for charge in charges {
        println!(
            "   {} │ {:>10} │ {:24} ({})",
            charge.due_date,
            format_cents(charge.amount_cents),
            truncate(&charge.display_name, 24),
            charge.frequency.as_str()
        );
    }

    Ok(())
}

pub fn cmd_forecast(db: &Database) -> Result<()> {
    let forecast = forecast::current_month_forecast(db, None)?;

    println!();
    println!(
        "🔮 Forecast for {} - {}",
        forecast.month_start, forecast.month_end
    );
    println!("   ─────────────────────────────");
    println!(
        "   Expected outflow: {}",
        format_cents(forecast.expected_debit_cents)
    );
    println!(
        "   Expected inflow: {}",
        format_cents(forecast.expected_credit_cents)
    );
    println!("   Net: {}", format_cents(forecast.net_cents));

    if !forecast.items.is_empty() {
        println!();
        for item in &forecast.items {
            println!(
                "   {} │ {:>10} │ {}",
                item.due_date,
                format_cents(item.amount_cents),
                truncate(&item.display_name, 28)
            );
        }
    }

    Ok(())
}
