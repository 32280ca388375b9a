//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `accounts` - Account management commands
//! - `core` - Core commands (init, detect) and shared utilities (open_db)
//! - `forecast` - Upcoming charges and monthly forecast commands
//! - `recurring` - Recurring pattern management commands
//! - `serve` - Web server command
//! - `status` - Database status command
//! - `transactions` - Transaction commands (list, add)

pub mod accounts;
pub mod core;
pub mod forecast;
pub mod recurring;
pub mod serve;
pub mod status;
pub mod transactions;

// Re-export command functions for main.rs
pub use accounts::*;
pub use core::*;
pub use forecast::*;
pub use recurring::*;
pub use serve::*;
pub use status::*;
pub use transactions::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max.saturating_sub(3)])
    }
}

/// Format signed minor units as a currency string
pub fn format_cents(amount_cents: i64) -> String {
    let sign = if amount_cents < 0 { "-" } else { "" };
    let abs = amount_cents.abs();
    format!("{}${}.{:02}", sign, abs / 100, abs % 100)
}
