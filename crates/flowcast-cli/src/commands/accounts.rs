//! Account command implementations

use anyhow::Result;
use flowcast_core::db::Database;

pub fn cmd_accounts_list(db: &Database) -> Result<()> {
    let accounts = db.list_accounts()?;

    if accounts.is_empty() {
        println!("No accounts yet. Add one with:");
        println!("  flowcast accounts add \"Joint checking\" -t checking");
        return Ok(());
    }

    println!();
    println!("🏦 Accounts");
    println!("   ─────────────────────────────────────────────");

    for account in accounts {
        let type_str = account
            .account_type
            .map(|t| t.as_str())
            .unwrap_or("-");
        let tx_count = db.count_transactions(account.id).unwrap_or(0);
        println!(
            "   [{}] {:24} │ {:8} │ {} transaction(s)",
            account.id, account.name, type_str, tx_count
        );
    }

    Ok(())
}

pub fn cmd_accounts_add(db: &Database, name: &str, account_type: Option<&str>) -> Result<()> {
    let parsed_type = account_type
        .map(|s| s.parse())
        .transpose()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let id = db.upsert_account(name, parsed_type)?;
    println!("✅ Account ready (ID: {})", id);

    Ok(())
}
