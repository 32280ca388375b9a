//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use chrono::{Duration, Utc};
use flowcast_core::db::Database;
use flowcast_core::models::{NewTransaction, TransactionType};

use crate::commands::{self, format_cents, truncate};

fn setup_test_db() -> Database {
    Database::in_memory().unwrap()
}

/// Seed a monthly charge series ending a few days before now
fn seed_monthly_series(db: &Database, account_id: i64, description: &str, amount_cents: i64) {
    let end = Utc::now().date_naive() - Duration::days(5);
    for i in 0..5i64 {
        let tx = NewTransaction {
            date: end - Duration::days(30 * (4 - i)),
            amount_cents,
            counterparty: None,
            description: description.to_string(),
            transaction_type: TransactionType::Debit,
            category_id: None,
        };
        db.insert_transaction(account_id, &tx).unwrap().unwrap();
    }
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a very long merchant name", 10), "a very ...");
}

#[test]
fn test_format_cents() {
    assert_eq!(format_cents(-1499), "-$14.99");
    assert_eq!(format_cents(250000), "$2500.00");
    assert_eq!(format_cents(-5), "-$0.05");
    assert_eq!(format_cents(0), "$0.00");
}

// ========== Init Command Tests ==========

#[test]
fn test_cmd_init_creates_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("flowcast.db");

    let result = commands::cmd_init(&db_path, true);
    assert!(result.is_ok());
    assert!(db_path.exists());

    // Status on the freshly initialized database
    assert!(commands::cmd_status(&db_path, true).is_ok());
}

// ========== Account Command Tests ==========

#[test]
fn test_cmd_accounts_add_and_list() {
    let db = setup_test_db();

    let result = commands::cmd_accounts_add(&db, "Joint checking", Some("checking"));
    assert!(result.is_ok());

    let accounts = db.list_accounts().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].name, "Joint checking");

    assert!(commands::cmd_accounts_list(&db).is_ok());
}

#[test]
fn test_cmd_accounts_add_rejects_bad_type() {
    let db = setup_test_db();
    let result = commands::cmd_accounts_add(&db, "Oddity", Some("offshore"));
    assert!(result.is_err());
}

// ========== Transaction Command Tests ==========

#[test]
fn test_cmd_transactions_add_and_list() {
    let db = setup_test_db();
    let account_id = db.upsert_account("Checking", None).unwrap();

    let result = commands::cmd_transactions_add(
        &db,
        account_id,
        "2024-06-01",
        -1499,
        None,
        "NETFLIX.COM",
    );
    assert!(result.is_ok());
    assert_eq!(db.count_transactions(account_id).unwrap(), 1);

    // Duplicate entry is skipped, not an error
    let result = commands::cmd_transactions_add(
        &db,
        account_id,
        "2024-06-01",
        -1499,
        None,
        "NETFLIX.COM",
    );
    assert!(result.is_ok());
    assert_eq!(db.count_transactions(account_id).unwrap(), 1);

    assert!(commands::cmd_transactions_list(&db, Some(account_id), 20).is_ok());
}

#[test]
fn test_cmd_transactions_add_rejects_bad_date() {
    let db = setup_test_db();
    let account_id = db.upsert_account("Checking", None).unwrap();

    let result =
        commands::cmd_transactions_add(&db, account_id, "01/06/2024", -1499, None, "NETFLIX.COM");
    assert!(result.is_err());
}

#[test]
fn test_cmd_transactions_add_unknown_account() {
    let db = setup_test_db();
    let result = commands::cmd_transactions_add(&db, 404, "2024-06-01", -1499, None, "NETFLIX.COM");
    assert!(result.is_err());
}

// ========== Detect Command Tests ==========

#[test]
fn test_cmd_detect_finds_patterns() {
    let db = setup_test_db();
    let account_id = db.upsert_account("Checking", None).unwrap();
    seed_monthly_series(&db, account_id, "NETFLIX.COM", -1499);

    let result = commands::cmd_detect(&db, Some(account_id), false);
    assert!(result.is_ok());

    let patterns = db.list_recurring(Some(account_id), false, None).unwrap();
    assert_eq!(patterns.len(), 1);
    assert_eq!(patterns[0].merchant_pattern, "NETFLIX.COM");
}

#[test]
fn test_cmd_detect_all_accounts() {
    let db = setup_test_db();
    let account_a = db.upsert_account("Checking", None).unwrap();
    let account_b = db.upsert_account("Credit card", None).unwrap();
    seed_monthly_series(&db, account_a, "NETFLIX.COM", -1499);
    seed_monthly_series(&db, account_b, "SPOTIFY", -999);

    let result = commands::cmd_detect(&db, None, false);
    assert!(result.is_ok());

    assert_eq!(db.list_recurring(None, false, None).unwrap().len(), 2);
}

#[test]
fn test_cmd_detect_unknown_account() {
    let db = setup_test_db();
    let result = commands::cmd_detect(&db, Some(404), false);
    assert!(result.is_err());
}

// ========== Recurring Command Tests ==========

#[test]
fn test_cmd_recurring_rename_and_toggle() {
    let db = setup_test_db();
    let account_id = db.upsert_account("Checking", None).unwrap();
    seed_monthly_series(&db, account_id, "NETFLIX.COM", -1499);
    commands::cmd_detect(&db, Some(account_id), false).unwrap();

    let patterns = db.list_recurring(Some(account_id), false, None).unwrap();
    let id = patterns[0].id;

    assert!(commands::cmd_recurring_rename(&db, id, "Family Netflix").is_ok());
    assert!(commands::cmd_recurring_set_active(&db, id, false).is_ok());

    let pattern = db.get_recurring(id).unwrap().unwrap();
    assert_eq!(pattern.display_name, "Family Netflix");
    assert!(!pattern.is_active);

    assert!(commands::cmd_recurring_list(&db, None, false).is_ok());
    assert!(commands::cmd_recurring_summary(&db).is_ok());
}

#[test]
fn test_cmd_recurring_rename_missing() {
    let db = setup_test_db();
    assert!(commands::cmd_recurring_rename(&db, 404, "Ghost").is_err());
}

// ========== Forecast Command Tests ==========

#[test]
fn test_cmd_upcoming_and_forecast() {
    let db = setup_test_db();
    let account_id = db.upsert_account("Checking", None).unwrap();
    seed_monthly_series(&db, account_id, "NETFLIX.COM", -1499);
    commands::cmd_detect(&db, Some(account_id), false).unwrap();

    assert!(commands::cmd_upcoming(&db, 60).is_ok());
    assert!(commands::cmd_forecast(&db).is_ok());
}
