//! Transaction operations

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};
use sha2::{Digest, Sha256};
use tracing::warn;

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{NewTransaction, Transaction, TransactionType};

/// Dedup hash over the fields that identify an occurrence. Re-storing the
/// same export twice must not double-count transactions.
fn import_hash(account_id: i64, tx: &NewTransaction) -> String {
    let mut hasher = Sha256::new();
    hasher.update(account_id.to_le_bytes());
    hasher.update(tx.date.to_string().as_bytes());
    hasher.update(tx.amount_cents.to_le_bytes());
    hasher.update(tx.transaction_type.as_str().as_bytes());
    hasher.update(tx.counterparty.as_deref().unwrap_or("").as_bytes());
    hasher.update(tx.description.as_bytes());
    hex::encode(hasher.finalize())
}

impl Database {
    /// Insert a transaction (skips duplicates based on import_hash)
    ///
    /// Returns the new row id, or None when an identical transaction
    /// already exists for the account.
    pub fn insert_transaction(&self, account_id: i64, tx: &NewTransaction) -> Result<Option<i64>> {
        let conn = self.conn()?;
        let hash = import_hash(account_id, tx);

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM transactions WHERE import_hash = ?",
                params![hash],
                |row| row.get(0),
            )
            .optional()?;

        if existing.is_some() {
            return Ok(None); // Duplicate, skip
        }

        conn.execute(
            r#"
            INSERT INTO transactions (account_id, date, amount_cents, counterparty, description, transaction_type, category_id, import_hash)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                account_id,
                tx.date.to_string(),
                tx.amount_cents,
                tx.counterparty,
                tx.description,
                tx.transaction_type.as_str(),
                tx.category_id,
                hash,
            ],
        )?;

        Ok(Some(conn.last_insert_rowid()))
    }

    /// List transactions for an account, newest first
    pub fn list_transactions(
        &self,
        account_id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;

        let (sql, params_vec): (&str, Vec<Box<dyn rusqlite::ToSql>>) = match account_id {
            Some(id) => (
                r#"
                SELECT id, account_id, date, amount_cents, counterparty, description, transaction_type, category_id, import_hash, created_at
                FROM transactions
                WHERE account_id = ?
                ORDER BY date DESC, id DESC
                LIMIT ? OFFSET ?
                "#,
                vec![Box::new(id), Box::new(limit), Box::new(offset)],
            ),
            None => (
                r#"
                SELECT id, account_id, date, amount_cents, counterparty, description, transaction_type, category_id, import_hash, created_at
                FROM transactions
                ORDER BY date DESC, id DESC
                LIMIT ? OFFSET ?
                "#,
                vec![Box::new(limit), Box::new(offset)],
            ),
        };

        let mut stmt = conn.prepare(sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let mut transactions = Vec::new();
        let mut rows = stmt.query(params_refs.as_slice())?;
        while let Some(row) = rows.next()? {
            match read_transaction_row(row) {
                Some(tx) => transactions.push(tx),
                None => warn!("Skipping malformed transaction row in listing"),
            }
        }

        Ok(transactions)
    }

    /// Read projection for detection: all of an account's transactions on or
    /// after `since`, oldest first.
    ///
    /// Rows with an unparseable date or type are skipped with a warning - a
    /// single corrupt row must not abort detection for the whole account.
    pub fn transactions_for_detection(
        &self,
        account_id: i64,
        since: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, account_id, date, amount_cents, counterparty, description, transaction_type, category_id, import_hash, created_at
            FROM transactions
            WHERE account_id = ? AND date >= ?
            ORDER BY date ASC, id ASC
            "#,
        )?;

        let mut transactions = Vec::new();
        let mut rows = stmt.query(params![account_id, since.to_string()])?;
        while let Some(row) = rows.next()? {
            match read_transaction_row(row) {
                Some(tx) => transactions.push(tx),
                None => {
                    let id: i64 = row.get(0).unwrap_or(-1);
                    warn!(transaction_id = id, "Skipping malformed transaction row");
                }
            }
        }

        Ok(transactions)
    }

    /// Count transactions for an account
    pub fn count_transactions(&self, account_id: i64) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE account_id = ?",
            params![account_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

/// Decode one transaction row, tolerating malformed date/type values
fn read_transaction_row(row: &rusqlite::Row<'_>) -> Option<Transaction> {
    let date_str: Option<String> = row.get(2).ok()?;
    let date = NaiveDate::parse_from_str(&date_str?, "%Y-%m-%d").ok()?;
    let amount_cents: Option<i64> = row.get(3).ok()?;
    let type_str: String = row.get(6).ok()?;
    let transaction_type: TransactionType = type_str.parse().ok()?;
    let created_at_str: String = row.get(9).ok()?;

    Some(Transaction {
        id: row.get(0).ok()?,
        account_id: row.get(1).ok()?,
        date,
        amount_cents: amount_cents?,
        counterparty: row.get(4).ok()?,
        description: row.get(5).ok()?,
        transaction_type,
        category_id: row.get(7).ok()?,
        import_hash: row.get(8).ok()?,
        created_at: parse_datetime(&created_at_str),
    })
}
