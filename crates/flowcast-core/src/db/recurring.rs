//! Recurring transaction pattern operations

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{
    Frequency, FrequencyCount, NewRecurringPattern, RecurringSummary, RecurringTransaction,
    TransactionType,
};

const RECURRING_COLUMNS: &str = "id, account_id, merchant_pattern, display_name, predicted_amount_cents, amount_variance, frequency, confidence_score, interval_consistency, occurrence_count, last_occurrence, next_expected, is_active, transaction_type, category_id, created_at, updated_at";

impl Database {
    /// Persist the result of a detection run for one account.
    ///
    /// Default mode merges: for each candidate, an existing record with the
    /// same (account, merchant_pattern, transaction_type) gets its statistics
    /// updated in place, preserving the user-set display name, category, and
    /// active flag; new patterns are inserted.
    ///
    /// `force` deletes every pattern of the account first and inserts the
    /// candidates fresh, discarding user overrides.
    ///
    /// The whole batch runs inside a single SQL transaction so a failed run
    /// can never leave an account's patterns half-deleted.
    pub fn save_detections(
        &self,
        account_id: i64,
        detections: &[NewRecurringPattern],
        force: bool,
    ) -> Result<Vec<RecurringTransaction>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        if force {
            tx.execute(
                "DELETE FROM recurring_transactions WHERE account_id = ?",
                params![account_id],
            )?;
        }

        let mut saved_ids: Vec<i64> = Vec::with_capacity(detections.len());

        for detection in detections {
            let existing: Option<i64> = tx
                .query_row(
                    "SELECT id FROM recurring_transactions WHERE account_id = ? AND merchant_pattern = ? AND transaction_type = ?",
                    params![
                        account_id,
                        detection.merchant_pattern,
                        detection.transaction_type.as_str()
                    ],
                    |row| row.get(0),
                )
                .optional()?;

            let id = match existing {
                Some(id) => {
                    // Merge: statistics refresh, user overrides survive
                    tx.execute(
                        r#"
                        UPDATE recurring_transactions
                        SET predicted_amount_cents = ?,
                            amount_variance = ?,
                            frequency = ?,
                            confidence_score = ?,
                            interval_consistency = ?,
                            occurrence_count = ?,
                            last_occurrence = ?,
                            next_expected = ?,
                            updated_at = CURRENT_TIMESTAMP
                        WHERE id = ?
                        "#,
                        params![
                            detection.predicted_amount_cents,
                            detection.amount_variance,
                            detection.frequency.as_str(),
                            detection.confidence_score,
                            detection.interval_consistency,
                            detection.occurrence_count,
                            detection.last_occurrence.to_string(),
                            detection.next_expected.to_string(),
                            id,
                        ],
                    )?;
                    id
                }
                None => {
                    tx.execute(
                        r#"
                        INSERT INTO recurring_transactions
                            (account_id, merchant_pattern, display_name, predicted_amount_cents, amount_variance, frequency, confidence_score, interval_consistency, occurrence_count, last_occurrence, next_expected, is_active, transaction_type)
                        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, TRUE, ?)
                        "#,
                        params![
                            account_id,
                            detection.merchant_pattern,
                            detection.display_name,
                            detection.predicted_amount_cents,
                            detection.amount_variance,
                            detection.frequency.as_str(),
                            detection.confidence_score,
                            detection.interval_consistency,
                            detection.occurrence_count,
                            detection.last_occurrence.to_string(),
                            detection.next_expected.to_string(),
                            detection.transaction_type.as_str(),
                        ],
                    )?;
                    tx.last_insert_rowid()
                }
            };
            saved_ids.push(id);
        }

        tx.commit()?;
        drop(conn);

        let mut saved = Vec::with_capacity(saved_ids.len());
        for id in saved_ids {
            if let Some(record) = self.get_recurring(id)? {
                saved.push(record);
            }
        }
        Ok(saved)
    }

    /// List recurring patterns with optional filters
    pub fn list_recurring(
        &self,
        account_id: Option<i64>,
        active_only: bool,
        frequency: Option<Frequency>,
    ) -> Result<Vec<RecurringTransaction>> {
        let conn = self.conn()?;

        let mut conditions: Vec<String> = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(id) = account_id {
            conditions.push("account_id = ?".to_string());
            params_vec.push(Box::new(id));
        }
        if active_only {
            conditions.push("is_active = TRUE".to_string());
        }
        if let Some(freq) = frequency {
            conditions.push("frequency = ?".to_string());
            params_vec.push(Box::new(freq.as_str().to_string()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT {} FROM recurring_transactions {} ORDER BY next_expected ASC, merchant_pattern ASC",
            RECURRING_COLUMNS, where_clause
        );

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let patterns = stmt
            .query_map(params_refs.as_slice(), read_recurring_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(patterns)
    }

    /// Get a recurring pattern by ID
    pub fn get_recurring(&self, id: i64) -> Result<Option<RecurringTransaction>> {
        let conn = self.conn()?;

        let result = conn
            .query_row(
                &format!(
                    "SELECT {} FROM recurring_transactions WHERE id = ?",
                    RECURRING_COLUMNS
                ),
                params![id],
                read_recurring_row,
            )
            .optional()?;

        Ok(result)
    }

    /// Rename a pattern (user override, survives merge re-detection)
    pub fn rename_recurring(&self, id: i64, display_name: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE recurring_transactions SET display_name = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            params![display_name, id],
        )?;
        Ok(())
    }

    /// Assign a category to a pattern (user override)
    pub fn set_recurring_category(&self, id: i64, category_id: Option<i64>) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE recurring_transactions SET category_id = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            params![category_id, id],
        )?;
        Ok(())
    }

    /// Toggle the soft-delete flag. A deactivated pattern stays deactivated
    /// across merge re-detections; only a force run resurrects it.
    pub fn set_recurring_active(&self, id: i64, is_active: bool) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE recurring_transactions SET is_active = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            params![is_active, id],
        )?;
        Ok(())
    }

    /// Delete a pattern by ID
    pub fn delete_recurring(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM recurring_transactions WHERE id = ?",
            params![id],
        )?;
        Ok(())
    }

    /// Aggregate view: counts plus active debit/credit flow normalized to a
    /// 30-day month, with a per-frequency breakdown of the active patterns.
    pub fn recurring_summary(&self, account_id: Option<i64>) -> Result<RecurringSummary> {
        let patterns = self.list_recurring(account_id, false, None)?;

        let mut summary = RecurringSummary {
            total_patterns: patterns.len() as i64,
            active_patterns: 0,
            monthly_debit_cents: 0,
            monthly_credit_cents: 0,
            by_frequency: Vec::new(),
        };
        let mut frequency_counts: BTreeMap<i64, (Frequency, i64)> = BTreeMap::new();

        for pattern in &patterns {
            if !pattern.is_active {
                continue;
            }
            summary.active_patterns += 1;

            let monthly = (pattern.predicted_amount_cents.abs() as f64 * 30.0
                / pattern.frequency.period_days() as f64)
                .round() as i64;
            match pattern.transaction_type {
                TransactionType::Debit => summary.monthly_debit_cents += monthly,
                TransactionType::Credit => summary.monthly_credit_cents += monthly,
            }

            frequency_counts
                .entry(pattern.frequency.period_days())
                .or_insert((pattern.frequency, 0))
                .1 += 1;
        }

        summary.by_frequency = frequency_counts
            .into_values()
            .map(|(frequency, patterns)| FrequencyCount {
                frequency,
                patterns,
            })
            .collect();

        Ok(summary)
    }
}

fn read_recurring_row(row: &Row<'_>) -> rusqlite::Result<RecurringTransaction> {
    let frequency_str: String = row.get(6)?;
    let last_occurrence_str: String = row.get(10)?;
    let next_expected_str: String = row.get(11)?;
    let type_str: String = row.get(13)?;
    let created_at_str: String = row.get(15)?;
    let updated_at_str: String = row.get(16)?;

    let parse_date = |s: &str, idx: usize| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
            rusqlite::Error::InvalidColumnType(
                idx,
                "date".to_string(),
                rusqlite::types::Type::Text,
            )
        })
    };

    Ok(RecurringTransaction {
        id: row.get(0)?,
        account_id: row.get(1)?,
        merchant_pattern: row.get(2)?,
        display_name: row.get(3)?,
        predicted_amount_cents: row.get(4)?,
        amount_variance: row.get(5)?,
        frequency: frequency_str.parse().unwrap_or(Frequency::Monthly),
        confidence_score: row.get(7)?,
        interval_consistency: row.get(8)?,
        occurrence_count: row.get(9)?,
        last_occurrence: parse_date(&last_occurrence_str, 10)?,
        next_expected: parse_date(&next_expected_str, 11)?,
        is_active: row.get(12)?,
        transaction_type: type_str.parse().unwrap_or(TransactionType::Debit),
        category_id: row.get(14)?,
        created_at: parse_datetime(&created_at_str),
        updated_at: parse_datetime(&updated_at_str),
    })
}
