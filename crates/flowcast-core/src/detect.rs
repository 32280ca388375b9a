//! Recurring transaction detection
//!
//! Scans an account's transaction history, groups it by normalized merchant
//! key and direction, scores every group against each candidate frequency,
//! and persists the accepted patterns. Re-running detection merges into the
//! existing records by merchant key; a `force` run wipes the account's
//! patterns and re-detects from scratch.

use std::collections::HashMap;

use chrono::{Duration, Months, NaiveDate, Utc};
use tracing::{debug, info};

use crate::db::Database;
use crate::error::Result;
use crate::interval;
use crate::models::{
    Frequency, NewRecurringPattern, RecurringTransaction, Transaction, TransactionType,
};
use crate::normalize::merchant_key;

/// Candidate frequencies in evaluation order. Shorter periods first, so a
/// confidence tie resolves to the frequency with more supporting intervals.
const CANDIDATE_FREQUENCIES: [Frequency; 5] = [
    Frequency::Weekly,
    Frequency::Biweekly,
    Frequency::Monthly,
    Frequency::Quarterly,
    Frequency::Yearly,
];

/// Detection configuration
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// How far back to load history (bounds the search space)
    pub lookback_months: u32,
    /// Accounts with fewer transactions than this yield no patterns at all
    pub min_account_transactions: usize,
    /// Global acceptance threshold on the confidence score
    pub min_confidence: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            lookback_months: 36,
            min_account_transactions: 3,
            min_confidence: 0.65,
        }
    }
}

impl DetectionConfig {
    /// Minimum occurrences required per frequency.
    ///
    /// Weekly and biweekly charges accumulate fast, so they need more
    /// evidence; three yearly charges already span most of the lookback
    /// window.
    pub fn min_occurrences(&self, frequency: Frequency) -> usize {
        match frequency {
            Frequency::Weekly => 6,
            Frequency::Biweekly => 4,
            Frequency::Monthly => 3,
            Frequency::Quarterly => 3,
            Frequency::Yearly => 3,
        }
    }
}

/// Detects recurring transaction patterns for an account
pub struct RecurringDetector<'a> {
    db: &'a Database,
    config: DetectionConfig,
}

impl<'a> RecurringDetector<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            config: DetectionConfig::default(),
        }
    }

    pub fn with_config(db: &'a Database, config: DetectionConfig) -> Self {
        Self { db, config }
    }

    /// Run detection for an account and persist the result.
    ///
    /// Default mode merges into existing patterns by merchant key,
    /// preserving user overrides (display name, category, active flag).
    /// `force` deletes all of the account's patterns first and re-detects
    /// from scratch.
    pub fn detect(&self, account_id: i64, force: bool) -> Result<Vec<RecurringTransaction>> {
        self.detect_at(account_id, force, Utc::now().date_naive())
    }

    /// Detection with an explicit reference date. The recency gate and the
    /// lookback window are both measured from `today`.
    pub fn detect_at(
        &self,
        account_id: i64,
        force: bool,
        today: NaiveDate,
    ) -> Result<Vec<RecurringTransaction>> {
        let since = today
            .checked_sub_months(Months::new(self.config.lookback_months))
            .unwrap_or(NaiveDate::MIN);

        let transactions = self.db.transactions_for_detection(account_id, since)?;

        if transactions.len() < self.config.min_account_transactions {
            debug!(
                account_id,
                count = transactions.len(),
                "Not enough history for detection"
            );
            // Still honor a force run: the user asked for a clean slate
            if force {
                return self.db.save_detections(account_id, &[], true);
            }
            return Ok(vec![]);
        }

        let groups = group_by_merchant(&transactions);
        let mut candidates: Vec<NewRecurringPattern> = Vec::new();

        for ((merchant, transaction_type), group) in &groups {
            if let Some(candidate) =
                self.evaluate_group(merchant, *transaction_type, group, today)
            {
                candidates.push(candidate);
            }
        }

        // Stable output order regardless of hash-map iteration
        candidates.sort_by(|a, b| {
            a.merchant_pattern
                .cmp(&b.merchant_pattern)
                .then_with(|| a.transaction_type.as_str().cmp(b.transaction_type.as_str()))
        });

        info!(
            account_id,
            groups = groups.len(),
            patterns = candidates.len(),
            force,
            "Detection run complete"
        );

        self.db.save_detections(account_id, &candidates, force)
    }

    /// Score one merchant/type group against every candidate frequency and
    /// keep the best accepted one, if any.
    fn evaluate_group(
        &self,
        merchant: &str,
        transaction_type: TransactionType,
        group: &[&Transaction],
        today: NaiveDate,
    ) -> Option<NewRecurringPattern> {
        let mut dates: Vec<NaiveDate> = group.iter().map(|tx| tx.date).collect();
        dates.sort_unstable();

        let mut best: Option<(Frequency, interval::IntervalAnalysis, f64)> = None;

        for frequency in CANDIDATE_FREQUENCIES {
            let analysis = interval::analyze(&dates, frequency, today);

            if analysis.occurrence_count < self.config.min_occurrences(frequency) {
                continue;
            }
            if !analysis.recent_activity {
                debug!(merchant, %frequency, "Rejected: no activity in the last 12 months");
                continue;
            }

            let confidence =
                confidence_score(analysis.interval_consistency, analysis.occurrence_count);
            if confidence < self.config.min_confidence {
                continue;
            }

            // Strictly greater: a tie keeps the earlier (shorter) period
            let is_better = best
                .as_ref()
                .map(|(_, _, best_confidence)| confidence > *best_confidence)
                .unwrap_or(true);
            if is_better {
                best = Some((frequency, analysis, confidence));
            }
        }

        let (frequency, analysis, confidence) = best?;

        let amounts: Vec<i64> = group.iter().map(|tx| tx.amount_cents).collect();
        let predicted_amount_cents = median_cents(&amounts);
        let amount_variance = relative_amount_variance(&amounts);
        let last_occurrence = *dates.last()?;

        debug!(
            merchant,
            %frequency,
            confidence,
            occurrences = analysis.occurrence_count,
            "Accepted recurring pattern"
        );

        Some(NewRecurringPattern {
            merchant_pattern: merchant.to_string(),
            display_name: display_name_for(merchant),
            predicted_amount_cents,
            amount_variance,
            frequency,
            confidence_score: confidence,
            interval_consistency: analysis.interval_consistency,
            occurrence_count: analysis.occurrence_count as i64,
            last_occurrence,
            next_expected: last_occurrence + Duration::days(frequency.period_days()),
            transaction_type,
        })
    }
}

/// Group transactions by (merchant key, direction).
///
/// Debit and credit flows from the same counterparty never merge: a refund
/// stream and a charge stream are separate patterns.
fn group_by_merchant(
    transactions: &[Transaction],
) -> HashMap<(String, TransactionType), Vec<&Transaction>> {
    let mut groups: HashMap<(String, TransactionType), Vec<&Transaction>> = HashMap::new();

    for tx in transactions {
        let key = merchant_key(tx.counterparty.as_deref(), &tx.description);
        groups
            .entry((key, tx.transaction_type))
            .or_default()
            .push(tx);
    }

    groups
}

/// Composite acceptance score.
///
/// Dominated by interval consistency; occurrence count contributes a
/// secondary boost since more observations at the same consistency mean
/// less chance of coincidental spacing. Monotone in the occurrence count.
pub(crate) fn confidence_score(interval_consistency: f64, occurrences: usize) -> f64 {
    if occurrences == 0 {
        return 0.0;
    }
    let depth = 1.0 - 1.0 / occurrences as f64;
    (interval_consistency * (0.7 + 0.3 * depth)).clamp(0.0, 1.0)
}

/// Median of signed amounts in minor units. Robust against a one-off fee
/// or promo price distorting the prediction.
pub(crate) fn median_cents(amounts: &[i64]) -> i64 {
    if amounts.is_empty() {
        return 0;
    }

    let mut sorted = amounts.to_vec();
    sorted.sort_unstable();

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2
    } else {
        sorted[mid]
    }
}

/// Relative dispersion of amount magnitudes: population standard deviation
/// divided by the mean magnitude. 0 = every occurrence cost the same.
pub(crate) fn relative_amount_variance(amounts: &[i64]) -> f64 {
    if amounts.is_empty() {
        return 0.0;
    }

    let magnitudes: Vec<f64> = amounts.iter().map(|a| a.abs() as f64).collect();
    let mean = magnitudes.iter().sum::<f64>() / magnitudes.len() as f64;
    if mean == 0.0 {
        return 0.0;
    }

    let variance = magnitudes
        .iter()
        .map(|m| (m - mean) * (m - mean))
        .sum::<f64>()
        / magnitudes.len() as f64;

    variance.sqrt() / mean
}

/// Derive a readable default label from a merchant key.
/// Account-number keys stay as-is; word keys get title casing.
fn display_name_for(merchant: &str) -> String {
    if !merchant.contains(' ') {
        return merchant.to_string();
    }

    merchant
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_monotone_in_occurrences() {
        let mut previous = 0.0;
        for occurrences in 1..20 {
            let score = confidence_score(1.0, occurrences);
            assert!(score >= previous);
            previous = score;
        }
        // Large, perfectly regular series clears the high bar
        assert!(confidence_score(1.0, 8) > 0.85);
    }

    #[test]
    fn test_confidence_dominated_by_consistency() {
        assert!(confidence_score(0.3, 100) < confidence_score(0.9, 4));
        assert_eq!(confidence_score(0.0, 10), 0.0);
        assert_eq!(confidence_score(1.0, 0), 0.0);
    }

    #[test]
    fn test_median_cents() {
        assert_eq!(median_cents(&[-1299, -1350, -1250, -1299]), -1299);
        assert_eq!(median_cents(&[-500, -900, -700]), -700);
        assert_eq!(median_cents(&[]), 0);
        assert_eq!(median_cents(&[-1000, -2000]), -1500);
    }

    #[test]
    fn test_relative_amount_variance() {
        assert_eq!(relative_amount_variance(&[-999, -999, -999]), 0.0);

        let spread = relative_amount_variance(&[-1299, -1350, -1250, -1299]);
        assert!(spread > 0.0);
        assert!(spread < 0.1, "small price jitter should stay small: {}", spread);

        let wild = relative_amount_variance(&[-500, -9000, -1200]);
        assert!(wild > spread);
    }

    #[test]
    fn test_display_name_for() {
        assert_eq!(display_name_for("CITY GYM"), "City Gym");
        assert_eq!(display_name_for("NL91ABNA0417164300"), "NL91ABNA0417164300");
    }
}
