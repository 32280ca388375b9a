//! Domain models for Flowcast

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A bank account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub account_type: Option<AccountType>,
    pub created_at: DateTime<Utc>,
}

/// Account types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Checking,
    Savings,
    Credit,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Savings => "savings",
            Self::Credit => "credit",
        }
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "checking" => Ok(Self::Checking),
            "savings" => Ok(Self::Savings),
            "credit" => Ok(Self::Credit),
            _ => Err(format!("Unknown account type: {}", s)),
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user-defined spending/income category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Direction of money movement.
///
/// Tracked explicitly rather than inferred from the amount sign, since sign
/// conventions vary across import sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Debit,
    Credit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debit" => Ok(Self::Debit),
            "credit" => Ok(Self::Credit),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A financial transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub account_id: i64,
    pub date: NaiveDate,
    /// Signed amount in minor units (cents). Negative = expense.
    pub amount_cents: i64,
    /// Raw counterparty identifier (IBAN, account number, or payee name)
    pub counterparty: Option<String>,
    pub description: String,
    pub transaction_type: TransactionType,
    pub category_id: Option<i64>,
    /// Hash for deduplication
    pub import_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A new transaction to be stored (before DB insertion)
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub amount_cents: i64,
    pub counterparty: Option<String>,
    pub description: String,
    pub transaction_type: TransactionType,
    pub category_id: Option<i64>,
}

/// Recurrence frequency of a detected pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    /// Nominal period length in days
    pub fn period_days(&self) -> i64 {
        match self {
            Self::Weekly => 7,
            Self::Biweekly => 14,
            Self::Monthly => 30,
            Self::Quarterly => 91,
            Self::Yearly => 365,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "biweekly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!("Unknown frequency: {}", s)),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A detected recurring transaction pattern
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringTransaction {
    pub id: i64,
    pub account_id: i64,
    /// Normalized merchant key; the natural idempotency key within an account
    pub merchant_pattern: String,
    /// Human-friendly label; user-overridable
    pub display_name: String,
    /// Signed amount in minor units; median of the matched occurrences
    pub predicted_amount_cents: i64,
    /// Relative dispersion of matched amounts (0 = identical)
    pub amount_variance: f64,
    pub frequency: Frequency,
    /// [0,1] composite acceptance score
    pub confidence_score: f64,
    /// [0,1]; 1.0 means every observed interval matches the period exactly
    pub interval_consistency: f64,
    pub occurrence_count: i64,
    pub last_occurrence: NaiveDate,
    /// last_occurrence + period_days(frequency)
    pub next_expected: NaiveDate,
    /// User-togglable soft-delete flag
    pub is_active: bool,
    pub transaction_type: TransactionType,
    pub category_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A freshly detected pattern, before persistence
#[derive(Debug, Clone)]
pub struct NewRecurringPattern {
    pub merchant_pattern: String,
    pub display_name: String,
    pub predicted_amount_cents: i64,
    pub amount_variance: f64,
    pub frequency: Frequency,
    pub confidence_score: f64,
    pub interval_consistency: f64,
    pub occurrence_count: i64,
    pub last_occurrence: NaiveDate,
    pub next_expected: NaiveDate,
    pub transaction_type: TransactionType,
}

/// Aggregate view of recurring patterns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringSummary {
    pub total_patterns: i64,
    pub active_patterns: i64,
    /// Active debit patterns normalized to a monthly amount (minor units)
    pub monthly_debit_cents: i64,
    /// Active credit patterns normalized to a monthly amount (minor units)
    pub monthly_credit_cents: i64,
    /// Active pattern counts grouped by frequency
    pub by_frequency: Vec<FrequencyCount>,
}

/// Count of active patterns at one frequency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencyCount {
    pub frequency: Frequency,
    pub patterns: i64,
}

/// A projected charge derived from a recurring pattern
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpcomingCharge {
    pub recurring_id: i64,
    pub account_id: i64,
    pub display_name: String,
    pub amount_cents: i64,
    pub transaction_type: TransactionType,
    pub frequency: Frequency,
    pub due_date: NaiveDate,
}

/// Projected cashflow for one calendar month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyForecast {
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
    pub expected_debit_cents: i64,
    pub expected_credit_cents: i64,
    pub net_cents: i64,
    pub items: Vec<UpcomingCharge>,
}
