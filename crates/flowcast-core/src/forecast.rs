//! Cashflow forecast readers
//!
//! Thin projections over the persisted recurring patterns: upcoming charges
//! within a window, and the expected debit/credit totals for the current
//! calendar month. Correctness here depends entirely on the detector
//! keeping `predicted_amount`, `next_expected`, and `is_active` current.

use chrono::{Datelike, Duration, NaiveDate, Utc};

use crate::db::Database;
use crate::error::Result;
use crate::models::{Frequency, MonthlyForecast, TransactionType, UpcomingCharge};

/// Expected next charge date, advanced past `today` in whole periods.
///
/// A pattern whose `next_expected` has already slipped into the past (a
/// detection run hasn't happened since the charge) still projects forward.
pub fn next_charge_date(last_seen: NaiveDate, frequency: Frequency, today: NaiveDate) -> NaiveDate {
    let interval = Duration::days(frequency.period_days());

    let mut next = last_seen + interval;
    while next <= today {
        next += interval;
    }
    next
}

/// Project all charges from active patterns due within the next `days` days.
pub fn upcoming_charges(
    db: &Database,
    account_id: Option<i64>,
    days: u32,
    today: NaiveDate,
) -> Result<Vec<UpcomingCharge>> {
    let window_end = today + Duration::days(days as i64);
    let patterns = db.list_recurring(account_id, true, None)?;

    let mut charges: Vec<UpcomingCharge> = Vec::new();

    for pattern in patterns {
        let interval = Duration::days(pattern.frequency.period_days());
        let mut due = next_charge_date(pattern.last_occurrence, pattern.frequency, today);

        // Short-period patterns can hit more than once inside the window
        while due <= window_end {
            charges.push(UpcomingCharge {
                recurring_id: pattern.id,
                account_id: pattern.account_id,
                display_name: pattern.display_name.clone(),
                amount_cents: pattern.predicted_amount_cents,
                transaction_type: pattern.transaction_type,
                frequency: pattern.frequency,
                due_date: due,
            });
            due += interval;
        }
    }

    charges.sort_by(|a, b| {
        a.due_date
            .cmp(&b.due_date)
            .then_with(|| a.display_name.cmp(&b.display_name))
    });

    Ok(charges)
}

/// Expected recurring cashflow for the calendar month containing `today`.
pub fn monthly_forecast(
    db: &Database,
    account_id: Option<i64>,
    today: NaiveDate,
) -> Result<MonthlyForecast> {
    let month_start = today.with_day(1).expect("day 1 always valid");
    let month_end = last_day_of_month(month_start);

    let remaining_days = (month_end - today).num_days().max(0) as u32;
    let items = upcoming_charges(db, account_id, remaining_days, today)?;

    let mut expected_debit_cents = 0;
    let mut expected_credit_cents = 0;
    for item in &items {
        match item.transaction_type {
            TransactionType::Debit => expected_debit_cents += item.amount_cents.abs(),
            TransactionType::Credit => expected_credit_cents += item.amount_cents.abs(),
        }
    }

    Ok(MonthlyForecast {
        month_start,
        month_end,
        expected_debit_cents,
        expected_credit_cents,
        net_cents: expected_credit_cents - expected_debit_cents,
        items,
    })
}

/// Current-month forecast against the wall clock
pub fn current_month_forecast(db: &Database, account_id: Option<i64>) -> Result<MonthlyForecast> {
    monthly_forecast(db, account_id, Utc::now().date_naive())
}

fn last_day_of_month(month_start: NaiveDate) -> NaiveDate {
    let next_month = if month_start.month() == 12 {
        NaiveDate::from_ymd_opt(month_start.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(month_start.year(), month_start.month() + 1, 1)
    };
    next_month.expect("first of month always valid") - Duration::days(1)
}
