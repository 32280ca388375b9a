//! Interval analysis for recurrence candidates
//!
//! Given the chronologically sorted dates of one merchant/type group and a
//! candidate frequency, measures how well the observed spacing fits the
//! frequency's nominal period. Intervals that span an integer multiple of
//! the period are treated as skipped occurrences (a missed subscription
//! charge) and excluded from the consistency calculation, so a long gap
//! does not collapse an otherwise tight pattern.

use chrono::{Duration, NaiveDate};

use crate::models::Frequency;

/// Consistency assigned when there are not enough usable intervals to
/// measure spread. Deliberately low: two data points are not a pattern.
const LOW_SAMPLE_CONSISTENCY: f64 = 0.2;

/// How many trailing days still count as "recent" activity
pub const RECENT_ACTIVITY_DAYS: i64 = 365;

/// Result of analyzing one group against one candidate frequency
#[derive(Debug, Clone)]
pub struct IntervalAnalysis {
    /// Occurrences contributing to the pattern (gap filtering does not
    /// remove occurrences, only the intervals spanning a gap)
    pub occurrence_count: usize,
    /// Mean length of the non-gap intervals, in days
    pub average_interval_days: f64,
    /// [0,1]; 1.0 = every non-gap interval matches the period exactly
    pub interval_consistency: f64,
    /// At least one occurrence within the trailing 12 months
    pub recent_activity: bool,
}

/// Classification of a single day-gap against a candidate period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IntervalKind {
    /// Within the tolerance band around the nominal period
    InPattern,
    /// An integer multiple of the period: one or more skipped occurrences
    SkipGap,
    /// Neither - evidence against this candidate frequency
    OffPattern,
}

/// Acceptable deviation from the nominal period, per frequency.
/// Monthly covers 28-31 day months, yearly covers 350-380 days.
fn tolerance_days(frequency: Frequency) -> i64 {
    match frequency {
        Frequency::Weekly => 2,
        Frequency::Biweekly => 3,
        Frequency::Monthly => 4,
        Frequency::Quarterly => 10,
        Frequency::Yearly => 15,
    }
}

fn classify_interval(gap_days: i64, frequency: Frequency) -> IntervalKind {
    let period = frequency.period_days();
    let tolerance = tolerance_days(frequency);

    if (gap_days - period).abs() <= tolerance {
        return IntervalKind::InPattern;
    }

    let multiple = ((gap_days as f64) / (period as f64)).round() as i64;
    if multiple >= 2 && (gap_days - multiple * period).abs() <= tolerance {
        return IntervalKind::SkipGap;
    }

    IntervalKind::OffPattern
}

/// Analyze a sorted date series against one candidate frequency.
///
/// Candidate frequencies are independent: the same series may score against
/// several of them, and the caller picks the best.
pub fn analyze(dates: &[NaiveDate], frequency: Frequency, today: NaiveDate) -> IntervalAnalysis {
    let recent_activity = dates
        .last()
        .map(|last| *last >= today - Duration::days(RECENT_ACTIVITY_DAYS))
        .unwrap_or(false);

    if dates.len() < 2 {
        return IntervalAnalysis {
            occurrence_count: dates.len(),
            average_interval_days: 0.0,
            interval_consistency: 0.0,
            recent_activity,
        };
    }

    let gaps: Vec<i64> = dates
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_days())
        .collect();

    // Gaps that are period multiples are skipped occurrences; everything
    // else (in-band or off-band) is measured against the nominal period.
    let measured: Vec<i64> = gaps
        .iter()
        .copied()
        .filter(|&gap| classify_interval(gap, frequency) != IntervalKind::SkipGap)
        .collect();

    let interval_consistency = consistency(&measured, frequency);

    let average_interval_days = if measured.is_empty() {
        gaps.iter().sum::<i64>() as f64 / gaps.len() as f64
    } else {
        measured.iter().sum::<i64>() as f64 / measured.len() as f64
    };

    IntervalAnalysis {
        occurrence_count: dates.len(),
        average_interval_days,
        interval_consistency,
        recent_activity,
    }
}

/// 1 minus the normalized RMS deviation of the measured intervals around
/// the nominal period, clamped to [0,1].
fn consistency(measured: &[i64], frequency: Frequency) -> f64 {
    if measured.len() < 2 {
        return LOW_SAMPLE_CONSISTENCY;
    }

    let period = frequency.period_days() as f64;
    let mean_sq = measured
        .iter()
        .map(|&gap| {
            let deviation = (gap as f64 - period) / period;
            deviation * deviation
        })
        .sum::<f64>()
        / measured.len() as f64;

    (1.0 - mean_sq.sqrt()).clamp(0.0, 1.0)
}
