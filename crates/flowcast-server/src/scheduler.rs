//! Background scheduler for periodic detection runs
//!
//! Provides optional scheduled re-detection that can be enabled via
//! environment variables:
//!
//! - `FLOWCAST_DETECT_SCHEDULE`: Interval in hours (e.g., "24" for daily)
//!
//! The scheduler runs in the background and re-runs merge-mode detection
//! for every account, keeping predicted amounts and next-expected dates
//! current as new transactions arrive. It never runs force mode: user
//! overrides are only discarded by an explicit API request.

use std::time::Duration;

use tokio::time::interval;
use tracing::{error, info, warn};

use flowcast_core::detect::RecurringDetector;
use flowcast_core::Database;

/// Configuration for scheduled detection
#[derive(Debug, Clone)]
pub struct DetectionScheduleConfig {
    /// Interval between detection runs in hours
    pub interval_hours: u64,
}

impl DetectionScheduleConfig {
    /// Parse configuration from environment variables
    ///
    /// Returns None if scheduling is not configured (FLOWCAST_DETECT_SCHEDULE not set)
    pub fn from_env() -> Option<Self> {
        let interval_hours: u64 = std::env::var("FLOWCAST_DETECT_SCHEDULE")
            .ok()
            .and_then(|s| s.parse().ok())?;

        if interval_hours == 0 {
            warn!("FLOWCAST_DETECT_SCHEDULE is 0, scheduled detection disabled");
            return None;
        }

        Some(Self { interval_hours })
    }
}

/// Start the detection scheduler as a background task
///
/// This function spawns a tokio task that runs indefinitely, re-detecting
/// recurring patterns at the configured interval.
pub fn start_detection_scheduler(db: Database, config: DetectionScheduleConfig) {
    info!(
        "Starting detection scheduler: every {} hours",
        config.interval_hours
    );

    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(config.interval_hours * 3600));

        // Skip the first immediate tick - we don't want to detect on startup
        ticker.tick().await;

        loop {
            ticker.tick().await;

            info!("Running scheduled detection...");

            match run_scheduled_detection(&db) {
                Ok((accounts, patterns)) => {
                    info!(
                        "Scheduled detection completed: {} patterns across {} accounts",
                        patterns, accounts
                    );
                }
                Err(e) => {
                    error!("Scheduled detection failed: {}", e);
                }
            }
        }
    });
}

/// Run merge-mode detection for every account.
///
/// A failure on one account does not stop the sweep: different accounts
/// share no mutable state, so the rest can still be refreshed.
fn run_scheduled_detection(db: &Database) -> Result<(usize, usize), flowcast_core::Error> {
    let detector = RecurringDetector::new(db);
    let accounts = db.list_accounts()?;

    let mut total_patterns = 0;
    for account in &accounts {
        match detector.detect(account.id, false) {
            Ok(patterns) => total_patterns += patterns.len(),
            Err(e) => {
                warn!(
                    account_id = account.id,
                    error = %e,
                    "Scheduled detection failed for account"
                );
            }
        }
    }

    Ok((accounts.len(), total_patterns))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env_not_set() {
        std::env::remove_var("FLOWCAST_DETECT_SCHEDULE");
        assert!(DetectionScheduleConfig::from_env().is_none());
    }

    #[test]
    fn test_config_from_env_zero() {
        std::env::set_var("FLOWCAST_DETECT_SCHEDULE", "0");
        assert!(DetectionScheduleConfig::from_env().is_none());
        std::env::remove_var("FLOWCAST_DETECT_SCHEDULE");
    }
}
