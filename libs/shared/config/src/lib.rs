use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Which appointments the emergency conflict scan considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyScanScope {
    /// Only appointments of the staff member receiving the emergency.
    SameStaff,
    /// Every timed appointment in the store, regardless of staff.
    AllStaff,
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub emergency_scan_scope: EmergencyScanScope,
    pub max_commit_retries: u32,
    pub store_timeout_ms: u64,
    pub default_slot_minutes: i64,
    pub day_start_hour: u32,
    pub day_end_hour: u32,
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        let emergency_scan_scope = match env::var("SCHEDULER_EMERGENCY_SCAN_SCOPE") {
            Ok(value) if value.eq_ignore_ascii_case("all_staff") => EmergencyScanScope::AllStaff,
            Ok(value) if value.eq_ignore_ascii_case("same_staff") => EmergencyScanScope::SameStaff,
            Ok(other) => {
                warn!("Unrecognised SCHEDULER_EMERGENCY_SCAN_SCOPE '{}', using same_staff", other);
                EmergencyScanScope::SameStaff
            }
            Err(_) => EmergencyScanScope::SameStaff,
        };

        let mut config = Self {
            emergency_scan_scope,
            max_commit_retries: parse_env("SCHEDULER_MAX_COMMIT_RETRIES", 3),
            store_timeout_ms: parse_env("SCHEDULER_STORE_TIMEOUT_MS", 5_000),
            default_slot_minutes: parse_env("SCHEDULER_DEFAULT_SLOT_MINUTES", 30),
            day_start_hour: parse_env("SCHEDULER_DAY_START_HOUR", 9),
            day_end_hour: parse_env("SCHEDULER_DAY_END_HOUR", 17),
        };

        if config.max_commit_retries == 0 {
            warn!("SCHEDULER_MAX_COMMIT_RETRIES must be at least 1, using 1");
            config.max_commit_retries = 1;
        }

        if config.default_slot_minutes < 1 {
            warn!(
                "Slot length of {} minutes is invalid, using 30",
                config.default_slot_minutes
            );
            config.default_slot_minutes = 30;
        }

        if !config.is_valid_day_window() {
            warn!(
                "Working day window {}..{} is invalid, using 9..17",
                config.day_start_hour, config.day_end_hour
            );
            config.day_start_hour = 9;
            config.day_end_hour = 17;
        }

        config
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    fn is_valid_day_window(&self) -> bool {
        self.day_start_hour < self.day_end_hour && self.day_end_hour <= 23
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            emergency_scan_scope: EmergencyScanScope::SameStaff,
            max_commit_retries: 3,
            store_timeout_ms: 5_000,
            default_slot_minutes: 30,
            day_start_hour: 9,
            day_end_hour: 17,
        }
    }
}

fn parse_env<T: std::str::FromStr + std::fmt::Display + Copy>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} is not a valid value, using default {}", key, default);
            default
        }),
        Err(_) => default,
    }
}
