//! # Mute Timings
//!
//! Mapping between declared [`MuteTimingConfig`] and the backend
//! [`MuteTiming`], plus the month-name equivalence used to avoid spurious
//! diffs: Grafana may answer `1:3` for a declared `january:march`.

use crate::error::ProvisionError;
use crate::models::{MuteTiming, TimeInterval, TimeRange};
use crate::state::{IntervalConfig, MuteTimingConfig, TimeRangeConfig};
use chrono::NaiveTime;

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Alertmanager accepts `24:00` as the end of a day
const END_OF_DAY: &str = "24:00";

impl From<&TimeRangeConfig> for TimeRange {
    fn from(range: &TimeRangeConfig) -> Self {
        Self {
            start_time: range.start.clone(),
            end_time: range.end.clone(),
        }
    }
}

impl From<&TimeRange> for TimeRangeConfig {
    fn from(range: &TimeRange) -> Self {
        Self {
            start: range.start_time.clone(),
            end: range.end_time.clone(),
        }
    }
}

impl From<&IntervalConfig> for TimeInterval {
    fn from(interval: &IntervalConfig) -> Self {
        Self {
            times: interval
                .times
                .as_ref()
                .map(|times| times.iter().map(TimeRange::from).collect()),
            weekdays: interval.weekdays.clone(),
            days_of_month: interval.days_of_month.clone(),
            months: interval.months.clone(),
            years: interval.years.clone(),
            location: interval.location.clone().unwrap_or_default(),
        }
    }
}

impl From<&TimeInterval> for IntervalConfig {
    fn from(interval: &TimeInterval) -> Self {
        Self {
            times: interval
                .times
                .as_ref()
                .map(|times| times.iter().map(TimeRangeConfig::from).collect()),
            weekdays: interval.weekdays.clone(),
            days_of_month: interval.days_of_month.clone(),
            months: interval.months.clone(),
            years: interval.years.clone(),
            location: Some(interval.location.clone()).filter(|location| !location.is_empty()),
        }
    }
}

/// Backend payload for a declared mute timing
#[must_use]
pub fn unpack_mute_timing(config: &MuteTimingConfig) -> MuteTiming {
    MuteTiming {
        name: config.name.clone(),
        time_intervals: config.intervals.iter().map(TimeInterval::from).collect(),
    }
}

/// Declared form of a backend mute timing.
///
/// Where the backend spells months differently from `prior` but means the
/// same months, the declared spelling is kept.
#[must_use]
pub fn pack_mute_timing(timing: &MuteTiming, prior: Option<&MuteTimingConfig>) -> MuteTimingConfig {
    let mut intervals: Vec<IntervalConfig> =
        timing.time_intervals.iter().map(IntervalConfig::from).collect();

    if let Some(prior) = prior {
        for (interval, declared) in intervals.iter_mut().zip(&prior.intervals) {
            if let (Some(remote), Some(local)) = (&interval.months, &declared.months) {
                if month_lists_equivalent(remote, local) {
                    interval.months = Some(local.clone());
                }
            }
        }
    }

    MuteTimingConfig {
        id: None,
        org_id: None,
        name: timing.name.clone(),
        intervals,
    }
}

/// Replace every month name with its number, e.g. `january:march` becomes `1:3`
#[must_use]
pub fn normalize_months(value: &str) -> String {
    let mut normalized = value.to_lowercase();
    for (index, month) in MONTHS.iter().enumerate() {
        normalized = normalized.replace(month, &(index + 1).to_string());
    }
    normalized
}

#[must_use]
pub fn months_equivalent(a: &str, b: &str) -> bool {
    normalize_months(a) == normalize_months(b)
}

fn month_lists_equivalent(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(a, b)| months_equivalent(a, b))
}

/// Whether two interval lists describe the same schedule
#[must_use]
pub fn intervals_equivalent(a: &[IntervalConfig], b: &[IntervalConfig]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(a, b)| {
            let months_match = match (&a.months, &b.months) {
                (Some(a), Some(b)) => month_lists_equivalent(a, b),
                (None, None) => true,
                _ => false,
            };
            months_match
                && a.times == b.times
                && a.weekdays == b.weekdays
                && a.days_of_month == b.days_of_month
                && a.years == b.years
                && a.location == b.location
        })
}

/// Check a declared mute timing before it is sent
///
/// # Errors
/// Returns [`ProvisionError::InvalidConfig`] for an empty name or a malformed time range
pub fn validate(config: &MuteTimingConfig) -> Result<(), ProvisionError> {
    let invalid = |reason: String| ProvisionError::InvalidConfig {
        resource: "mute timing",
        name: config.name.clone(),
        reason,
    };

    if config.name.trim().is_empty() {
        return Err(invalid("name must not be empty".to_string()));
    }

    for (index, interval) in config.intervals.iter().enumerate() {
        for range in interval.times.iter().flatten() {
            let start = parse_time(&range.start)
                .ok_or_else(|| invalid(format!("intervals[{index}]: invalid start time {:?}", range.start)))?;
            let end = parse_time(&range.end)
                .ok_or_else(|| invalid(format!("intervals[{index}]: invalid end time {:?}", range.end)))?;
            if start >= end {
                return Err(invalid(format!(
                    "intervals[{index}]: start time {} must be before end time {}",
                    range.start, range.end
                )));
            }
        }
    }

    Ok(())
}

/// Minutes since midnight of an `hh:mm` time
fn parse_time(value: &str) -> Option<u32> {
    use chrono::Timelike;

    if value == END_OF_DAY {
        return Some(24 * 60);
    }
    NaiveTime::parse_from_str(value, "%H:%M")
        .ok()
        .map(|time| time.hour() * 60 + time.minute())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval_with_months(months: &[&str]) -> IntervalConfig {
        IntervalConfig {
            months: Some(months.iter().map(|m| (*m).to_string()).collect()),
            ..IntervalConfig::default()
        }
    }

    #[test]
    fn test_month_names_match_numbers() {
        assert!(months_equivalent("january:march", "1:3"));
        assert!(months_equivalent("December", "12"));
        assert!(!months_equivalent("january:march", "1:4"));
    }

    #[test]
    fn test_normalize_months() {
        assert_eq!(normalize_months("may:august"), "5:8");
        assert_eq!(normalize_months("3"), "3");
    }

    #[test]
    fn test_pack_keeps_declared_month_spelling() {
        let prior = MuteTimingConfig {
            name: "quarter".to_string(),
            intervals: vec![interval_with_months(&["january:march"])],
            ..MuteTimingConfig::default()
        };
        let remote = MuteTiming {
            name: "quarter".to_string(),
            time_intervals: vec![TimeInterval {
                months: Some(vec!["1:3".to_string()]),
                ..TimeInterval::default()
            }],
        };
        let packed = pack_mute_timing(&remote, Some(&prior));
        assert_eq!(packed.intervals, prior.intervals);

        let changed = MuteTiming {
            name: "quarter".to_string(),
            time_intervals: vec![TimeInterval {
                months: Some(vec!["1:4".to_string()]),
                ..TimeInterval::default()
            }],
        };
        let packed = pack_mute_timing(&changed, Some(&prior));
        assert_eq!(packed.intervals[0].months, Some(vec!["1:4".to_string()]));
    }

    #[test]
    fn test_unpack_then_pack_preserves_intervals() {
        let config = MuteTimingConfig {
            name: "weekends".to_string(),
            intervals: vec![IntervalConfig {
                times: Some(vec![TimeRangeConfig {
                    start: "00:00".to_string(),
                    end: "24:00".to_string(),
                }]),
                weekdays: Some(vec!["saturday:sunday".to_string()]),
                location: Some("Europe/Berlin".to_string()),
                ..IntervalConfig::default()
            }],
            ..MuteTimingConfig::default()
        };
        let remote = unpack_mute_timing(&config);
        assert_eq!(remote.time_intervals[0].location, "Europe/Berlin");
        assert_eq!(pack_mute_timing(&remote, None), config);
    }

    #[test]
    fn test_intervals_equivalent() {
        let a = vec![interval_with_months(&["january:march"])];
        let b = vec![interval_with_months(&["1:3"])];
        assert!(intervals_equivalent(&a, &b));
        assert!(!intervals_equivalent(&a, &[]));
        assert!(!intervals_equivalent(&a, &[IntervalConfig::default()]));
    }

    #[test]
    fn test_validate_time_ranges() {
        let mut config = MuteTimingConfig {
            name: "nights".to_string(),
            intervals: vec![IntervalConfig {
                times: Some(vec![TimeRangeConfig {
                    start: "22:00".to_string(),
                    end: "24:00".to_string(),
                }]),
                ..IntervalConfig::default()
            }],
            ..MuteTimingConfig::default()
        };
        assert!(validate(&config).is_ok());

        if let Some(times) = config.intervals[0].times.as_mut() {
            times[0].start = "25:00".to_string();
        }
        assert!(validate(&config).unwrap_err().to_string().contains("start time"));

        config.name = String::new();
        assert!(validate(&config).is_err());
    }
}
