//! Input validation for the calling layer.
//!
//! Calculators assume well-formed input. Everything that crosses the process
//! boundary (CLI arguments, JSON payloads) goes through these checks first so
//! that a rejected input surfaces as [`Error::Validation`] instead of a
//! meaningless result.

use crate::types::{CycleHistoryEntry, FertileWindowInput};
use crate::{Error, Result};
use chrono::{Datelike, NaiveDate};
use std::ops::RangeInclusive;

pub const CYCLE_LENGTH_RANGE: RangeInclusive<u32> = 21..=45;
pub const ULTRASOUND_WEEKS_RANGE: RangeInclusive<u32> = 0..=42;
pub const ULTRASOUND_DAYS_RANGE: RangeInclusive<u32> = 0..=6;
pub const EMBRYO_DAYS_ALLOWED: [u32; 2] = [3, 5];

/// Years a date may fall in; keeps every calculator offset inside chrono's range
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 1900..=9999;

/// Longest period accepted in cycle history
pub const MAX_PERIOD_LENGTH: u32 = 14;

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(field, value, "date is required"));
    }
    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|e| Error::validation(field, value, format!("expected YYYY-MM-DD ({})", e)))?;
    validate_supported_date(field, date)?;
    Ok(date)
}

/// Reject dates outside [`SUPPORTED_YEARS`]
pub fn validate_supported_date(field: &str, date: NaiveDate) -> Result<()> {
    if !SUPPORTED_YEARS.contains(&date.year()) {
        return Err(Error::validation(
            field,
            date,
            format!(
                "year must be between {} and {}",
                SUPPORTED_YEARS.start(),
                SUPPORTED_YEARS.end()
            ),
        ));
    }
    Ok(())
}

/// Reject dates after `today`
pub fn validate_not_future(field: &str, date: NaiveDate, today: NaiveDate) -> Result<()> {
    if date > today {
        return Err(Error::validation(
            field,
            date,
            format!("must not be after {}", today),
        ));
    }
    Ok(())
}

pub fn validate_cycle_length(cycle_length: u32) -> Result<()> {
    validate_range("cycle_length", cycle_length, &CYCLE_LENGTH_RANGE)
}

pub fn validate_embryo_days(embryo_days: u32) -> Result<()> {
    if !EMBRYO_DAYS_ALLOWED.contains(&embryo_days) {
        return Err(Error::validation(
            "embryo_days",
            embryo_days,
            "must be 3 (cleavage stage) or 5 (blastocyst)",
        ));
    }
    Ok(())
}

pub fn validate_ultrasound(usg_date: NaiveDate, weeks: u32, days: u32, today: NaiveDate) -> Result<()> {
    validate_supported_date("ultrasound_date", usg_date)?;
    validate_not_future("ultrasound_date", usg_date, today)?;
    validate_range("ultrasound_weeks", weeks, &ULTRASOUND_WEEKS_RANGE)?;
    validate_range("ultrasound_days", days, &ULTRASOUND_DAYS_RANGE)
}

pub fn validate_transfer(transfer_date: NaiveDate, embryo_days: u32, today: NaiveDate) -> Result<()> {
    validate_supported_date("transfer_date", transfer_date)?;
    validate_not_future("transfer_date", transfer_date, today)?;
    validate_embryo_days(embryo_days)
}

/// Validate everything the fertile window estimator will read
pub fn validate_fertile_input(input: &FertileWindowInput, today: NaiveDate) -> Result<()> {
    validate_supported_date("last_period_start", input.last_period_start)?;
    validate_supported_date("last_period_end", input.last_period_end)?;
    validate_not_future("last_period_start", input.last_period_start, today)?;
    if input.last_period_end < input.last_period_start {
        return Err(Error::validation(
            "last_period_end",
            input.last_period_end,
            format!("must not be before last_period_start {}", input.last_period_start),
        ));
    }
    validate_cycle_length(input.cycle_length)?;
    let period_days = (input.last_period_end - input.last_period_start).num_days();
    if period_days >= i64::from(input.cycle_length) {
        return Err(Error::validation(
            "last_period_end",
            input.last_period_end,
            "period must be shorter than the cycle",
        ));
    }
    for entry in &input.previous_cycles {
        validate_history_entry(entry)?;
    }
    Ok(())
}

/// Validate a single cycle history entry
pub fn validate_history_entry(entry: &CycleHistoryEntry) -> Result<()> {
    validate_supported_date("period_start", entry.period_start)?;
    validate_cycle_length(entry.cycle_length)?;
    if entry.period_length == 0 || entry.period_length > MAX_PERIOD_LENGTH {
        return Err(Error::validation(
            "period_length",
            entry.period_length,
            format!("must be between 1 and {}", MAX_PERIOD_LENGTH),
        ));
    }
    if entry.period_length >= entry.cycle_length {
        return Err(Error::validation(
            "period_length",
            entry.period_length,
            "must be shorter than the cycle",
        ));
    }
    Ok(())
}

fn validate_range(field: &str, value: u32, range: &RangeInclusive<u32>) -> Result<()> {
    if !range.contains(&value) {
        return Err(Error::validation(
            field,
            value,
            format!("must be between {} and {}", range.start(), range.end()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("lmp", " 2024-01-01 ").unwrap(), date("2024-01-01"));
        assert!(parse_date("lmp", "").unwrap_err().is_validation());
        assert!(parse_date("lmp", "01/02/2024").is_err());
        assert!(parse_date("lmp", "2024-02-30").is_err());
    }

    #[test]
    fn test_cycle_length_bounds() {
        assert!(validate_cycle_length(21).is_ok());
        assert!(validate_cycle_length(45).is_ok());
        assert!(validate_cycle_length(20).is_err());
        assert!(validate_cycle_length(46).is_err());
    }

    #[test]
    fn test_embryo_days() {
        assert!(validate_embryo_days(3).is_ok());
        assert!(validate_embryo_days(5).is_ok());
        for bad in [0, 4, 6] {
            let err = validate_embryo_days(bad).unwrap_err();
            assert!(err.to_string().contains("embryo_days"));
        }
    }

    #[test]
    fn test_ultrasound_ranges() {
        let today = date("2024-06-01");
        assert!(validate_ultrasound(date("2024-05-01"), 42, 6, today).is_ok());
        assert!(validate_ultrasound(date("2024-05-01"), 43, 0, today).is_err());
        assert!(validate_ultrasound(date("2024-05-01"), 10, 7, today).is_err());
        assert!(validate_ultrasound(date("2024-06-02"), 10, 0, today).is_err());
    }

    #[test]
    fn test_transfer_in_future_rejected() {
        let today = date("2024-06-01");
        let err = validate_transfer(date("2024-07-01"), 5, today).unwrap_err();
        assert!(err.to_string().contains("transfer_date"));
    }

    #[test]
    fn test_fertile_input_end_before_start() {
        let input = FertileWindowInput::new(date("2024-01-05"), date("2024-01-01"));
        let err = validate_fertile_input(&input, date("2024-02-01")).unwrap_err();
        assert!(err.to_string().contains("last_period_end"));
    }

    #[test]
    fn test_fertile_input_rejects_bad_history() {
        let input = FertileWindowInput::new(date("2024-01-01"), date("2024-01-05")).with_history(
            vec![CycleHistoryEntry {
                period_start: date("2023-12-01"),
                period_length: 5,
                cycle_length: 60,
            }],
        );
        assert!(validate_fertile_input(&input, date("2024-02-01")).is_err());
    }

    #[test]
    fn test_fertile_input_accepts_reference_scenario() {
        let input = FertileWindowInput::new(date("2024-01-01"), date("2024-01-05"));
        assert!(validate_fertile_input(&input, date("2024-01-05")).is_ok());
    }

    #[test]
    fn test_extreme_years_rejected() {
        let err = parse_date("ultrasound_date", "-262143-01-01").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("year must be between"));
        assert!(parse_date("lmp", "1899-12-31").is_err());
        assert!(parse_date("lmp", "1900-01-01").is_ok());
    }

    #[test]
    fn test_extreme_dates_rejected_before_calculation() {
        let today = date("2024-06-01");
        let ancient = NaiveDate::MIN;
        assert!(validate_ultrasound(ancient, 42, 6, today).is_err());
        assert!(validate_transfer(ancient, 5, today).is_err());

        let input = FertileWindowInput::new(ancient, ancient);
        assert!(validate_fertile_input(&input, today).is_err());

        let entry = CycleHistoryEntry {
            period_start: ancient,
            period_length: 5,
            cycle_length: 28,
        };
        assert!(validate_history_entry(&entry).is_err());
    }

    #[test]
    fn test_period_must_fit_in_cycle() {
        let input = FertileWindowInput::new(date("2024-01-01"), date("2024-01-22"))
            .with_cycle_length(21);
        let err = validate_fertile_input(&input, date("2024-02-01")).unwrap_err();
        assert!(err.to_string().contains("shorter than the cycle"));
    }

    #[test]
    fn test_history_period_length_bounds() {
        let entry = |period_length| CycleHistoryEntry {
            period_start: date("2024-01-01"),
            period_length,
            cycle_length: 28,
        };
        assert!(validate_history_entry(&entry(1)).is_ok());
        assert!(validate_history_entry(&entry(MAX_PERIOD_LENGTH)).is_ok());
        assert!(validate_history_entry(&entry(0)).is_err());
        assert!(validate_history_entry(&entry(MAX_PERIOD_LENGTH + 1)).is_err());
    }
}
