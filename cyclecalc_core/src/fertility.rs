//! Fertile window estimation from menstrual cycle data.
//!
//! The estimator follows the standard calendar heuristic:
//! - Luteal phase fixed at 14 days, so ovulation = cycle start + (length - 14)
//! - Fertile window opens 5 days before ovulation and closes 1 day after
//! - Next period repeats the last period's length one cycle later
//!
//! History-based statistics are opt-in. They are reported next to the
//! window and never move its bounds.

use crate::types::{
    CycleHistoryEntry, CycleInsights, CyclePhase, FertileWindowInput, FertileWindowResult,
    LUTEAL_PHASE_DAYS, OVUM_VIABILITY_DAYS, SPERM_VIABILITY_DAYS,
};
use chrono::{Duration, NaiveDate};

/// Number of most recent cycles fed to the next-length predictor
const PREDICTOR_WINDOW: usize = 6;

/// Switches for the optional enrichment steps
#[derive(Clone, Debug)]
pub struct FertilityOptions {
    /// Attach `cycle_variability` when at least two history entries exist
    pub include_variability: bool,
}

impl Default for FertilityOptions {
    fn default() -> Self {
        Self {
            include_variability: true,
        }
    }
}

/// Estimate the fertile window for the cycle following `last_period_start`
///
/// The caller is responsible for validating the dates and the cycle length
/// (see [`crate::validation`]). Dates near the ends of chrono's range or an
/// unvalidated `cycle_length` can overflow date arithmetic and panic.
pub fn estimate_fertile_window(
    input: &FertileWindowInput,
    options: &FertilityOptions,
) -> FertileWindowResult {
    let cycle_length = i64::from(input.cycle_length);

    let ovulation_day = input.last_period_start + Duration::days(cycle_length - LUTEAL_PHASE_DAYS);
    let fertile_start = ovulation_day - Duration::days(SPERM_VIABILITY_DAYS);
    let fertile_end = ovulation_day + Duration::days(OVUM_VIABILITY_DAYS);

    let next_period_start = input.last_period_start + Duration::days(cycle_length);
    let period_length = input.last_period_end - input.last_period_start;
    let next_period_end = next_period_start + period_length;

    let cycle_variability = if options.include_variability {
        cycle_variability(&input.previous_cycles)
    } else {
        None
    };

    tracing::debug!(
        "Fertile window for cycle starting {} ({} days): {} .. {}, ovulation {}",
        input.last_period_start,
        cycle_length,
        fertile_start,
        fertile_end,
        ovulation_day
    );

    FertileWindowResult {
        ovulation_day,
        fertile_start,
        fertile_end,
        next_period_start,
        next_period_end,
        cycle_variability,
    }
}

/// Half the population standard deviation of historical cycle lengths
///
/// Returns `None` with fewer than two entries.
pub fn cycle_variability(history: &[CycleHistoryEntry]) -> Option<f64> {
    if history.len() < 2 {
        return None;
    }
    let lengths: Vec<f64> = history.iter().map(|c| f64::from(c.cycle_length)).collect();
    Some(std_deviation(&lengths) / 2.0)
}

/// Average luteal phase across the history
///
/// Without a measured ovulation date each entry's luteal phase is the fixed
/// 14 days, shortened when the period itself leaves less room: ovulation
/// cannot fall before the day after the period ends. Needs three entries.
pub fn average_luteal_phase(history: &[CycleHistoryEntry]) -> Option<f64> {
    if history.len() < 3 {
        return None;
    }
    let total: i64 = history
        .iter()
        .map(|c| {
            let room = i64::from(c.cycle_length) - i64::from(c.period_length) - 1;
            LUTEAL_PHASE_DAYS.min(room).max(0)
        })
        .sum();
    Some(total as f64 / history.len() as f64)
}

/// Weighted moving average of the most recent cycle lengths
///
/// Entries are ordered by `period_start`; the newest of the last six cycles
/// carries the highest weight (linear weights 1..=n). Needs three entries.
pub fn predict_next_cycle_length(history: &[CycleHistoryEntry]) -> Option<f64> {
    if history.len() < 3 {
        return None;
    }

    let mut ordered: Vec<&CycleHistoryEntry> = history.iter().collect();
    ordered.sort_by_key(|c| c.period_start);
    let recent = &ordered[ordered.len().saturating_sub(PREDICTOR_WINDOW)..];

    let (weighted_sum, weight_total) = recent
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(sum, weights), (i, c)| {
            let w = (i + 1) as f64;
            (sum + w * f64::from(c.cycle_length), weights + w)
        });

    Some(weighted_sum / weight_total)
}

/// Run every history-based helper
pub fn cycle_insights(history: &[CycleHistoryEntry]) -> CycleInsights {
    let insights = CycleInsights {
        cycle_variability: cycle_variability(history),
        average_luteal_phase: average_luteal_phase(history),
        predicted_next_cycle_length: predict_next_cycle_length(history),
    };
    tracing::debug!("Cycle insights over {} entries: {:?}", history.len(), insights);
    insights
}

/// Phase of the cycle on `date`, assuming cycles of constant length
///
/// Dates outside the cycle that starts at `cycle_start` are projected onto it
/// (Euclidean remainder), so earlier and later cycles repeat the same pattern.
/// Menstruation takes precedence where it overlaps the fertile span.
pub fn phase_on(
    cycle_start: NaiveDate,
    period_length: u32,
    cycle_length: u32,
    date: NaiveDate,
) -> CyclePhase {
    let cycle_length = i64::from(cycle_length.max(1));
    let day_index = (date - cycle_start).num_days().rem_euclid(cycle_length);

    let ovulation_offset = cycle_length - LUTEAL_PHASE_DAYS;
    let fertile_from = ovulation_offset - SPERM_VIABILITY_DAYS;
    let fertile_to = ovulation_offset + OVUM_VIABILITY_DAYS;

    if day_index < i64::from(period_length) {
        CyclePhase::Menstrual
    } else if day_index < fertile_from {
        CyclePhase::Follicular
    } else if day_index <= fertile_to {
        CyclePhase::Fertile
    } else {
        CyclePhase::Luteal
    }
}

fn std_deviation(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}
