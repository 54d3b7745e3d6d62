//! Core domain types for the cycle & gestation calculator.
//!
//! This module defines the value objects passed in and out of the calculators:
//! - Cycle history and fertile-window results
//! - Gestational estimates and dating methods
//! - Static reference records (fetal development, prenatal care, cycle phases)
//!
//! None of these carry identity or lifecycle; they are computed per call and
//! owned by the caller.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Days from ovulation to the next period, held fixed regardless of cycle length
pub const LUTEAL_PHASE_DAYS: i64 = 14;

/// Sperm viability lead-in before ovulation
pub const SPERM_VIABILITY_DAYS: i64 = 5;

/// Ovum viability after ovulation
pub const OVUM_VIABILITY_DAYS: i64 = 1;

/// Naegele's rule: 40 weeks from LMP
pub const PREGNANCY_DAYS: i64 = 280;

/// Last gestational day (inclusive) of the first trimester
pub const FIRST_TRIMESTER_END_DAYS: i64 = 84;

/// Last gestational day (inclusive) of the second trimester
pub const SECOND_TRIMESTER_END_DAYS: i64 = 182;

/// Default cycle length used when the caller does not supply one
pub const DEFAULT_CYCLE_LENGTH: u32 = 28;

// ============================================================================
// Fertility Types
// ============================================================================

/// One historical cycle, as entered on the dashboard
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleHistoryEntry {
    pub period_start: NaiveDate,
    pub period_length: u32,
    pub cycle_length: u32,
}

/// Input to the fertile window estimator
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FertileWindowInput {
    pub last_period_start: NaiveDate,
    pub last_period_end: NaiveDate,
    #[serde(default = "default_cycle_length")]
    pub cycle_length: u32,
    #[serde(default)]
    pub previous_cycles: Vec<CycleHistoryEntry>,
}

fn default_cycle_length() -> u32 {
    DEFAULT_CYCLE_LENGTH
}

impl FertileWindowInput {
    /// Input with the default 28-day cycle and no history
    pub fn new(last_period_start: NaiveDate, last_period_end: NaiveDate) -> Self {
        Self {
            last_period_start,
            last_period_end,
            cycle_length: DEFAULT_CYCLE_LENGTH,
            previous_cycles: Vec::new(),
        }
    }

    pub fn with_cycle_length(mut self, cycle_length: u32) -> Self {
        self.cycle_length = cycle_length;
        self
    }

    pub fn with_history(mut self, previous_cycles: Vec<CycleHistoryEntry>) -> Self {
        self.previous_cycles = previous_cycles;
        self
    }
}

/// Output of the fertile window estimator
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FertileWindowResult {
    pub ovulation_day: NaiveDate,
    pub fertile_start: NaiveDate,
    pub fertile_end: NaiveDate,
    pub next_period_start: NaiveDate,
    pub next_period_end: NaiveDate,
    /// Half the standard deviation of historical cycle lengths.
    /// Informational only: it never widens the fertile window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_variability: Option<f64>,
}

/// Auxiliary statistics derived from cycle history on request
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CycleInsights {
    pub cycle_variability: Option<f64>,
    pub average_luteal_phase: Option<f64>,
    pub predicted_next_cycle_length: Option<f64>,
}

/// Biological phase of a menstrual cycle
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    Menstrual,
    Follicular,
    Fertile,
    Luteal,
}

impl CyclePhase {
    pub const ALL: [CyclePhase; 4] = [
        CyclePhase::Menstrual,
        CyclePhase::Follicular,
        CyclePhase::Fertile,
        CyclePhase::Luteal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CyclePhase::Menstrual => "menstrual",
            CyclePhase::Follicular => "follicular",
            CyclePhase::Fertile => "fertile",
            CyclePhase::Luteal => "luteal",
        }
    }

    /// Parse a phase name, accepting the common aliases
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "menstrual" | "menstruation" | "period" => Some(CyclePhase::Menstrual),
            "follicular" => Some(CyclePhase::Follicular),
            "fertile" | "ovulatory" | "ovulation" => Some(CyclePhase::Fertile),
            "luteal" | "premenstrual" => Some(CyclePhase::Luteal),
            _ => None,
        }
    }
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ============================================================================
// Gestation Types
// ============================================================================

/// How the LMP-equivalent date was established
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DatingMethod {
    Lmp,
    Ultrasound,
    EmbryoTransfer,
}

/// Pregnancy trimester
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(into = "u8", try_from = "u8")]
pub enum Trimester {
    First,
    Second,
    Third,
}

impl Trimester {
    pub const ALL: [Trimester; 3] = [Trimester::First, Trimester::Second, Trimester::Third];

    /// Trimester containing the given number of elapsed gestational days.
    /// Both boundaries are inclusive: day 84 is still first, day 182 still second.
    pub fn from_elapsed_days(elapsed_days: i64) -> Self {
        if elapsed_days <= FIRST_TRIMESTER_END_DAYS {
            Trimester::First
        } else if elapsed_days <= SECOND_TRIMESTER_END_DAYS {
            Trimester::Second
        } else {
            Trimester::Third
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Trimester::First => 1,
            Trimester::Second => 2,
            Trimester::Third => 3,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Trimester::First),
            2 => Some(Trimester::Second),
            3 => Some(Trimester::Third),
            _ => None,
        }
    }
}

impl From<Trimester> for u8 {
    fn from(t: Trimester) -> u8 {
        t.number()
    }
}

impl TryFrom<u8> for Trimester {
    type Error = String;

    fn try_from(n: u8) -> std::result::Result<Self, Self::Error> {
        Trimester::from_number(n).ok_or_else(|| format!("trimester must be 1, 2 or 3, got {}", n))
    }
}

impl fmt::Display for Trimester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Gestational age and derived milestones
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GestationalEstimate {
    pub method: DatingMethod,
    pub lmp_equivalent: NaiveDate,
    pub weeks: u32,
    pub days: u32,
    pub elapsed_days: i64,
    pub due_date: NaiveDate,
    pub days_until_due: i64,
    pub first_trimester_end: NaiveDate,
    pub second_trimester_end: NaiveDate,
    pub current_trimester: Trimester,
}

// ============================================================================
// Reference Types
// ============================================================================

/// Fetal development notes for one gestational week
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetalDevelopmentInfo {
    pub week: u32,
    pub title: String,
    pub development: String,
    pub size: String,
    pub weight: String,
    pub milestone: String,
}

/// Prenatal care guidance for one trimester
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrenatalCareInfo {
    pub trimester: Trimester,
    pub nutrition: Vec<String>,
    pub lifestyle: Vec<String>,
    pub warning_signs: Vec<String>,
    pub examinations: Vec<String>,
    pub vaccines: Vec<String>,
    pub special_care: Vec<String>,
}

/// Observable markers of a cycle phase
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PhaseDescriptor {
    /// `None` for the fallback descriptor returned on unknown names
    pub phase: Option<CyclePhase>,
    pub summary: String,
    pub cervical_mucus: String,
    pub basal_temperature: String,
    pub dominant_hormones: String,
}
