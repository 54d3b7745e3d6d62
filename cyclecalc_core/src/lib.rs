#![forbid(unsafe_code)]

//! Core domain model and calculators for cyclecalc.
//!
//! This crate provides:
//! - Domain types (cycle history, fertile windows, gestational estimates)
//! - Fertile window estimation and cycle insights
//! - Gestational age dating (LMP, ultrasound, embryo transfer)
//! - Static reference tables (fetal development, prenatal care, cycle phases)
//! - Input validation for callers
//! - Caller-side persistence (calculation history, CSV export, cycle log)

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod validation;
pub mod fertility;
pub mod gestation;
pub mod reference;
pub mod history;
pub mod export;
pub mod cycle_log;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use fertility::{cycle_insights, estimate_fertile_window, phase_on, FertilityOptions};
pub use reference::{describe_phase, fetal_development, prenatal_care};
pub use history::{CalculationKind, CalculationRecord, HistorySink, JsonlHistory};
pub use cycle_log::CycleLog;
