//! Calculation history log.
//!
//! Each successful calculation is appended to a JSONL (JSON Lines) file as a
//! [`CalculationRecord`] whose input and result are stored as opaque JSON
//! strings. File locking keeps concurrent appends from interleaving.

use crate::Result;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Which calculator produced a record
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CalculationKind {
    FertileWindow,
    GestationLmp,
    GestationUltrasound,
    GestationEmbryoTransfer,
}

impl CalculationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationKind::FertileWindow => "fertile_window",
            CalculationKind::GestationLmp => "gestation_lmp",
            CalculationKind::GestationUltrasound => "gestation_ultrasound",
            CalculationKind::GestationEmbryoTransfer => "gestation_embryo_transfer",
        }
    }
}

impl fmt::Display for CalculationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One persisted calculation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CalculationRecord {
    pub id: Uuid,
    pub kind: CalculationKind,
    pub input_data: String,
    pub result_data: String,
    pub created_at: DateTime<Utc>,
}

impl CalculationRecord {
    /// Capture a calculation, serialising both sides to JSON strings
    pub fn new<I, R>(kind: CalculationKind, input: &I, result: &R) -> Result<Self>
    where
        I: Serialize + ?Sized,
        R: Serialize + ?Sized,
    {
        Ok(Self {
            id: Uuid::new_v4(),
            kind,
            input_data: serde_json::to_string(input)?,
            result_data: serde_json::to_string(result)?,
            created_at: Utc::now(),
        })
    }
}

/// History sink trait for persisting calculations
pub trait HistorySink {
    fn append(&mut self, record: &CalculationRecord) -> Result<()>;
}

/// JSONL-based history sink with file locking
pub struct JsonlHistory {
    path: PathBuf,
}

impl JsonlHistory {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl HistorySink for JsonlHistory {
    fn append(&mut self, record: &CalculationRecord) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended {} record {} to history", record.kind, record.id);
        Ok(())
    }
}

/// Read all records from a history file, oldest first
///
/// Unparsable lines are logged and skipped.
pub fn read_records(path: &Path) -> Result<Vec<CalculationRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<CalculationRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Failed to parse history record at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} records from history", records.len());
    Ok(records)
}

/// The `limit` most recent records, newest first
pub fn recent_records(path: &Path, limit: usize) -> Result<Vec<CalculationRecord>> {
    let mut records = read_records(path)?;
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    records.truncate(limit);
    Ok(records)
}
