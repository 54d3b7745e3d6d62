//! CSV export of calculation history.
//!
//! Each export writes the full history as a fresh CSV snapshot: the target is
//! replaced atomically, so repeated exports never duplicate rows.

use crate::history::CalculationRecord;
use crate::{Error, Result};
use std::path::Path;
use tempfile::NamedTempFile;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    id: String,
    kind: &'static str,
    created_at: String,
    input_data: &'a str,
    result_data: &'a str,
}

impl<'a> From<&'a CalculationRecord> for CsvRow<'a> {
    fn from(record: &'a CalculationRecord) -> Self {
        CsvRow {
            id: record.id.to_string(),
            kind: record.kind.as_str(),
            created_at: record.created_at.to_rfc3339(),
            input_data: &record.input_data,
            result_data: &record.result_data,
        }
    }
}

/// Write `records` to a new CSV at `csv_path`, replacing any previous export
///
/// Returns the number of rows written. With no records the target is left
/// untouched.
pub fn export_csv(records: &[CalculationRecord], csv_path: &Path) -> Result<usize> {
    if records.is_empty() {
        tracing::info!("No history records to export");
        return Ok(0);
    }

    let parent = match csv_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = csv::Writer::from_writer(temp.as_file());
        for record in records {
            writer.serialize(CsvRow::from(record))?;
        }
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(csv_path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Exported {} history records to {:?}", records.len(), csv_path);
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gestation;
    use crate::history::CalculationKind;
    use chrono::NaiveDate;

    fn create_test_record() -> CalculationRecord {
        let lmp = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let as_of = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let estimate = gestation::from_lmp(lmp, as_of);
        CalculationRecord::new(CalculationKind::GestationLmp, &lmp, &estimate).unwrap()
    }

    #[test]
    fn test_export_creates_file_with_header() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("out").join("history.csv");

        let records = vec![create_test_record(), create_test_record()];
        let count = export_csv(&records, &csv_path).unwrap();
        assert_eq!(count, 2);

        let mut reader = csv::Reader::from_path(&csv_path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[1], "kind");
        let rows: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "gestation_lmp");
        assert!(rows[0][4].contains("due_date"));
    }

    #[test]
    fn test_repeated_export_replaces_rows() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("history.csv");

        export_csv(&[create_test_record(), create_test_record()], &csv_path).unwrap();
        export_csv(&[create_test_record(), create_test_record()], &csv_path).unwrap();

        let reader = csv::Reader::from_path(&csv_path).unwrap();
        assert_eq!(reader.into_records().count(), 2);

        let contents = std::fs::read_to_string(&csv_path).unwrap();
        assert_eq!(contents.matches("id,kind,created_at").count(), 1);
    }

    #[test]
    fn test_export_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("history.csv");

        assert_eq!(export_csv(&[], &csv_path).unwrap(), 0);
        assert!(!csv_path.exists());
    }
}
