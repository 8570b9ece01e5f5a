//! Training data import
//!
//! Training records load from CSV (one header row, columns named after the
//! `TrainingRecord` fields) or from a JSON array of records. The format is
//! chosen by file extension.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::TrainingRecord;

/// Supported training data formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    Json,
}

impl DataFormat {
    /// Detect format from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(DataFormat::Csv),
            "json" => Some(DataFormat::Json),
            _ => None,
        }
    }
}

/// Parse training records from CSV
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<TrainingRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (i, row) in rdr.deserialize::<TrainingRecord>().enumerate() {
        // Header is line 1
        let record = row.map_err(|e| Error::InvalidData(format!("CSV row {}: {}", i + 2, e)))?;
        records.push(record);
    }
    Ok(records)
}

/// Parse training records from a JSON array
pub fn parse_json<R: Read>(reader: R) -> Result<Vec<TrainingRecord>> {
    Ok(serde_json::from_reader(reader)?)
}

/// Load training records from a `.csv` or `.json` file
pub fn load_training_data(path: &Path) -> Result<Vec<TrainingRecord>> {
    let format = DataFormat::from_path(path).ok_or_else(|| {
        Error::InvalidData(format!(
            "Unsupported training data format: {} (expected .csv or .json)",
            path.display()
        ))
    })?;

    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            Error::NotFound(format!("Training data not found: {}", path.display()))
        }
        _ => Error::Io(e),
    })?;
    let reader = BufReader::new(file);

    let records = match format {
        DataFormat::Csv => parse_csv(reader)?,
        DataFormat::Json => parse_json(reader)?,
    };

    debug!(path = %path.display(), count = records.len(), "Loaded training data");
    Ok(records)
}
