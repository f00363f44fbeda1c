//! Per-file results table

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::error::Result;
use super::Classification;

/// One row of `results.csv`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub file_name: String,
    pub result: Classification,
    /// Empty for clean files
    pub denoised_file: String,
}

impl ResultRecord {
    pub fn clean(file: &Path) -> Self {
        Self {
            file_name: file.display().to_string(),
            result: Classification::Clean,
            denoised_file: String::new(),
        }
    }

    pub fn noisy(file: &Path, denoised: &Path) -> Self {
        Self {
            file_name: file.display().to_string(),
            result: Classification::Noisy,
            denoised_file: denoised.display().to_string(),
        }
    }

    pub fn denoised_path(&self) -> Option<PathBuf> {
        (!self.denoised_file.is_empty()).then(|| PathBuf::from(&self.denoised_file))
    }
}

/// Append-only table of records in processing order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTable {
    records: Vec<ResultRecord>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ResultRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn count(&self, classification: Classification) -> usize {
        self.records.iter().filter(|r| r.result == classification).count()
    }

    /// Write all records with a `file_name,result,denoised_file` header,
    /// replacing any existing file
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(path)?;
        if self.records.is_empty() {
            writer.write_record(["file_name", "result", "denoised_file"])?;
        }
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        log::info!("Wrote {} result(s) to {}", self.records.len(), path.display());
        Ok(())
    }

    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let records = reader.deserialize().collect::<std::result::Result<Vec<ResultRecord>, _>>()?;
        Ok(Self { records })
    }
}

impl FromIterator<ResultRecord> for ResultTable {
    fn from_iter<I: IntoIterator<Item = ResultRecord>>(iter: I) -> Self {
        Self { records: iter.into_iter().collect() }
    }
}
