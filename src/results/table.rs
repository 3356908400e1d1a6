//! Results table writer.
//!
//! Header: the sweep parameter names in key order, then `Algorithm` and
//! `Synthesis Time (ps)`. Rows are appended and flushed per topology file.

use color_eyre::eyre::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::topology::TopologyKind;

pub const ALGORITHM_COLUMN: &str = "Algorithm";
pub const SYNTHESIS_TIME_COLUMN: &str = "Synthesis Time (ps)";

/// One measured (topology, algorithm) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
    /// Parameter values in the kind's key order
    pub parameters: Vec<String>,
    pub algorithm: String,
    pub synthesis_time_ps: u64,
}

/// Append-only results table
pub struct ResultsTable<W: Write> {
    writer: csv::Writer<W>,
    kind: TopologyKind,
    rows: usize,
}

impl ResultsTable<File> {
    /// Create (or truncate) the results file and write the header
    pub fn create(path: &Path, kind: TopologyKind) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .wrap_err_with(|| format!("Failed to create directory '{}'", parent.display()))?;
            }
        }
        let file = File::create(path)
            .wrap_err_with(|| format!("Failed to create results table '{}'", path.display()))?;
        Self::from_writer(file, kind)
    }
}

impl<W: Write> ResultsTable<W> {
    pub fn from_writer(writer: W, kind: TopologyKind) -> Result<Self> {
        let mut writer = csv::Writer::from_writer(writer);
        let mut header: Vec<&str> = kind.parameter_keys().to_vec();
        header.push(ALGORITHM_COLUMN);
        header.push(SYNTHESIS_TIME_COLUMN);
        writer.write_record(&header)?;
        writer.flush()?;
        Ok(Self {
            writer,
            kind,
            rows: 0,
        })
    }

    pub fn append(&mut self, record: &RunRecord) -> Result<()> {
        let expected = self.kind.parameter_keys().len();
        if record.parameters.len() != expected {
            return Err(color_eyre::eyre::eyre!(
                "{} row has {} parameter values, expected {}",
                self.kind,
                record.parameters.len(),
                expected
            ));
        }

        let mut row = record.parameters.clone();
        row.push(record.algorithm.clone());
        row.push(record.synthesis_time_ps.to_string());
        self.writer.write_record(&row)?;
        self.rows += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().wrap_err("Failed to flush results table")
    }

    /// Data rows appended so far
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to finish results table: {}", e.error()))
    }
}
