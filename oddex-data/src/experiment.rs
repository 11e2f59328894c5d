use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use crate::session::SessionInfo;

/// Wide-format experiment data table (PsychoPy `ExperimentHandler`):
/// routines add named cells to the current row; `next_entry` commits the
/// row. Columns keep first-seen order; rows missing a column save as an
/// empty cell.
pub struct ExperimentHandler {
    pub info: SessionInfo,
    file_stem: PathBuf,
    columns: Vec<String>,
    rows: Vec<HashMap<String, Value>>,
    current: HashMap<String, Value>,
}

impl ExperimentHandler {
    pub fn new(info: SessionInfo, data_dir: &std::path::Path) -> Self {
        let file_stem = info.file_stem(data_dir);
        Self {
            info,
            file_stem,
            columns: Vec::new(),
            rows: Vec::new(),
            current: HashMap::new(),
        }
    }

    pub fn file_stem(&self) -> &std::path::Path {
        &self.file_stem
    }

    /// Add one cell to the current (uncommitted) row.
    pub fn add_data<V: Serialize>(&mut self, column: &str, value: V) {
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(err) => {
                log::warn!("dropping unserializable cell '{column}': {err}");
                return;
            }
        };
        if !self.columns.iter().any(|c| c == column) {
            self.columns.push(column.to_string());
        }
        self.current.insert(column.to_string(), value);
    }

    /// Commit the current row and start a fresh one.
    pub fn next_entry(&mut self) {
        let row = std::mem::take(&mut self.current);
        self.rows.push(row);
    }

    pub fn is_entry_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Write the wide CSV (`<stem>.csv`), session columns appended to every
    /// row. Creates the participant directory on demand.
    pub fn save(&self) -> Result<PathBuf> {
        let path = self.file_stem.with_extension("csv");
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("creating data file {}", path.display()))?;

        let info_cols = self.info.columns();
        let mut header: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        header.extend(info_cols.iter().map(|(name, _)| *name));
        writer.write_record(&header)?;

        for row in &self.rows {
            let mut record: Vec<String> = self
                .columns
                .iter()
                .map(|col| row.get(col).map(render_cell).unwrap_or_default())
                .collect();
            record.extend(info_cols.iter().map(|(_, v)| v.clone()));
            writer.write_record(&record)?;
        }
        writer.flush()?;
        log::info!("saved {} data row(s) to {}", self.rows.len(), path.display());
        Ok(path)
    }

    /// Cancellation path: flush a half-collected row first, then save
    /// whatever we have.
    pub fn abort_save(&mut self) -> Result<PathBuf> {
        if !self.is_entry_empty() {
            log::warn!("session aborted mid-routine; keeping the partial row");
            self.next_entry();
        }
        self.save()
    }
}

/// CSV cell text for one JSON value: bare strings and numbers, JSON text
/// for lists (PsychoPy stores click sample lists the same way).
fn render_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
