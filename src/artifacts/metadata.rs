// Reference metadata table - one row per indexed vector
use anyhow::{Context, Result};
use std::path::Path;

/// Column holding the human-readable description
pub const DESCRIPTION_COLUMN: &str = "description";

/// One reference record; `row` is its position in the vector index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRecord {
    pub row: usize,
    pub id: String,
    pub description: String,
}

/// Immutable table of reference records in index order
#[derive(Debug, Clone, Default)]
pub struct MetadataTable {
    records: Vec<ReferenceRecord>,
}

impl MetadataTable {
    /// Build from (id, description) pairs already in index order
    pub fn from_pairs<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let records = pairs
            .into_iter()
            .enumerate()
            .map(|(row, (id, description))| ReferenceRecord {
                row,
                id: id.into(),
                description: description.into(),
            })
            .collect();
        Self { records }
    }

    /// Load a CSV table; extra columns are ignored
    pub fn load(path: &Path, id_column: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .with_context(|| format!("Failed to open metadata table {}", path.display()))?;

        let headers = reader
            .headers()
            .context("Failed to read metadata header row")?
            .clone();
        let id_idx = column_index(&headers, id_column)?;
        let desc_idx = column_index(&headers, DESCRIPTION_COLUMN)?;

        let mut records = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let record = result
                .with_context(|| format!("Malformed metadata row {}", row + 1))?;
            records.push(ReferenceRecord {
                row,
                id: record.get(id_idx).unwrap_or_default().trim().to_string(),
                description: record.get(desc_idx).unwrap_or_default().trim().to_string(),
            });
        }

        Ok(Self { records })
    }

    /// Write the table back out as CSV with the given id column name
    pub fn save(&self, path: &Path, id_column: &str) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create metadata table {}", path.display()))?;
        writer.write_record([id_column, DESCRIPTION_COLUMN])?;
        for record in &self.records {
            writer.write_record([record.id.as_str(), record.description.as_str()])?;
        }
        writer.flush().context("Failed to flush metadata table")?;
        Ok(())
    }

    pub fn get(&self, row: usize) -> Option<&ReferenceRecord> {
        self.records.get(row)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceRecord> {
        self.records.iter()
    }
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .with_context(|| format!("Metadata table has no '{}' column", name))
}
