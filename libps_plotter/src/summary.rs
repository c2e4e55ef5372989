use std::io::Write;
use std::path::Path;
use time::macros::format_description;

use super::config::SummaryConfig;
use super::constants::FIXED_SUMMARY_COLUMNS;
use super::error::SummaryError;
use super::tree::{DirectoryNode, Measurement};

/// The persistent noise summary table.
///
/// A delimited text file with a fixed seven-column run-identity prefix
/// followed by one column per hybrid. All values are kept as text so repeated
/// load/save cycles never reformat old rows. Columns can be added across
/// invocations but are never removed; hybrid columns are kept sorted
/// ascending by numeric id.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Default for SummaryTable {
    fn default() -> Self {
        Self {
            columns: FIXED_SUMMARY_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

impl SummaryTable {
    /// Load an existing table, or start from the fixed header if the file
    /// does not exist yet.
    pub fn load(path: &Path) -> Result<Self, SummaryError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let mut lines = contents.lines();
        let columns: Vec<String> = match lines.next() {
            Some(header) => header.split(',').map(|c| c.to_string()).collect(),
            None => return Ok(Self::default()),
        };
        let mut rows = Vec::new();
        for line in lines {
            let mut row: Vec<String> = line.split(',').map(|v| v.to_string()).collect();
            // Rows written before a column was added are back-filled empty
            row.resize(columns.len(), String::new());
            rows.push(row);
        }
        Ok(Self { columns, rows })
    }

    /// Rewrite the whole table. Column insertion changes every row, so an
    /// in-place append is never enough.
    pub fn save(&self, path: &Path) -> Result<(), SummaryError> {
        let mut file = std::fs::File::create(path)?;
        writeln!(file, "{}", self.columns.join(","))?;
        for row in &self.rows {
            writeln!(file, "{}", row.join(","))?;
        }
        Ok(())
    }

    /// Index of a column, adding it (empty for all prior rows) if absent
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(index) = self.columns.iter().position(|c| c == name) {
            return index;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.columns.len() - 1
    }

    /// Append one row given as (column, value) pairs. Columns not mentioned
    /// stay empty; unknown columns are added first.
    pub fn append_row(&mut self, values: &[(String, String)]) {
        for (column, _) in values {
            self.ensure_column(column);
        }
        let mut row = vec![String::new(); self.columns.len()];
        for (column, value) in values {
            if let Some(index) = self.columns.iter().position(|c| c == column) {
                row[index] = value.clone();
            }
        }
        self.rows.push(row);
    }

    /// Re-sort the hybrid columns ascending by numeric id. The fixed prefix
    /// keeps its position; every row is permuted along with the header.
    pub fn sort_hybrid_columns(&mut self) {
        let fixed = FIXED_SUMMARY_COLUMNS.len().min(self.columns.len());
        let mut order: Vec<usize> = (fixed..self.columns.len()).collect();
        order.sort_by_key(|&i| hybrid_column_id(&self.columns[i]).unwrap_or(u32::MAX));

        let reorder = |row: &Vec<String>| -> Vec<String> {
            let mut out: Vec<String> = row[..fixed].to_vec();
            out.extend(order.iter().map(|&i| row[i].clone()));
            out
        };
        let columns = reorder(&self.columns);
        let rows: Vec<Vec<String>> = self.rows.iter().map(reorder).collect();
        self.columns = columns;
        self.rows = rows;
    }
}

/// Numeric hybrid id of a column name ("Hybrid 3" -> 3)
fn hybrid_column_id(column: &str) -> Option<u32> {
    column.strip_prefix("Hybrid ")?.parse().ok()
}

/// Extract one scalar per hybrid and append a row to the summary table.
///
/// Per hybrid (except the configured excluded instance) the value is the mean
/// of the first 1D measurement whose name contains `measurement_name`,
/// formatted to 3 decimal places, or empty when absent. The table file is
/// loaded, merged and fully rewritten; concurrent writers are not supported.
pub fn append_summary(
    hybrids: &[&DirectoryNode],
    measurement_name: &str,
    table_path: &Path,
    run_number: i32,
    frequency: i32,
    config: &SummaryConfig,
) -> Result<(), SummaryError> {
    let date = time::OffsetDateTime::now_utc()
        .date()
        .format(format_description!("[year]-[month]-[day]"))?;

    let mut values: Vec<(String, String)> = vec![
        (String::from("RunNumber"), run_number.to_string()),
        (String::from("Date"), date),
        (String::from("Temperature"), config.temperature.clone()),
        (String::from("Noise Form"), config.noise_form.clone()),
        (String::from("Frequency"), frequency.to_string()),
        (String::from("Amplitude"), config.amplitude.clone()),
        (String::from("LV Power"), config.lv_power.clone()),
    ];

    for hybrid in hybrids {
        let Some(id) = hybrid.unit_index() else {
            log::warn!("{} has no numeric suffix, skipping", hybrid.name);
            continue;
        };
        if id == config.excluded_hybrid {
            continue;
        }
        let value = hybrid
            .measurements()
            .find_map(|m| match m {
                Measurement::Series(s) if s.name.contains(measurement_name) => Some(s),
                _ => None,
            })
            .and_then(|series| series.stats())
            .map(|stats| format!("{:.3}", stats.mean))
            .unwrap_or_default();
        values.push((format!("Hybrid {id}"), value));
    }

    let mut table = SummaryTable::load(table_path)?;
    table.append_row(&values);
    table.sort_hybrid_columns();
    table.save(table_path)?;
    log::info!(
        "Appended run {} to {} ({} rows)",
        run_number,
        table_path.display(),
        table.rows.len()
    );
    Ok(())
}
