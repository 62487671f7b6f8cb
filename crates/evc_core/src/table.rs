//! Row table - the flat intermediate shared by both conversion directions
//!
//! - `SparseTable`: row index → column → value, built while walking a document.
//!   A column missing from a row's map means "not set for this row".
//! - `RowTable`: dense table (ordered columns × rows), empty cells filled in.
//! - CSV I/O for the Dartfish side.

use crate::config::ConverterConfig;
use crate::error::{ConvertError, Result};
use indexmap::{IndexMap, IndexSet};
use std::fmt;
use std::io::{Read, Write};

/// Column holding the clip label
pub const NAME_COLUMN: &str = "Name";
/// Column holding the segment start in milliseconds
pub const POSITION_COLUMN: &str = "Position";
/// Column holding the segment length in milliseconds
pub const DURATION_COLUMN: &str = "Duration";

/// Single table cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    /// Bare tag marker, rendered as `True`
    Flag,
}

impl Cell {
    /// Empty cells and empty strings both count as "not present".
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Numeric view of the cell. Text is parsed after trimming.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            Cell::Text(s) => s.trim().parse::<f64>().ok(),
            Cell::Empty | Cell::Flag => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Int(v) => write!(f, "{}", v),
            Cell::Float(v) => f.write_str(&format_float(*v)),
            Cell::Flag => f.write_str("True"),
        }
    }
}

/// Shortest round-trip form, keeping a trailing `.0` on integral values
/// (`2.0`, `12.5`) so seconds and coordinates read as floats downstream.
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Row table under construction
#[derive(Debug, Clone, Default)]
pub struct SparseTable {
    columns: IndexSet<String>,
    rows: Vec<IndexMap<String, Cell>>,
}

impl SparseTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with room for `rows` rows
    pub fn with_capacity(rows: usize) -> Self {
        Self {
            columns: IndexSet::new(),
            rows: Vec::with_capacity(rows),
        }
    }

    /// Append an empty row and return its index
    pub fn push_row(&mut self) -> usize {
        self.rows.push(IndexMap::new());
        self.rows.len() - 1
    }

    /// Set a cell, registering the column on first sight
    pub fn set(&mut self, row: usize, column: &str, value: Cell) {
        if !self.columns.contains(column) {
            self.columns.insert(column.to_string());
        }
        if let Some(cells) = self.rows.get_mut(row) {
            cells.insert(column.to_string(), value);
        }
    }

    /// `None` when the column was never set for this row
    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        self.rows.get(row).and_then(|cells| cells.get(column))
    }

    /// Dense table, columns in first-seen order, unset cells empty
    pub fn materialize(self) -> RowTable {
        let columns: Vec<String> = self.columns.into_iter().collect();
        let rows = self
            .rows
            .into_iter()
            .map(|mut cells| {
                columns
                    .iter()
                    .map(|c| cells.swap_remove(c).unwrap_or_default())
                    .collect()
            })
            .collect();
        RowTable { columns, rows }
    }
}

/// Dense row table
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RowTable {
    /// Build from explicit rows; every row must have one cell per column.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(ConvertError::MalformedInput(format!(
                "row {} has {} cells, expected {}",
                idx,
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|cells| cells.get(idx))
    }

    /// Like `column_index` but a missing column is an error
    pub fn require_column(&self, column: &str) -> Result<usize> {
        self.column_index(column)
            .ok_or_else(|| ConvertError::MissingColumn {
                column: column.to_string(),
            })
    }

    /// Replace a column's values in place, or append the column when it does
    /// not exist yet. `values` must have one entry per row.
    pub fn set_column(&mut self, column: &str, values: Vec<Cell>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(ConvertError::MalformedInput(format!(
                "column '{}' has {} values for {} rows",
                column,
                values.len(),
                self.rows.len()
            )));
        }
        match self.column_index(column) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(column.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }

    /// Rename `from` to `to`. When `to` already exists the columns merge:
    /// non-empty cells of `to` win, the rest take the value from `from`.
    pub fn rename_column(&mut self, from: &str, to: &str) {
        let Some(from_idx) = self.column_index(from) else {
            return;
        };
        match self.column_index(to) {
            None => self.columns[from_idx] = to.to_string(),
            Some(to_idx) if to_idx == from_idx => {}
            Some(to_idx) => {
                for row in &mut self.rows {
                    let moved = row.remove(from_idx);
                    // to_idx shifts left once the earlier column is gone
                    let target = if to_idx > from_idx { to_idx - 1 } else { to_idx };
                    if row[target].is_empty() {
                        row[target] = moved;
                    }
                }
                self.columns.remove(from_idx);
            }
        }
    }

    /// Stable reorder of the rows by a key extracted from each row
    pub fn sort_rows_by<F>(&mut self, mut key: F)
    where
        F: FnMut(&[Cell]) -> f64,
    {
        let mut keyed: Vec<(f64, Vec<Cell>)> = std::mem::take(&mut self.rows)
            .into_iter()
            .map(|row| (key(&row), row))
            .collect();
        keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        self.rows = keyed.into_iter().map(|(_, row)| row).collect();
    }

    /// Read a Dartfish CSV export. Every cell is kept as text; cells that are
    /// blank or a configured missing-value marker become empty.
    pub fn from_csv_reader<R: Read>(reader: R, config: &ConverterConfig) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                if i == 0 {
                    h.trim_start_matches('\u{feff}').to_string() // Strip BOM
                } else {
                    h.to_string()
                }
            })
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let row: Vec<Cell> = record
                .iter()
                .map(|value| {
                    if config.is_missing_value(value) {
                        Cell::Empty
                    } else {
                        Cell::Text(value.to_string())
                    }
                })
                .collect();
            rows.push(row);
        }

        log::debug!("Read CSV table: {} columns, {} rows", columns.len(), rows.len());
        Self::from_rows(columns, rows)
    }

    pub fn from_csv_str(csv: &str, config: &ConverterConfig) -> Result<Self> {
        Self::from_csv_reader(csv.as_bytes(), config)
    }

    /// Write header plus one record per row, no index column
    pub fn to_csv_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|c| c.to_string()))?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.to_csv_writer(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| ConvertError::MalformedInput(e.to_string()))
    }
}
