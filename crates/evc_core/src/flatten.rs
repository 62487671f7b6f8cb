//! MyVA JSON → Dartfish row table
//!
//! One row per highlighted segment:
//! - `Name`, `Position` (ms), `Duration` (ms)
//! - one column per event key seen anywhere in the document
//! - derived `Team` / `action` from the single-valued `Home` / `Away` tags
//!
//! Rows come out sorted by `Position`.

use crate::config::ConverterConfig;
use crate::document::AnnotationDocument;
use crate::error::{ConvertError, Result};
use crate::table::{Cell, RowTable, SparseTable, DURATION_COLUMN, NAME_COLUMN, POSITION_COLUMN};
use crate::tag::apply_tag;

/// Derived team attribution column
pub const TEAM_COLUMN: &str = "Team";
/// Derived action label column (clip name without the team prefix)
pub const ACTION_COLUMN: &str = "action";

/// Seconds → whole milliseconds
fn to_millis(seconds: f64) -> i64 {
    (seconds * 1000.0).round() as i64
}

/// Parse a MyVA JSON export and flatten it.
pub fn flatten_json(json: &str, config: &ConverterConfig) -> Result<RowTable> {
    let document = AnnotationDocument::from_json(json)?;
    flatten(&document, config)
}

/// Flatten an annotation document into a dense row table.
pub fn flatten(document: &AnnotationDocument, config: &ConverterConfig) -> Result<RowTable> {
    let mut sparse = SparseTable::with_capacity(document.segment_count());

    for clip in &document.clips {
        for segment in &clip.segments {
            let row = sparse.push_row();
            sparse.set(row, NAME_COLUMN, Cell::Text(clip.name.clone()));
            sparse.set(row, POSITION_COLUMN, Cell::Int(to_millis(segment.start)));
            sparse.set(
                row,
                DURATION_COLUMN,
                Cell::Int(to_millis(segment.end - segment.start)),
            );

            for event in &segment.events {
                apply_tag(&mut sparse, row, &event.name, config)?;
            }
        }
    }

    log::debug!(
        "Flattened {} clips into {} rows",
        document.clips.len(),
        document.segment_count()
    );

    let mut table = sparse.materialize();
    table.rename_column(&config.line_separator, &config.line_separator_alias);

    let teams = TeamNames::resolve(&table, config)?;
    let (team_values, action_values): (Vec<Cell>, Vec<Cell>) = (0..table.len())
        .map(|row| {
            let name = table
                .cell(row, NAME_COLUMN)
                .map(|c| c.to_string())
                .unwrap_or_default();
            (
                Cell::Text(teams.team_for(&name).to_string()),
                Cell::Text(teams.action_for(&name, &config.team_separator).to_string()),
            )
        })
        .unzip();
    table.set_column(TEAM_COLUMN, team_values)?;
    table.set_column(ACTION_COLUMN, action_values)?;

    let position_idx = table.require_column(POSITION_COLUMN)?;
    table.sort_rows_by(|row| row[position_idx].as_f64().unwrap_or(f64::MAX));

    Ok(table)
}

/// Home and away team names found in the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamNames {
    pub home: String,
    pub away: String,
}

impl TeamNames {
    /// First pass: each team column must carry exactly one distinct
    /// non-empty value across the whole table.
    pub fn resolve(table: &RowTable, config: &ConverterConfig) -> Result<Self> {
        Ok(Self {
            home: single_value(table, &config.home_column)?,
            away: single_value(table, &config.away_column)?,
        })
    }

    /// Home wins when a name contains both team names
    pub fn team_for(&self, name: &str) -> &str {
        if name.contains(self.home.as_str()) {
            &self.home
        } else if name.contains(self.away.as_str()) {
            &self.away
        } else {
            ""
        }
    }

    pub fn action_for<'a>(&self, name: &'a str, separator: &str) -> &'a str {
        let home_prefix = format!("{}{}", self.home, separator);
        let away_prefix = format!("{}{}", self.away, separator);
        name.strip_prefix(home_prefix.as_str())
            .or_else(|| name.strip_prefix(away_prefix.as_str()))
            .unwrap_or(name)
    }
}

fn single_value(table: &RowTable, column: &str) -> Result<String> {
    let Some(idx) = table.column_index(column) else {
        return Err(ConvertError::AmbiguousMetadata {
            column: column.to_string(),
            reason: "column not present in any segment".to_string(),
        });
    };

    let mut candidates: Vec<String> = Vec::new();
    for row in table.rows() {
        let cell = &row[idx];
        if cell.is_empty() {
            continue;
        }
        let value = cell.to_string();
        if !candidates.contains(&value) {
            candidates.push(value);
        }
    }

    match candidates.len() {
        1 => Ok(candidates.remove(0)),
        0 => Err(ConvertError::AmbiguousMetadata {
            column: column.to_string(),
            reason: "no non-empty value".to_string(),
        }),
        _ => Err(ConvertError::AmbiguousMetadata {
            column: column.to_string(),
            reason: format!("multiple values: {}", candidates.join(", ")),
        }),
    }
}
