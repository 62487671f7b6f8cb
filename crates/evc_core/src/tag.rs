//! Key/value tag parser
//!
//! MyVA event tags are free-form strings: `"Result:Goal"`, `"x1:12.5"` or a
//! bare flag such as `"Foul"`. This module turns one tag into a cell
//! assignment on the row being built.

use crate::config::ConverterConfig;
use crate::error::{ConvertError, Result};
use crate::table::{Cell, SparseTable};

/// Parsed event tag
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    /// Bare tag without a colon: the whole string becomes a true flag column
    Flag(String),
    /// `key:value`, split on the first colon
    Pair { key: String, value: Cell },
}

/// Numeric-looking value: non-empty and only digits and dots.
fn is_numeric_literal(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Parse one raw tag string.
pub fn parse_tag(raw: &str, config: &ConverterConfig) -> Result<Tag> {
    let Some((key, value)) = raw.split_once(':') else {
        return Ok(Tag::Flag(raw.to_string()));
    };

    let value = if is_numeric_literal(value) && config.is_coordinate_key(key) {
        let number = value.parse::<f64>().map_err(|_| ConvertError::TagCoercion {
            key: key.to_string(),
            value: value.to_string(),
        })?;
        Cell::Float(number)
    } else {
        Cell::Text(value.to_string())
    };

    Ok(Tag::Pair {
        key: key.to_string(),
        value,
    })
}

/// Parse `raw` and write it into `row` of `table`.
///
/// Reserved keys that already hold a value for this row accumulate as
/// `new:old`; every other key is last-write-wins.
pub fn apply_tag(
    table: &mut SparseTable,
    row: usize,
    raw: &str,
    config: &ConverterConfig,
) -> Result<()> {
    match parse_tag(raw, config)? {
        Tag::Flag(name) => table.set(row, &name, Cell::Flag),
        Tag::Pair { key, value } => {
            let merged = match table.get(row, &key) {
                Some(existing) if !existing.is_empty() && config.is_reserved_key(&key) => {
                    Cell::Text(format!("{}:{}", value, existing))
                }
                Some(existing) if !existing.is_empty() => {
                    log::debug!(
                        "Row {}: tag '{}' overwrites previous value '{}'",
                        row,
                        key,
                        existing
                    );
                    value
                }
                _ => value,
            };
            table.set(row, &key, merged);
        }
    }
    Ok(())
}
