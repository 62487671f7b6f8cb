//! Dartfish row table → MyVA XML
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <file>
//!   <ALL_INSTANCES>
//!     <instance><ID>0</ID><code>Reds - Shot</code><start>1.5</start><end>3.5</end>
//!       <label><text>Result:Goal</text></label></instance>
//!   </ALL_INSTANCES>
//!   <ROWS><row><code>Reds - Shot</code><R>65536</R><G>65536</G><B>65536</B></row></ROWS>
//! </file>
//! ```
//!
//! Written without indentation; instances keep the table's row order.

use crate::config::{ConverterConfig, RowColor};
use crate::error::{ConvertError, Result};
use crate::table::{format_float, Cell, RowTable, DURATION_COLUMN, NAME_COLUMN, POSITION_COLUMN};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

/// Serialize a row table to a MyVA XML document string.
pub fn serialize_to_xml(table: &RowTable, config: &ConverterConfig) -> Result<String> {
    let mut buffer = Vec::new();
    write_xml(table, config, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| ConvertError::MalformedInput(e.to_string()))
}

/// Serialize a row table as MyVA XML into `out`.
pub fn write_xml<W: Write>(table: &RowTable, config: &ConverterConfig, out: W) -> Result<()> {
    let name_idx = table.require_column(NAME_COLUMN)?;
    let position_idx = table.require_column(POSITION_COLUMN)?;
    let duration_idx = table.require_column(DURATION_COLUMN)?;

    let label_columns: Vec<(usize, &str)> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, c)| !matches!(c.as_str(), NAME_COLUMN | POSITION_COLUMN | DURATION_COLUMN))
        .map(|(i, c)| (i, c.as_str()))
        .collect();

    let mut writer = Writer::new(out);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    open(&mut writer, "file")?;
    open(&mut writer, "ALL_INSTANCES")?;

    let mut row_names: Vec<String> = Vec::new();
    for (id, row) in table.rows().iter().enumerate() {
        let name = row[name_idx].to_string();
        let start = seconds(&row[position_idx], id, POSITION_COLUMN)?;
        let end = start + seconds(&row[duration_idx], id, DURATION_COLUMN)?;

        open(&mut writer, "instance")?;
        text_element(&mut writer, "ID", &id.to_string())?;
        text_element(&mut writer, "code", &name)?;
        text_element(&mut writer, "start", &format_float(start))?;
        text_element(&mut writer, "end", &format_float(end))?;
        for &(idx, column) in &label_columns {
            let cell = &row[idx];
            if cell.is_empty() {
                continue;
            }
            open(&mut writer, "label")?;
            text_element(&mut writer, "text", &format!("{}:{}", column, cell))?;
            close(&mut writer, "label")?;
        }
        close(&mut writer, "instance")?;

        if !row_names.contains(&name) {
            row_names.push(name);
        }
    }

    close(&mut writer, "ALL_INSTANCES")?;
    open(&mut writer, "ROWS")?;
    for name in &row_names {
        write_row_descriptor(&mut writer, name, config.row_color)?;
    }
    close(&mut writer, "ROWS")?;
    close(&mut writer, "file")?;

    log::debug!(
        "Serialized {} instances, {} row descriptors",
        table.len(),
        row_names.len()
    );
    Ok(())
}

/// Milliseconds cell → seconds
fn seconds(cell: &Cell, row: usize, column: &str) -> Result<f64> {
    cell.as_f64()
        .map(|ms| ms / 1000.0)
        .ok_or_else(|| ConvertError::TypeCoercion {
            row,
            column: column.to_string(),
            value: cell.to_string(),
        })
}

fn write_row_descriptor<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    color: RowColor,
) -> Result<()> {
    open(writer, "row")?;
    text_element(writer, "code", name)?;
    text_element(writer, "R", &color.r.to_string())?;
    text_element(writer, "G", &color.g.to_string())?;
    text_element(writer, "B", &color.b.to_string())?;
    close(writer, "row")
}

fn open<W: Write>(writer: &mut Writer<W>, tag: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    Ok(())
}

fn close<W: Write>(writer: &mut Writer<W>, tag: &str) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn text_element<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> Result<()> {
    open(writer, tag)?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    close(writer, tag)
}
