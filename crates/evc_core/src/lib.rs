//! # evc_core - Event Data Conversion Engine
//!
//! Converts sports-video event data between MyVideoAnalyser (MyVA) and
//! Dartfish.
//!
//! ## Features
//! - MyVA JSON timeline → Dartfish CSV (one row per highlight, tags as columns)
//! - Dartfish CSV → MyVA XML (instances with labels plus a row color table)
//! - Team / action inference from the `Home` / `Away` tags
//! - Per-file error isolation for batches

pub mod config;
pub mod convert;
pub mod document;
pub mod error;
pub mod flatten;
pub mod table;
pub mod tag;
pub mod xml;

// Re-export main API functions
pub use config::{ConverterConfig, RowColor, CONFIG_PATH_ENV};
pub use convert::{
    convert_batch, convert_bytes, output_file_name, Converted, Direction, FileOutcome, InputFile,
};
pub use document::{AnnotationDocument, Clip, Event, Segment};
pub use error::{ConvertError, Result};
pub use flatten::{flatten, flatten_json, TeamNames, ACTION_COLUMN, TEAM_COLUMN};
pub use table::{Cell, RowTable, SparseTable, DURATION_COLUMN, NAME_COLUMN, POSITION_COLUMN};
pub use tag::{apply_tag, parse_tag, Tag};
pub use xml::{serialize_to_xml, write_xml};
