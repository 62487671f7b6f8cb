use thiserror::Error;

/// Errors raised while converting a single event data file.
///
/// Every variant is scoped to one input file; batch callers report it next to
/// the file name and carry on with the remaining files.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid CSV document: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column: {column}")]
    MissingColumn { column: String },

    #[error("Ambiguous team metadata in column '{column}': {reason}")]
    AmbiguousMetadata { column: String, reason: String },

    #[error("Type coercion failed at row {row}, column '{column}': '{value}' is not a number")]
    TypeCoercion {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Invalid tag value for '{key}': '{value}' is not a number")]
    TagCoercion { key: String, value: String },

    #[error("Invalid converter config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    /// Short category name used in run reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ConvertError::MalformedInput(_)
            | ConvertError::Json(_)
            | ConvertError::Csv(_)
            | ConvertError::MissingColumn { .. } => "malformed_input",
            ConvertError::AmbiguousMetadata { .. } => "ambiguous_metadata",
            ConvertError::TypeCoercion { .. } | ConvertError::TagCoercion { .. } => {
                "type_coercion"
            }
            ConvertError::Config(_) => "config",
            ConvertError::Io(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
