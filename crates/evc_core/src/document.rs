//! MyVideoAnalyser JSON timeline export
//!
//! ```json
//! { "rows": [ { "name": "Reds - Shot",
//!               "highlights": [ { "start": 1.5, "end": 3.5,
//!                                 "events": [ { "name": "Result:Goal" } ] } ] } ] }
//! ```
//!
//! The top level may also be an array of such objects. Unknown fields are
//! ignored; missing required fields are a malformed-input error.

use crate::error::{ConvertError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct Timeline {
    rows: Vec<Clip>,
}

/// Annotation document: clips in export order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnnotationDocument {
    pub clips: Vec<Clip>,
}

/// One named timeline entry, e.g. `"Reds - Shot"`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Clip {
    pub name: String,
    #[serde(rename = "highlights")]
    pub segments: Vec<Segment>,
}

/// Time-bounded highlight within a clip (seconds)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub events: Vec<Event>,
}

/// Single raw tag attached to a segment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub name: String,
}

impl AnnotationDocument {
    /// Parse a MyVA JSON export.
    pub fn from_json(json: &str) -> Result<Self> {
        // Decide the shape on the generic value first; an untagged enum would
        // swallow the missing-field message.
        let value: serde_json::Value = serde_json::from_str(json)?;
        let clips = match value {
            serde_json::Value::Object(_) => serde_json::from_value::<Timeline>(value)?.rows,
            serde_json::Value::Array(_) => serde_json::from_value::<Vec<Timeline>>(value)?
                .into_iter()
                .flat_map(|t| t.rows)
                .collect(),
            other => {
                return Err(ConvertError::MalformedInput(format!(
                    "expected a JSON object or array at the top level, found {}",
                    json_kind(&other)
                )))
            }
        };
        Ok(Self { clips })
    }

    /// Total number of segments, i.e. rows the flattener will produce
    pub fn segment_count(&self) -> usize {
        self.clips.iter().map(|c| c.segments.len()).sum()
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
