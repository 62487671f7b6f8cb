//! Per-file conversion and batches
//!
//! Each file is converted on its own; a failure is reported for that file
//! only and never stops its siblings.

use crate::config::ConverterConfig;
use crate::error::{ConvertError, Result};
use crate::flatten::flatten_json;
use crate::table::RowTable;
use crate::xml::serialize_to_xml;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Conversion direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// MyVA JSON timeline → Dartfish CSV
    JsonToCsv,
    /// Dartfish CSV → MyVA XML
    CsvToXml,
}

impl Direction {
    /// Pick the direction from the input extension (`.json` / `.csv`).
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Direction::JsonToCsv),
            "csv" => Some(Direction::CsvToXml),
            _ => None,
        }
    }

    /// Suffix appended to the output base name
    pub fn output_suffix(self) -> &'static str {
        match self {
            Direction::JsonToCsv => "-converted.csv",
            Direction::CsvToXml => "-converted.xml",
        }
    }
}

/// `"Game 1 export.json"` → `"Game_1_export-converted.csv"`
pub fn output_file_name(input_name: &str, direction: Direction) -> String {
    let file_name = Path::new(input_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(input_name);
    let stem = match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[..idx],
        _ => file_name,
    };
    format!("{}{}", stem.replace(' ', "_"), direction.output_suffix())
}

/// Result of converting one in-memory document
#[derive(Debug, Clone, PartialEq)]
pub struct Converted {
    pub content: String,
    /// Rows written (JSON → CSV) or instances written (CSV → XML)
    pub rows: usize,
}

/// Convert one document held in memory.
pub fn convert_bytes(
    direction: Direction,
    input: &[u8],
    config: &ConverterConfig,
) -> Result<Converted> {
    match direction {
        Direction::JsonToCsv => {
            let json = std::str::from_utf8(input)
                .map_err(|e| ConvertError::MalformedInput(format!("input is not UTF-8: {}", e)))?;
            let table = flatten_json(json, config)?;
            Ok(Converted {
                content: table.to_csv_string()?,
                rows: table.len(),
            })
        }
        Direction::CsvToXml => {
            let table = RowTable::from_csv_reader(input, config)?;
            Ok(Converted {
                content: serialize_to_xml(&table, config)?,
                rows: table.len(),
            })
        }
    }
}

/// One file handed to a batch
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: String,
    pub direction: Direction,
    pub content: Vec<u8>,
}

impl InputFile {
    /// Input with the direction detected from its name
    pub fn detect(name: impl Into<String>, content: Vec<u8>) -> Result<Self> {
        let name = name.into();
        let direction = Direction::from_file_name(&name).ok_or_else(|| {
            ConvertError::MalformedInput(format!(
                "cannot tell conversion direction from file name '{}' (expected .json or .csv)",
                name
            ))
        })?;
        Ok(Self {
            name,
            direction,
            content,
        })
    }
}

/// Outcome for one file of a batch
#[derive(Debug)]
pub struct FileOutcome {
    pub input_name: String,
    pub output_name: String,
    pub direction: Direction,
    pub result: Result<Converted>,
}

impl FileOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Convert every file independently; outcomes follow input order.
///
/// Successful outcomes never share an output name: a later file whose name
/// is taken gets `<stem>-2<ext>`, `<stem>-3<ext>`, ...
pub fn convert_batch(inputs: &[InputFile], config: &ConverterConfig) -> Vec<FileOutcome> {
    let mut outcomes: Vec<FileOutcome> = inputs
        .par_iter()
        .map(|input| {
            let result = convert_bytes(input.direction, &input.content, config);
            if let Err(e) = &result {
                log::warn!("Conversion of '{}' failed: {}", input.name, e);
            }
            FileOutcome {
                input_name: input.name.clone(),
                output_name: output_file_name(&input.name, input.direction),
                direction: input.direction,
                result,
            }
        })
        .collect();
    disambiguate_output_names(&mut outcomes);
    outcomes
}

// 대소문자만 다른 이름도 충돌로 본다 (case-insensitive file systems)
fn disambiguate_output_names(outcomes: &mut [FileOutcome]) {
    let mut taken: HashSet<String> = HashSet::new();

    for outcome in outcomes.iter_mut().filter(|o| o.is_ok()) {
        if taken.insert(outcome.output_name.to_lowercase()) {
            continue;
        }

        let (stem, ext) = match outcome.output_name.rfind('.') {
            Some(idx) => outcome.output_name.split_at(idx),
            None => (outcome.output_name.as_str(), ""),
        };
        let mut n = 2;
        let unique = loop {
            let candidate = format!("{}-{}{}", stem, n, ext);
            if !taken.contains(&candidate.to_lowercase()) {
                break candidate;
            }
            n += 1;
        };

        log::warn!(
            "Output name '{}' of '{}' is already used in this batch; writing '{}' instead",
            outcome.output_name,
            outcome.input_name,
            unique
        );
        taken.insert(unique.to_lowercase());
        outcome.output_name = unique;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_JSON: &str = r#"{ "rows": [
        { "name": "Match", "highlights": [
            { "start": 0, "end": 1, "events": [ { "name": "Home:Reds" }, { "name": "Away:Blues" } ] } ] },
        { "name": "Reds - Shot", "highlights": [
            { "start": 1.5, "end": 3.5, "events": [ { "name": "Result:Goal" } ] } ] }
    ] }"#;

    #[test]
    fn test_direction_from_file_name() {
        assert_eq!(Direction::from_file_name("a.json"), Some(Direction::JsonToCsv));
        assert_eq!(Direction::from_file_name("dir/B.CSV"), Some(Direction::CsvToXml));
        assert_eq!(Direction::from_file_name("notes.txt"), None);
        assert_eq!(Direction::from_file_name("json"), None);
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(
            output_file_name("Game 1 export.json", Direction::JsonToCsv),
            "Game_1_export-converted.csv"
        );
        assert_eq!(
            output_file_name("/tmp/in/Cup final.v2.csv", Direction::CsvToXml),
            "Cup_final.v2-converted.xml"
        );
        assert_eq!(output_file_name("noext", Direction::CsvToXml), "noext-converted.xml");
        assert_eq!(output_file_name(".hidden", Direction::CsvToXml), ".hidden-converted.xml");
    }

    #[test]
    fn test_output_file_name_is_deterministic() {
        let a = output_file_name("My  file.json", Direction::JsonToCsv);
        let b = output_file_name("My  file.json", Direction::JsonToCsv);
        assert_eq!(a, b);
        assert_eq!(a, "My__file-converted.csv");
    }

    #[test]
    fn test_convert_json_bytes() {
        let converted = convert_bytes(
            Direction::JsonToCsv,
            GOOD_JSON.as_bytes(),
            &ConverterConfig::default(),
        )
        .unwrap();
        assert_eq!(converted.rows, 2);
        let mut lines = converted.content.lines();
        assert_eq!(
            lines.next(),
            Some("Name,Position,Duration,Home,Away,Result,Team,action")
        );
        assert_eq!(lines.next(), Some("Match,0,1000,Reds,Blues,,,Match"));
        assert_eq!(lines.next(), Some("Reds - Shot,1500,2000,,,Goal,Reds,Shot"));
    }

    #[test]
    fn test_convert_csv_bytes() {
        let csv = "Name,Position,Duration,Result\nReds - Shot,1500,2000,Goal\n";
        let converted = convert_bytes(
            Direction::CsvToXml,
            csv.as_bytes(),
            &ConverterConfig::default(),
        )
        .unwrap();
        assert_eq!(converted.rows, 1);
        assert!(converted.content.contains("<label><text>Result:Goal</text></label>"));
    }

    #[test]
    fn test_non_utf8_json_is_malformed() {
        let err = convert_bytes(Direction::JsonToCsv, &[0xff, 0xfe], &ConverterConfig::default())
            .unwrap_err();
        assert_eq!(err.kind(), "malformed_input");
    }

    #[test]
    fn test_detect_rejects_unknown_extension() {
        assert!(InputFile::detect("clip.mp4", vec![]).is_err());
        let input = InputFile::detect("clip.json", vec![]).unwrap();
        assert_eq!(input.direction, Direction::JsonToCsv);
    }

    #[test]
    fn test_batch_isolates_failures_and_keeps_order() {
        let inputs = vec![
            InputFile::detect("first game.json", GOOD_JSON.as_bytes().to_vec()).unwrap(),
            InputFile::detect(
                "broken.json",
                br#"{ "rows": [ { "name": "A" } ] }"#.to_vec(),
            )
            .unwrap(),
            InputFile::detect(
                "dartfish.csv",
                b"Name,Position,Duration\nA,0,1000\n".to_vec(),
            )
            .unwrap(),
        ];
        let outcomes = convert_batch(&inputs, &ConverterConfig::default());

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].output_name, "first_game-converted.csv");
        assert!(outcomes[0].is_ok());
        assert_eq!(outcomes[1].input_name, "broken.json");
        assert!(!outcomes[1].is_ok());
        assert_eq!(outcomes[2].output_name, "dartfish-converted.xml");
        assert!(outcomes[2].is_ok());
    }

    #[test]
    fn test_batch_gives_colliding_outputs_distinct_names() {
        let json = || GOOD_JSON.as_bytes().to_vec();
        let inputs = vec![
            InputFile::detect("game 1.json", json()).unwrap(),
            InputFile::detect("game_1.json", json()).unwrap(),
            InputFile::detect("a/x.json", json()).unwrap(),
            InputFile::detect("b/x.json", json()).unwrap(),
            InputFile::detect("c/X.json", json()).unwrap(),
        ];
        let outcomes = convert_batch(&inputs, &ConverterConfig::default());

        let names: Vec<&str> = outcomes.iter().map(|o| o.output_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "game_1-converted.csv",
                "game_1-converted-2.csv",
                "x-converted.csv",
                "x-converted-2.csv",
                "X-converted-3.csv",
            ]
        );
        assert!(outcomes.iter().all(|o| o.is_ok()));
    }

    #[test]
    fn test_failed_outcome_does_not_reserve_output_name() {
        let inputs = vec![
            InputFile::detect("game.json", b"not json".to_vec()).unwrap(),
            InputFile::detect("dir/game.json", GOOD_JSON.as_bytes().to_vec()).unwrap(),
        ];
        let outcomes = convert_batch(&inputs, &ConverterConfig::default());

        assert!(!outcomes[0].is_ok());
        assert_eq!(outcomes[1].output_name, "game-converted.csv");
    }

    #[cfg(all(test, feature = "proptest"))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: output names never contain spaces and carry the suffix
            #[test]
            fn prop_output_name_shape(stem in "[A-Za-z0-9 _-]{1,20}") {
                let name = output_file_name(&format!("{}.json", stem), Direction::JsonToCsv);
                prop_assert!(!name.contains(' '));
                prop_assert!(name.ends_with("-converted.csv"));
                prop_assert_eq!(name, format!("{}-converted.csv", stem.replace(' ', "_")));
            }
        }
    }
}
