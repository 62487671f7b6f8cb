//! JSON → table → XML round trips through the public API

use evc_core::{
    flatten_json, serialize_to_xml, Cell, ConverterConfig, RowTable, ACTION_COLUMN, TEAM_COLUMN,
};

const MATCH_JSON: &str = r#"{
  "rows": [
    { "name": "Match", "highlights": [
        { "start": 0.0, "end": 5400.0,
          "events": [ { "name": "Home:Reds" }, { "name": "Away:Blues" } ] } ] },
    { "name": "Reds - Shot", "highlights": [
        { "start": 12.345, "end": 14.5,
          "events": [ { "name": "Result:Saved" }, { "name": "Result:On target" },
                      { "name": "x1:34.5" }, { "name": "y1:12" } ] },
        { "start": 301.2, "end": 303.0,
          "events": [ { "name": "Result:Goal" }, { "name": "Foul" } ] } ] },
    { "name": "Blues - Corner", "highlights": [
        { "start": 97.0, "end": 99.75,
          "events": [ { "name": "SP:short" }, { "name": "Zone:2" }, { "name": "Zone:3" } ] } ] }
  ]
}"#;

/// Text of every `<tag>...</tag>` in document order
fn element_texts(xml: &str, tag: &str) -> Vec<String> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let mut out = Vec::new();
    let mut rest = xml;
    while let Some(start) = rest.find(&open) {
        let after = &rest[start + open.len()..];
        let Some(end) = after.find(&close) else {
            break;
        };
        out.push(after[..end].to_string());
        rest = &after[end + close.len()..];
    }
    out
}

fn parse_all(values: &[String]) -> Vec<f64> {
    values.iter().map(|v| v.parse::<f64>().unwrap()).collect()
}

#[test]
fn test_json_to_xml_keeps_segment_timing() {
    let config = ConverterConfig::default();
    let table = flatten_json(MATCH_JSON, &config).unwrap();
    let xml = serialize_to_xml(&table, &config).unwrap();

    // Sorted by start: Match, first shot, corner, second shot
    let expected = [(0.0, 5400.0), (12.345, 14.5), (97.0, 99.75), (301.2, 303.0)];
    let starts = parse_all(&element_texts(&xml, "start"));
    let ends = parse_all(&element_texts(&xml, "end"));

    assert_eq!(starts.len(), expected.len());
    for (i, (start, end)) in expected.iter().enumerate() {
        assert!((starts[i] - start).abs() < 1e-3, "start {} = {}", i, starts[i]);
        assert!((ends[i] - end).abs() < 1e-3, "end {} = {}", i, ends[i]);
    }
    assert_eq!(element_texts(&xml, "ID"), vec!["0", "1", "2", "3"]);
}

#[test]
fn test_json_to_csv_to_xml_matches_direct_path() {
    let config = ConverterConfig::default();
    let table = flatten_json(MATCH_JSON, &config).unwrap();
    let direct = serialize_to_xml(&table, &config).unwrap();

    let csv = table.to_csv_string().unwrap();
    let reread = RowTable::from_csv_str(&csv, &config).unwrap();
    let via_csv = serialize_to_xml(&reread, &config).unwrap();

    assert_eq!(direct, via_csv);
}

#[test]
fn test_labels_and_derived_columns() {
    let config = ConverterConfig::default();
    let table = flatten_json(MATCH_JSON, &config).unwrap();

    assert_eq!(table.cell(1, "Result"), Some(&Cell::from("On target:Saved")));
    assert_eq!(table.cell(1, "x1"), Some(&Cell::Float(34.5)));
    assert_eq!(table.cell(1, "y1"), Some(&Cell::Float(12.0)));
    assert_eq!(table.cell(2, "Zone"), Some(&Cell::from("3")));
    assert_eq!(table.cell(2, TEAM_COLUMN), Some(&Cell::from("Blues")));
    assert_eq!(table.cell(2, ACTION_COLUMN), Some(&Cell::from("Corner")));
    assert_eq!(table.cell(3, "Foul"), Some(&Cell::Flag));

    let xml = serialize_to_xml(&table, &config).unwrap();
    let labels = element_texts(&xml, "text");
    assert!(labels.contains(&"Result:On target:Saved".to_string()));
    assert!(labels.contains(&"x1:34.5".to_string()));
    assert!(labels.contains(&"y1:12.0".to_string()));
    assert!(labels.contains(&"Foul:True".to_string()));
    assert!(labels.contains(&"Team:Reds".to_string()));
    assert!(labels.contains(&"action:Shot".to_string()));
    assert!(!labels.iter().any(|l| l.ends_with(':')));

    let row_codes = element_texts(&xml[xml.find("<ROWS>").unwrap()..], "code");
    assert_eq!(row_codes, vec!["Match", "Reds - Shot", "Blues - Corner"]);
}
