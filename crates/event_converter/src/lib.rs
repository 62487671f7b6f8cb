//! Event Converter Library
//!
//! 파일 단위 변환 파이프라인 (file-level conversion pipeline)
//! Dartfish CSV → MyVA XML, MyVA JSON → Dartfish CSV
//!
//! Reads every input from disk, converts the batch with `evc_core`, writes
//! each converted file into the output directory and returns a run report.
//! A file that cannot be read, converted or written is recorded as failed;
//! the rest of the batch still goes through.

use anyhow::{Context, Result};
use evc_core::{convert_batch, ConvertError, ConverterConfig, Direction, FileOutcome, InputFile};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Run report for one batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    /// 생성 시각 (RFC3339 형식)
    pub generated_at: String,
    /// Output directory
    pub out_dir: String,
    /// One entry per input file, in input order
    pub files: Vec<FileReport>,
    pub succeeded: usize,
    pub failed: usize,
}

impl ConversionReport {
    fn new(out_dir: &Path, files: Vec<FileReport>) -> Self {
        let succeeded = files.iter().filter(|f| f.error.is_none()).count();
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            out_dir: out_dir.display().to_string(),
            failed: files.len() - succeeded,
            succeeded,
            files,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Result for a single input file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub input: String,
    pub direction: Option<Direction>,
    /// Written file path (success only)
    pub output: Option<String>,
    /// Rows (CSV output) or instances (XML output) written
    pub rows: Option<usize>,
    /// Output size (bytes)
    pub bytes: Option<u64>,
    pub error: Option<String>,
    /// Error category (`malformed_input`, `ambiguous_metadata`, ...)
    pub error_kind: Option<String>,
}

impl FileReport {
    fn failed(input: String, direction: Option<Direction>, kind: &str, message: String) -> Self {
        Self {
            input,
            direction,
            output: None,
            rows: None,
            bytes: None,
            error: Some(message),
            error_kind: Some(kind.to_string()),
        }
    }
}

/// Converter config from an explicit YAML path, or defaults.
pub fn load_config(path: Option<&Path>) -> Result<ConverterConfig> {
    match path {
        Some(path) => ConverterConfig::load(path)
            .with_context(|| format!("Failed to load converter config: {}", path.display())),
        None => Ok(ConverterConfig::default()),
    }
}

/// Read one input file. `direction = None` detects it from the extension.
pub fn read_input(path: &Path, direction: Option<Direction>) -> Result<InputFile> {
    let content =
        fs::read(path).with_context(|| format!("Failed to read input file: {}", path.display()))?;
    let name = path.display().to_string();

    match direction {
        Some(direction) => Ok(InputFile {
            name,
            direction,
            content,
        }),
        None => Ok(InputFile::detect(name, content)?),
    }
}

/// Convert `paths` and write the results into `out_dir`.
///
/// # Arguments
///
/// * `paths` - 입력 파일 경로 목록
/// * `direction` - 변환 방향 (`None` = 확장자로 판단)
/// * `out_dir` - 출력 디렉토리 (없으면 생성)
/// * `config` - converter configuration
///
/// # Returns
///
/// Report with one entry per input. Only output-directory creation aborts
/// the whole run.
pub fn convert_files(
    paths: &[PathBuf],
    direction: Option<Direction>,
    out_dir: &Path,
    config: &ConverterConfig,
) -> Result<ConversionReport> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    // 1. Read everything; unreadable files fail on their own
    let mut slots: Vec<Option<FileReport>> = Vec::with_capacity(paths.len());
    let mut inputs = Vec::new();
    for path in paths {
        match read_input(path, direction) {
            Ok(input) => {
                inputs.push(input);
                slots.push(None);
            }
            Err(e) => {
                tracing::warn!("Skipping {}: {:#}", path.display(), e);
                slots.push(Some(FileReport::failed(
                    path.display().to_string(),
                    direction,
                    error_kind(&e),
                    format!("{:#}", e),
                )));
            }
        }
    }

    // 2. Convert
    let mut outcomes = convert_batch(&inputs, config).into_iter();

    // 3. Write, keeping input order
    let files = slots
        .into_iter()
        .filter_map(|slot| match slot {
            Some(report) => Some(report),
            None => outcomes.next().map(|outcome| write_outcome(outcome, out_dir)),
        })
        .collect();

    Ok(ConversionReport::new(out_dir, files))
}

fn write_outcome(outcome: FileOutcome, out_dir: &Path) -> FileReport {
    let FileOutcome {
        input_name,
        output_name,
        direction,
        result,
    } = outcome;

    let converted = match result {
        Ok(converted) => converted,
        Err(e) => {
            return FileReport::failed(input_name, Some(direction), e.kind(), e.to_string());
        }
    };

    let output_path = out_dir.join(&output_name);
    if let Err(e) = fs::write(&output_path, &converted.content) {
        let message = format!("Failed to write output file {}: {}", output_path.display(), e);
        return FileReport::failed(input_name, Some(direction), "io", message);
    }
    tracing::info!("{} → {}", input_name, output_path.display());

    FileReport {
        input: input_name,
        direction: Some(direction),
        output: Some(output_path.display().to_string()),
        rows: Some(converted.rows),
        bytes: Some(converted.content.len() as u64),
        error: None,
        error_kind: None,
    }
}

fn error_kind(err: &anyhow::Error) -> &'static str {
    err.downcast_ref::<ConvertError>()
        .map(|e| e.kind())
        .unwrap_or("io")
}

/// Save the run report as pretty JSON
pub fn save_report(path: &Path, report: &ConversionReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write report file: {}", path.display()))?;
    Ok(())
}
