//! Event Converter CLI
//!
//! Dartfish CSV → MyVA XML 변환 도구
//! MyVA JSON → Dartfish CSV 변환 도구

#[cfg(feature = "cli")]
use anyhow::Result;
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};
#[cfg(feature = "cli")]
use evc_core::Direction;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "event_converter")]
#[command(about = "Convert event data files between Dartfish and MyVideoAnalyser", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Convert Dartfish CSV files to MyVA XML
    Xml(ConvertArgs),

    /// Convert MyVA JSON files to Dartfish CSV
    Csv(ConvertArgs),

    /// Pick the direction per file from its extension (.json / .csv)
    Auto(ConvertArgs),
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct ConvertArgs {
    /// Input files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output directory for converted files
    #[arg(long)]
    out_dir: PathBuf,

    /// Converter config YAML file
    #[arg(long, env = evc_core::CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// Output run report JSON file
    #[arg(long)]
    report: Option<PathBuf>,
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let (direction, args) = match cli.command {
        Commands::Xml(args) => (Some(Direction::CsvToXml), args),
        Commands::Csv(args) => (Some(Direction::JsonToCsv), args),
        Commands::Auto(args) => (None, args),
    };

    let label = match direction {
        Some(Direction::CsvToXml) => "Dartfish CSV → MyVA XML",
        Some(Direction::JsonToCsv) => "MyVA JSON → Dartfish CSV",
        None => "auto-detect",
    };
    println!("🔄 Converting {} file(s) ({})", args.files.len(), label);
    println!("   Output: {}", args.out_dir.display());

    let config = event_converter::load_config(args.config.as_deref())?;
    if let Some(path) = &args.config {
        println!("   Config: {}", path.display());
    }

    let report = event_converter::convert_files(&args.files, direction, &args.out_dir, &config)?;

    print_report(&report);

    if let Some(report_path) = &args.report {
        event_converter::save_report(report_path, &report)?;
        println!("\n📄 Report saved to: {}", report_path.display());
    }

    if report.has_failures() {
        anyhow::bail!("❌ {} of {} file(s) failed to convert", report.failed, report.files.len())
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn print_report(report: &event_converter::ConversionReport) {
    println!();
    for file in &report.files {
        match (&file.output, &file.error) {
            (Some(output), None) => println!(
                "✅ {} → {} ({} rows, {:.2} KB)",
                file.input,
                output,
                file.rows.unwrap_or(0),
                file.bytes.unwrap_or(0) as f64 / 1024.0
            ),
            (_, Some(error)) => println!("❌ {}: {}", file.input, error),
            (None, None) => println!("⚠️  {}: no output", file.input),
        }
    }
    println!(
        "\n   Converted: {}   Failed: {}",
        report.succeeded, report.failed
    );
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("event_converter CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
