use anyhow::{Context, Result};
use clap::Parser;
use ortrend::cli::{Cli, OutputFormat};
use ortrend::config::EngineConfig;
use ortrend::csv_output::{day_table_csv, CsvOutput};
use ortrend::engine::OccupancyEngine;
use ortrend::json_output::JsonOutput;
use ortrend::loader;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let mut config = EngineConfig::from_toml(&args.config)?;
    args.apply_overrides(&mut config)
        .map_err(|e| anyhow::anyhow!("Invalid command-line override: {}", e))?;

    let engine = OccupancyEngine::new(config).context("Invalid engine configuration")?;
    let rows = loader::load_records(&args.records)?;
    let report = engine
        .run(&rows)
        .with_context(|| format!("Failed to process {}", args.records.display()))?;

    if args.day_table {
        print!(
            "{}",
            day_table_csv(&report.overall.combined, engine.config().rounding.detail_places)
        );
        return Ok(());
    }

    match args.format {
        OutputFormat::Text => print!("{}", report.to_report_string()),
        OutputFormat::Json => println!("{}", JsonOutput::from_report(&report).to_json()?),
        OutputFormat::Csv => print!("{}", CsvOutput::from_report(&report).to_csv()),
    }

    Ok(())
}
