use std::path::PathBuf;

use clap::{Parser, Subcommand};
use loginstat_tools::export;
use loginstat_tools::{ExportError, Result};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging()?;
    match cli.command {
        Command::Export(args) => {
            ensure_input(&args.input)?;
            export::xml_to_excel(&args.input, &args.output)
        }
        Command::Records(args) => {
            ensure_input(&args.input)?;
            export::records_to_json(&args.input, &args.output)
        }
        Command::Timeline(args) => {
            ensure_input(&args.input)?;
            export::timeline_to_json(&args.input, &args.output)
        }
    }
}

fn init_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .map_err(|error| ExportError::Logging(error.to_string()))
}

fn ensure_input(path: &PathBuf) -> Result<()> {
    if !path.exists() {
        return Err(ExportError::MissingInput(path.clone()));
    }
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Flatten login-statistics XML documents and export styled workbooks."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export a statistics XML document as a styled Excel workbook.
    Export(IoArgs),
    /// Dump the flattened record stream as JSON.
    Records(IoArgs),
    /// Extract the year/month aggregate time series as JSON.
    Timeline(IoArgs),
}

#[derive(clap::Args)]
struct IoArgs {
    /// Input XML file path.
    #[arg(long)]
    input: PathBuf,

    /// Output file path.
    #[arg(long)]
    output: PathBuf,
}
