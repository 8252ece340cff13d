use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::Level;
use truss2d::loader::{self, InputFormat};
use truss2d::{report, Settings};

/// Solve a planar pin-jointed truss.
#[derive(Parser)]
#[command(name = "truss2d", version, about)]
struct Cli {
    /// Truss description (text format or JSON payload).
    input: PathBuf,

    /// Input format; `auto` picks JSON for a `.json` extension.
    #[arg(short, long, value_enum, default_value_t = Format::Auto)]
    format: Format,

    /// What to print.
    #[arg(short, long, value_enum, default_value_t = Output::Both)]
    output: Output,

    /// JSON settings file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the singularity tolerance of the solver.
    #[arg(short, long)]
    tolerance: Option<f64>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Auto,
    Text,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Output {
    Json,
    Summary,
    Both,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut settings = match &cli.config {
        Some(path) => Settings::from_path(path)?,
        None => Settings::default(),
    };
    if let Some(tolerance) = cli.tolerance {
        settings.solver.singularity_tolerance = tolerance;
    }

    let format = match cli.format {
        Format::Auto => InputFormat::detect(&cli.input),
        Format::Text => InputFormat::Text,
        Format::Json => InputFormat::Json,
    };

    // Each invocation owns its truss; nothing is shared between solves.
    let truss = loader::load_path(&cli.input, format, &settings.material)?;
    let result = truss.solve_with(&settings.solver)?;

    if cli.output != Output::Summary {
        println!("{}", serde_json::to_string_pretty(&report::to_json(&result))?);
    }
    if cli.output != Output::Json {
        print!("{}", report::render_summary(&result));
    }

    Ok(())
}
