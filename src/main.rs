//! eds-classify - mineral classification of SEM-EDS particle tables
//!
//! # Usage
//!
//! ```bash
//! # Classify with the Kandler checklist, writing to stdout
//! eds-classify classify --input particles.csv --scheme kandler
//!
//! # ML scheme with a pretrained model, keeping the input columns
//! eds-classify classify -i particles.csv -o labels.csv --model weber.json --keep-input
//!
//! # Inspect the ratios a scheme classifies on
//! eds-classify ratios -i particles.csv --scheme donarummo
//! ```
//!
//! # Environment Variables
//!
//! - `EDS_MINERAL_CONFIG`: Path to a TOML config file
//! - `RUST_LOG`: Logging level (default: info)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use eds_mineral::config::{self, ClassifierConfig};
use eds_mineral::dispatch::{self, Classifier};
use eds_mineral::io::{self, OutputOptions};
use eds_mineral::Scheme;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "eds-classify")]
#[command(about = "Mineral classification from SEM-EDS elemental composition tables")]
#[command(version)]
struct CliArgs {
    /// TOML config file (overrides EDS_MINERAL_CONFIG and ./eds_mineral.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(Subcommand, Debug)]
enum SubCommand {
    /// Classify every row of a table
    Classify {
        /// Input table (delimited text, header first)
        #[arg(short, long)]
        input: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Scheme: donarummo, panta, kandler or ml
        #[arg(short, long)]
        scheme: Option<String>,
        /// Pretrained model for the ml scheme (JSON)
        #[arg(long, env = "EDS_MINERAL_MODEL")]
        model: Option<PathBuf>,
        /// Field delimiter
        #[arg(short, long)]
        delimiter: Option<char>,
        /// Copy the input columns in front of the labels
        #[arg(long)]
        keep_input: bool,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },

    /// Compute a scheme's ratio table without classifying
    Ratios {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long)]
        scheme: Option<String>,
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// List the available schemes and their required elements
    Schemes,

    /// Print a scheme's label vocabulary
    Vocabulary {
        #[arg(short, long)]
        scheme: String,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Write to this file instead of stdout
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

// ============================================================================
// Configuration
// ============================================================================

fn load_config(path: Option<&Path>) -> Result<ClassifierConfig> {
    match path {
        Some(p) => ClassifierConfig::load_from_file(p)
            .with_context(|| format!("Failed to load config {}", p.display())),
        None => Ok(ClassifierConfig::load()),
    }
}

fn emit(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => io::write_text(path, text)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

// ============================================================================
// Subcommands
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn run_classify(
    mut cfg: ClassifierConfig,
    input: &Path,
    output: Option<&Path>,
    scheme: Option<String>,
    model: Option<PathBuf>,
    delimiter: Option<char>,
    keep_input: bool,
    format: OutputFormat,
) -> Result<()> {
    if let Some(s) = scheme {
        cfg.classifier.scheme = s;
    }
    if model.is_some() {
        cfg.model.path = model;
    }
    if let Some(d) = delimiter {
        cfg.output.delimiter = d.to_string();
    }
    if keep_input {
        cfg.output.keep_input_columns = true;
    }
    cfg.validate().context("Invalid configuration")?;
    config::init(cfg);
    let cfg = config::get();

    let scheme = cfg.scheme();
    let classifier = if scheme.needs_model() {
        Classifier::from_config(cfg).context("Failed to load pretrained model")?
    } else {
        Classifier::new(cfg.into())
    };

    let raw = io::read_table(input, cfg.delimiter())
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let table = raw.to_element_table()?;
    let result = classifier
        .classify(&table, scheme)
        .with_context(|| format!("Classification of {} failed", input.display()))?;

    info!(report = %result.report, "Done");

    let text = match format {
        OutputFormat::Csv => io::render_output(Some(&raw), &result.output, OutputOptions::from(cfg))?,
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&result)?;
            json.push('\n');
            json
        }
    };
    emit(output, &text)
}

fn run_ratios(
    cfg: ClassifierConfig,
    input: &Path,
    output: Option<&Path>,
    scheme: Option<String>,
    delimiter: Option<char>,
) -> Result<()> {
    let scheme: Scheme = match scheme {
        Some(s) => s.parse()?,
        None => cfg.scheme(),
    };
    let delimiter = delimiter.unwrap_or_else(|| cfg.delimiter());

    let raw = io::read_table(input, delimiter)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let ratios = Classifier::new((&cfg).into()).ratios(&raw.to_element_table()?, scheme)?;
    if ratios.degenerate_rows() > 0 {
        warn!(rows = ratios.degenerate_rows(), "Rows with NaN or infinite ratios");
    }
    emit(output, &io::render_ratios(&ratios, delimiter))
}

fn run_schemes() {
    for scheme in Scheme::ALL {
        let elements: Vec<&str> = scheme.required_elements().iter().map(|e| e.symbol()).collect();
        println!(
            "{:<10} {:>2} ratios  elements: {}",
            scheme.name(),
            dispatch::ratio_specs(scheme).len(),
            elements.join(" ")
        );
    }
}

fn run_vocabulary(scheme: &str) -> Result<()> {
    let scheme: Scheme = scheme.parse()?;
    match dispatch::vocabulary(scheme) {
        Some(labels) => {
            for label in labels {
                println!("{label}");
            }
        }
        None => println!("(labels come from the pretrained model's class list)"),
    }
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    let args = CliArgs::parse();

    // Initialize logging (stderr, so stdout stays a clean table)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if args.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let cfg = load_config(args.config.as_deref())?;

    match args.command {
        SubCommand::Classify {
            input,
            output,
            scheme,
            model,
            delimiter,
            keep_input,
            format,
        } => run_classify(
            cfg,
            &input,
            output.as_deref(),
            scheme,
            model,
            delimiter,
            keep_input,
            format,
        ),
        SubCommand::Ratios {
            input,
            output,
            scheme,
            delimiter,
        } => run_ratios(cfg, &input, output.as_deref(), scheme, delimiter),
        SubCommand::Schemes => {
            run_schemes();
            Ok(())
        }
        SubCommand::Vocabulary { scheme } => run_vocabulary(&scheme),
        SubCommand::Config { write } => {
            match write {
                Some(path) => cfg
                    .save_to_file(&path)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => print!("{}", cfg.to_toml()?),
            }
            Ok(())
        }
    }
}
