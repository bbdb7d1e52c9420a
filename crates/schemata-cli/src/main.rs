mod definition;
mod logging;
mod output;
mod report;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use schemars::schema_for;
use schemata_core::{DefaultNamer, Error as CoreError};
use thiserror::Error;

use definition::SchemaDefinition;
use logging::init_logging;
use output::write_json_atomic;
use report::InspectReport;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml decode error: {0}")]
    TomlDecode(#[from] toml::de::Error),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Parser, Debug)]
#[command(name = "schemata", version, about = "Relational schema model toolkit")]
struct Cli {
    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a schema from a definition file and report its keys.
    Inspect(InspectArgs),
    /// Print the JSON Schema of the definition file format.
    JsonSchema,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Path to a `.toml` or `.json` schema definition.
    #[arg(value_name = "FILE")]
    definition: PathBuf,
    /// Optional output path for the report; defaults to stdout.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Name anonymous constraints with the default convention.
    #[arg(long, default_value_t = false)]
    name_constraints: bool,
    /// Fail when validation reports errors.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_json)?;

    match cli.command {
        Command::Inspect(args) => run_inspect(args),
        Command::JsonSchema => {
            let schema = schema_for!(SchemaDefinition);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
    }
}

fn run_inspect(args: InspectArgs) -> Result<(), CliError> {
    let InspectArgs {
        definition,
        out,
        name_constraints,
        strict,
    } = args;

    let timer = Instant::now();
    tracing::info!(event = "inspect_started", path = %definition.display());

    let mut schema = SchemaDefinition::load(&definition)?.build()?;
    let named = if name_constraints {
        schema.name_anonymous_constraints(&DefaultNamer)
    } else {
        0
    };

    let report = InspectReport::new(&schema, named);
    for issue in report.validation.errors.iter().chain(&report.validation.warnings) {
        tracing::warn!(
            event = "validation_issue",
            severity = ?issue.severity,
            code = %issue.code,
            path = %issue.path,
            message = %issue.message
        );
    }

    match &out {
        Some(path) => {
            write_json_atomic(path, &report)?;
            tracing::info!(event = "report_written", path = %path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if strict && !report.validation.is_ok() {
        tracing::error!(
            event = "inspect_finished",
            status = "failed",
            errors = report.validation.errors.len(),
            duration_ms = timer.elapsed().as_millis()
        );
        report.validation.into_result()?;
    }

    let duration_ms = timer.elapsed().as_millis();
    tracing::info!(event = "inspect_finished", status = "success", duration_ms = duration_ms);

    Ok(())
}
