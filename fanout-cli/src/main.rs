// Fanout CLI
// Validates, counts and expands matrixed pipeline tasks and resolves result references

mod commands;
mod output;
mod telemetry;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use tracing::Level;

use commands::count::CountArgs;
use commands::expand::ExpandArgs;
use commands::resolve::ResolveArgs;
use commands::validate::ValidateArgs;

#[derive(Parser, Debug)]
#[command(name = "fanout")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Matrix fan-out and result resolution for pipeline tasks", long_about = None)]
struct Cli {
    /// Configuration file (YAML)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of combinations a single matrix may produce
    #[arg(long, global = true, env = "FANOUT_MAX_COMBINATIONS", value_name = "N")]
    max_combinations: Option<usize>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a pipeline task's params and matrix
    Validate(ValidateArgs),

    /// Count the combinations a matrix produces without expanding it
    Count(CountArgs),

    /// Expand a pipeline task into its child specs
    Expand(ExpandArgs),

    /// Resolve result references against a run-state snapshot
    Resolve(ResolveArgs),
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    telemetry::init_tracing(cli.log_json, level);

    match cli.command {
        Commands::Validate(args) => {
            let config = commands::load_config(cli.config.as_deref(), cli.max_combinations)?;
            commands::validate::execute(args, &config)
        }
        Commands::Count(args) => {
            let config = commands::load_config(cli.config.as_deref(), cli.max_combinations)?;
            commands::count::execute(args, &config)
        }
        Commands::Expand(args) => {
            let config = commands::load_config(cli.config.as_deref(), cli.max_combinations)?;
            commands::expand::execute(args, &config)
        }
        Commands::Resolve(args) => commands::resolve::execute(args),
    }
}
