use crate::output;

use std::path::PathBuf;

use clap::Args;
use color_eyre::Result;

use fanout_service::FanoutConfig;

use super::{format_value, OutputFormat};

/// Expand a pipeline task into the child specs the scheduler would create
#[derive(Args, Debug)]
pub struct ExpandArgs {
    /// Path to the pipeline task YAML or JSON file
    pub task: PathBuf,

    /// Output format
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn execute(args: ExpandArgs, config: &FanoutConfig) -> Result<()> {
    let task = super::load_task(&args.task)?;

    let children = match task.fan_out(config) {
        Ok(children) => children,
        Err(errors) => {
            output::validation_errors(&errors);
            std::process::exit(1);
        }
    };

    output::status("Expanded", &format!("'{}' into {} child(ren)", task.name, children.len()));

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&children)?),
        OutputFormat::Text => {
            for child in &children {
                println!("{}", child.name);
                for param in &child.params {
                    println!("  {} = {}", param.name, format_value(&param.value));
                }
            }
        }
    }

    Ok(())
}
