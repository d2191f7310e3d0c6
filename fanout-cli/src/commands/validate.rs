use crate::output;

use std::path::PathBuf;

use clap::Args;
use color_eyre::Result;

use fanout_service::{FanoutConfig, MatrixValidator};

/// Validate a pipeline task file
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the pipeline task YAML or JSON file
    pub task: PathBuf,
}

pub fn execute(args: ValidateArgs, config: &FanoutConfig) -> Result<()> {
    // Step 1: Parse
    output::status("Validating", &format!("{}", args.task.display()));
    let task = super::load_task(&args.task)?;
    output::check("Syntax valid");

    // Step 2: Structure
    match &task.matrix {
        Some(matrix) => output::check(&format!(
            "Structure: {} params, {} matrix params, {} include entries",
            task.params.len(),
            matrix.params.len(),
            matrix.include.len()
        )),
        None => output::info("Task is not matrixed"),
    }

    // Step 3: Semantic validation
    match MatrixValidator::validate(&task, config) {
        Ok(()) => output::check("Semantic validation passed"),
        Err(errors) => {
            output::validation_errors(&errors);
            std::process::exit(1);
        }
    }

    eprintln!();
    output::success(&format!("Task '{}' is valid", task.name));

    Ok(())
}
