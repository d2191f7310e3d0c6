use crate::output;

use std::path::PathBuf;

use clap::Args;
use color_eyre::eyre::eyre;
use color_eyre::Result;

use fanout_service::{CombinationCounter, FanoutConfig};

/// Count matrix combinations without expanding them
#[derive(Args, Debug)]
pub struct CountArgs {
    /// Path to the pipeline task YAML or JSON file
    pub task: PathBuf,
}

pub fn execute(args: CountArgs, config: &FanoutConfig) -> Result<()> {
    let task = super::load_task(&args.task)?;

    let Some(matrix) = task.matrix.as_ref().filter(|_| task.is_matrixed()) else {
        output::info(&format!("Task '{}' is not matrixed", task.name));
        println!("0");
        return Ok(());
    };

    let axes = matrix
        .axes()
        .ok_or_else(|| eyre!("Matrix params must be arrays; run `fanout validate` for details"))?;
    let includes = matrix.include_entries().ok_or_else(|| {
        eyre!("Include params must be strings; run `fanout validate` for details")
    })?;

    let count = CombinationCounter::count(&axes, &includes);
    println!("{}", count);

    match CombinationCounter::admit(&axes, &includes, config) {
        Ok(_) => output::check(&format!(
            "Within limit of {} combinations",
            config.max_combinations
        )),
        Err(e) => {
            output::error(&e.to_string());
            std::process::exit(1);
        }
    }

    Ok(())
}
