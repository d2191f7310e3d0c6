pub mod count;
pub mod expand;
pub mod resolve;
pub mod validate;

use crate::output;

use std::path::Path;

use clap::ValueEnum;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;

use fanout_service::{FanoutConfig, Loader, ParamValue, PipelineTask};

/// Output format for commands that print data on stdout
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Build the effective config: flag or env first, then config file, then defaults
pub fn load_config(path: Option<&Path>, max_combinations: Option<usize>) -> Result<FanoutConfig> {
    let config = match path {
        Some(path) => FanoutConfig::from_file(path)
            .wrap_err_with(|| format!("Failed to load config {}", path.display()))?,
        None => FanoutConfig::default(),
    };

    match max_combinations {
        Some(max) => Ok(FanoutConfig::with_max_combinations(max)?),
        None => Ok(config),
    }
}

/// Load a pipeline task file, exiting with a parse diagnostic on failure
pub fn load_task(path: &Path) -> Result<PipelineTask> {
    if !path.exists() {
        color_eyre::eyre::bail!("Task file not found: {}", path.display());
    }

    match Loader::load_pipeline_task(path) {
        Ok(task) => Ok(task),
        Err(e) => {
            output::error(&format!("Parse error: {}", e));
            std::process::exit(1);
        }
    }
}

/// Single-line rendering of a param value for text output
pub fn format_value(value: &ParamValue) -> String {
    match value {
        ParamValue::String(s) => s.clone(),
        ParamValue::Array(values) => format!("[{}]", values.join(", ")),
        ParamValue::Object(map) => {
            let fields: Vec<String> = map.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
            format!("{{{}}}", fields.join(", "))
        }
    }
}
