use crate::output;

use std::path::PathBuf;

use clap::Args;
use color_eyre::eyre::{bail, WrapErr};
use color_eyre::Result;
use serde_json::json;

use fanout_service::{Loader, ParamValue, ResultRef, ResultResolver};

use super::{format_value, OutputFormat};

/// Resolve result references against a pipeline run-state snapshot
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Path to the run-state YAML or JSON file
    pub state: PathBuf,

    /// References such as `tasks.build.results.digest[0]` or `$(tasks.build.results.digest)`
    #[arg(required = true)]
    pub references: Vec<String>,

    /// Output format
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn execute(args: ResolveArgs) -> Result<()> {
    if !args.state.exists() {
        bail!("Run state file not found: {}", args.state.display());
    }
    let state = Loader::load_run_state(&args.state)
        .wrap_err_with(|| format!("Failed to load run state {}", args.state.display()))?;

    let mut references = Vec::new();
    for raw in &args.references {
        if raw.contains("$(") {
            let found = ResultRef::extract_all(raw);
            if found.is_empty() {
                bail!("No result reference found in '{}'", raw);
            }
            references.extend(found);
        } else {
            references.push(raw.parse::<ResultRef>()?);
        }
    }

    output::status("Resolving", &format!("{} reference(s)", references.len()));

    let resolved = match ResultResolver::resolve_all(&state, &references) {
        Ok(resolved) => resolved,
        Err(e) => {
            output::error(&e.to_string());
            std::process::exit(1);
        }
    };

    let strings = resolved.string_replacements();
    let arrays = resolved.array_replacements();
    let objects = resolved.object_replacements();

    match args.format {
        OutputFormat::Json => {
            let document = json!({
                "strings": strings,
                "arrays": arrays,
                "objects": objects,
            });
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        OutputFormat::Text => {
            for (target, value) in &strings {
                output::row(target, value);
            }
            for (target, values) in &arrays {
                output::row(target, &format_value(&ParamValue::Array(values.clone())));
            }
            for (target, map) in &objects {
                output::row(target, &format_value(&ParamValue::Object(map.clone())));
            }
        }
    }

    Ok(())
}
