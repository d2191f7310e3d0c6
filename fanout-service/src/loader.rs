// Document Loader
// Reads pipeline task declarations and run-state snapshots from YAML or JSON

use crate::matrix::models::PipelineTask;
use crate::results::models::PipelineRunState;

use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Matrixed task {task} has more than one child with index {index}")]
    DuplicateChildIndex { task: String, index: usize },
}

pub type LoadResult<T> = Result<T, LoadError>;

/// Loader for pipeline task and run-state documents
pub struct Loader;

impl Loader {
    pub fn parse_pipeline_task(content: &str) -> LoadResult<PipelineTask> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn parse_run_state(content: &str) -> LoadResult<PipelineRunState> {
        Self::check_run_state(serde_yaml::from_str(content)?)
    }

    pub fn load_pipeline_task<P: AsRef<Path>>(path: P) -> LoadResult<PipelineTask> {
        Self::load(path.as_ref())
    }

    pub fn load_run_state<P: AsRef<Path>>(path: P) -> LoadResult<PipelineRunState> {
        Self::check_run_state(Self::load(path.as_ref())?)
    }

    /// Each child of a matrixed task must own a distinct combination index.
    /// A snapshot that omits `index` on matrixed children fails here.
    fn check_run_state(state: PipelineRunState) -> LoadResult<PipelineRunState> {
        for task in state.tasks.iter().filter(|t| t.matrixed) {
            if let Some(index) = task.duplicate_index() {
                return Err(LoadError::DuplicateChildIndex {
                    task: task.name.clone(),
                    index,
                });
            }
        }
        Ok(state)
    }

    /// `.json` files go through serde_json for exact error positions; all
    /// else is treated as YAML
    fn load<T: DeserializeOwned>(path: &Path) -> LoadResult<T> {
        let content = fs::read_to_string(path).map_err(|source| LoadError::IoError {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(serde_yaml::from_str(&content)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamValue;
    use std::io::Write;

    const TASK_YAML: &str = r#"
name: browser-test
params:
  - name: url
    value: https://example.com
matrix:
  params:
    - name: platform
      value: [linux, mac, windows]
    - name: browser
      value: [chrome, safari, firefox]
  include:
    - name: common
      params:
        - name: timeout
          value: "30m"
"#;

    #[test]
    fn test_parse_pipeline_task() {
        let task = Loader::parse_pipeline_task(TASK_YAML).unwrap();
        assert_eq!(task.name, "browser-test");
        assert!(task.is_matrixed());

        let matrix = task.matrix.unwrap();
        assert_eq!(matrix.params.len(), 2);
        assert!(matrix.params.get("platform").unwrap().is_array());
        assert_eq!(
            matrix.include[0].params.get("timeout"),
            Some(&ParamValue::from("30m"))
        );
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let err = Loader::parse_pipeline_task("name: [unterminated").unwrap_err();
        assert!(matches!(err, LoadError::YamlError(_)));
    }

    #[test]
    fn test_load_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"tasks": [{{"name": "build", "executions": [{{"name": "build-run", "status": "succeeded"}}]}}]}}"#
        )
        .unwrap();

        let state = Loader::load_run_state(file.path()).unwrap();
        assert!(state.get("build").unwrap().is_finished());
    }

    #[test]
    fn test_parse_run_state_rejects_duplicate_child_index() {
        let yaml = r#"
tasks:
  - name: build
    matrixed: true
    executions:
      - name: build-0
        status: succeeded
      - name: build-1
        status: succeeded
"#;
        let err = Loader::parse_run_state(yaml).unwrap_err();
        assert!(matches!(
            err,
            LoadError::DuplicateChildIndex { ref task, index: 0 } if task == "build"
        ));

        let yaml = yaml.replace("build-1\n", "build-1\n        index: 1\n");
        let state = Loader::parse_run_state(&yaml).unwrap();
        assert_eq!(state.get("build").unwrap().executions.len(), 2);
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(TASK_YAML.as_bytes()).unwrap();

        let task = Loader::load_pipeline_task(file.path()).unwrap();
        assert_eq!(task.params.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Loader::load_pipeline_task("/no/such/task.yaml").unwrap_err();
        assert!(matches!(err, LoadError::IoError { .. }));
        assert!(err.to_string().contains("/no/such/task.yaml"));
    }
}
