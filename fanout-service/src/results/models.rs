// Result Reference Models
// References to upstream task results and the finished-execution snapshot they resolve against

use crate::params::{ParamValue, Params};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const TASK_PART: &str = "tasks";
const RESULT_PART: &str = "results";

// =============================================================================
// Result references
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid result reference '{input}': {reason}")]
pub struct RefParseError {
    pub input: String,
    pub reason: String,
}

impl RefParseError {
    fn new(input: &str, reason: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// `tasks.<pipeline_task>.results.<result>[<index>]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResultRef {
    pub pipeline_task: String,
    pub result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl ResultRef {
    pub fn new(pipeline_task: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            pipeline_task: pipeline_task.into(),
            result: result.into(),
            index: None,
        }
    }

    pub fn indexed(pipeline_task: impl Into<String>, result: impl Into<String>, index: usize) -> Self {
        Self {
            index: Some(index),
            ..Self::new(pipeline_task, result)
        }
    }

    /// Every `$(tasks.<task>.results.<result>)` reference in `text`, in order.
    /// Other `$(...)` expressions are ignored.
    pub fn extract_all(text: &str) -> Vec<ResultRef> {
        let mut refs = Vec::new();
        let mut rest = text;
        while let Some(start) = rest.find("$(") {
            let after = &rest[start + 2..];
            let Some(end) = after.find(')') else {
                break;
            };
            if let Ok(reference) = after[..end].parse::<ResultRef>() {
                refs.push(reference);
            }
            rest = &after[end + 1..];
        }
        refs
    }

    /// References found in every string, array element and object value of `params`
    pub fn extract_from_params(params: &Params) -> Vec<ResultRef> {
        let mut refs = Vec::new();
        for param in params {
            match &param.value {
                ParamValue::String(s) => refs.extend(Self::extract_all(s)),
                ParamValue::Array(values) => {
                    for value in values {
                        refs.extend(Self::extract_all(value));
                    }
                }
                ParamValue::Object(map) => {
                    for value in map.values() {
                        refs.extend(Self::extract_all(value));
                    }
                }
            }
        }
        refs
    }
}

impl FromStr for ResultRef {
    type Err = RefParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let s = input.trim();
        let rest = s
            .strip_prefix(TASK_PART)
            .and_then(|r| r.strip_prefix('.'))
            .ok_or_else(|| RefParseError::new(input, "expected 'tasks.' prefix"))?;

        let separator = format!(".{}.", RESULT_PART);
        let (task, result) = rest
            .split_once(&separator)
            .ok_or_else(|| RefParseError::new(input, "expected '.results.'"))?;

        if task.is_empty() || task.contains('.') {
            return Err(RefParseError::new(input, "invalid pipeline task name"));
        }

        let (result, index) = match result.strip_suffix(']') {
            Some(body) => {
                let (name, idx) = body
                    .rsplit_once('[')
                    .ok_or_else(|| RefParseError::new(input, "unbalanced index brackets"))?;
                let idx = idx
                    .parse::<usize>()
                    .map_err(|_| RefParseError::new(input, "index must be a non-negative integer"))?;
                (name, Some(idx))
            }
            None => (result, None),
        };

        if result.is_empty() || result.contains(['.', '[', ']']) {
            return Err(RefParseError::new(input, "invalid result name"));
        }

        Ok(ResultRef {
            pipeline_task: task.to_string(),
            result: result.to_string(),
            index,
        })
    }
}

impl fmt::Display for ResultRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            TASK_PART, self.pipeline_task, RESULT_PART, self.result
        )?;
        if let Some(index) = self.index {
            write!(f, "[{}]", index)?;
        }
        Ok(())
    }
}

// =============================================================================
// Finished executions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    #[default]
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl ExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionStatus::Succeeded | ExecutionStatus::Failed)
    }
}

/// Whether a pipeline task runs regular task runs or custom runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExecutionKind {
    #[default]
    TaskRun,
    CustomRun,
}

/// A named result emitted by a child execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub name: String,
    pub value: ParamValue,
}

impl RunResult {
    pub fn new(name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A child execution (task run or custom run) of a pipeline task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildExecution {
    pub name: String,

    /// Combination index for matrixed tasks
    #[serde(default)]
    pub index: usize,

    #[serde(default)]
    pub status: ExecutionStatus,

    #[serde(default)]
    pub results: Vec<RunResult>,
}

impl ChildExecution {
    pub fn result(&self, name: &str) -> Option<&ParamValue> {
        self.results.iter().find(|r| r.name == name).map(|r| &r.value)
    }
}

/// A pipeline task as seen by the reconciler, with its child executions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPipelineTask {
    pub name: String,

    #[serde(default)]
    pub matrixed: bool,

    #[serde(default)]
    pub kind: ExecutionKind,

    #[serde(default)]
    pub executions: Vec<ChildExecution>,
}

impl ResolvedPipelineTask {
    /// Terminal once it has children and none of them is still going
    pub fn is_finished(&self) -> bool {
        !self.executions.is_empty() && self.executions.iter().all(|e| e.status.is_terminal())
    }

    pub fn is_successful(&self) -> bool {
        !self.executions.is_empty()
            && self
                .executions
                .iter()
                .all(|e| e.status == ExecutionStatus::Succeeded)
    }

    pub fn is_failure(&self) -> bool {
        self.is_finished() && !self.is_successful()
    }

    pub fn is_custom_task(&self) -> bool {
        self.kind == ExecutionKind::CustomRun
    }

    /// First combination index claimed by more than one child
    pub fn duplicate_index(&self) -> Option<usize> {
        let mut seen = BTreeSet::new();
        self.executions
            .iter()
            .map(|e| e.index)
            .find(|index| !seen.insert(*index))
    }

    /// Children sorted by combination index
    pub fn executions_by_index(&self) -> Vec<&ChildExecution> {
        let mut executions: Vec<&ChildExecution> = self.executions.iter().collect();
        executions.sort_by_key(|e| e.index);
        executions
    }
}

/// Snapshot of all pipeline tasks of a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRunState {
    #[serde(default)]
    pub tasks: Vec<ResolvedPipelineTask>,
}

impl PipelineRunState {
    pub fn get(&self, name: &str) -> Option<&ResolvedPipelineTask> {
        self.tasks.iter().find(|t| t.name == name)
    }
}

// =============================================================================
// Resolved results
// =============================================================================

/// A child execution that contributed an element to an aggregated result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildOrigin {
    /// Combination index of the child
    pub index: usize,
    pub name: String,
}

impl ChildOrigin {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }
}

/// Where a resolved value came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResultOrigin {
    TaskRun(String),
    Run(String),
    /// Aggregated over the children of a matrixed task, one entry per array
    /// element, in index order
    TaskRuns(Vec<ChildOrigin>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedResultRef {
    pub value: ParamValue,
    pub reference: ResultRef,
    pub origin: ResultOrigin,
}

/// Deduplicated, sorted resolved results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedResultRefs(pub Vec<ResolvedResultRef>);

impl ResolvedResultRefs {
    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedResultRef> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
