// Result Reference Resolver
// Resolves references to upstream results against finished child executions

use crate::matrix::models::PipelineTask;
use crate::params::ParamValue;
use crate::results::models::{
    ChildExecution, ChildOrigin, PipelineRunState, ResolvedPipelineTask, ResolvedResultRef, ResolvedResultRefs,
    ResultOrigin, ResultRef,
};

use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, trace};

/// Errors that make a reference unresolvable. Each names the producing task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("could not find task \"{task}\" referenced by result")]
    UnknownTask { task: String },

    #[error("task \"{task}\" referenced by result was not finished")]
    TaskNotFinished { task: String },

    #[error("invalid task result reference: could not find result with name {result} for task {task}")]
    ResultNotFound { task: String, result: String },

    #[error("result index {index} for task {task} result {result} is out of bound of size {size}")]
    IndexOutOfBounds {
        task: String,
        result: String,
        index: usize,
        size: usize,
    },

    #[error("result {result} of task {task} is not an array and cannot be indexed with [{index}]")]
    IndexOnNonArray {
        task: String,
        result: String,
        index: usize,
    },
}

impl ResolutionError {
    /// The producing pipeline task the failing reference pointed at
    pub fn pipeline_task(&self) -> &str {
        match self {
            ResolutionError::UnknownTask { task }
            | ResolutionError::TaskNotFinished { task }
            | ResolutionError::ResultNotFound { task, .. }
            | ResolutionError::IndexOutOfBounds { task, .. }
            | ResolutionError::IndexOnNonArray { task, .. } => task,
        }
    }
}

pub type ResolutionResult<T> = Result<T, ResolutionError>;

/// Resolver for result references
pub struct ResultResolver;

impl ResultResolver {
    /// Resolve a single reference
    pub fn resolve(
        state: &PipelineRunState,
        reference: &ResultRef,
    ) -> ResolutionResult<ResolvedResultRef> {
        let task = state
            .get(&reference.pipeline_task)
            .ok_or_else(|| ResolutionError::UnknownTask {
                task: reference.pipeline_task.clone(),
            })?;

        if !task.is_finished() {
            return Err(ResolutionError::TaskNotFinished {
                task: task.name.clone(),
            });
        }

        let resolved = if task.matrixed {
            Self::resolve_matrixed(task, reference)?
        } else {
            Self::resolve_single(task, reference)?
        };

        trace!(reference = %reference, origin = ?resolved.origin, "resolved result reference");
        Ok(resolved)
    }

    /// Resolve a batch of references, stopping at the first unresolvable one.
    /// The output is deduplicated and sorted.
    pub fn resolve_all(
        state: &PipelineRunState,
        references: &[ResultRef],
    ) -> ResolutionResult<ResolvedResultRefs> {
        let resolved = references
            .iter()
            .map(|reference| Self::resolve(state, reference))
            .collect::<ResolutionResult<Vec<_>>>()?;

        let deduped = Self::dedup(resolved);
        debug!(
            requested = references.len(),
            resolved = deduped.len(),
            "resolved result references"
        );
        Ok(deduped)
    }

    /// Resolve every result reference used by a pipeline task's params,
    /// matrix axes and include entries
    pub fn resolve_for_task(
        state: &PipelineRunState,
        target: &PipelineTask,
    ) -> ResolutionResult<ResolvedResultRefs> {
        let mut references = ResultRef::extract_from_params(&target.params);
        if let Some(matrix) = &target.matrix {
            references.extend(ResultRef::extract_from_params(&matrix.params));
            for include in &matrix.include {
                references.extend(ResultRef::extract_from_params(&include.params));
            }
        }
        Self::resolve_all(state, &references)
    }

    /// Keep one entry per reference, ordered by task, result, then index.
    /// Duplicates carry the same upstream value, so the first one wins.
    pub fn dedup(resolved: Vec<ResolvedResultRef>) -> ResolvedResultRefs {
        let mut by_ref: BTreeMap<ResultRef, ResolvedResultRef> = BTreeMap::new();
        for r in resolved {
            by_ref.entry(r.reference.clone()).or_insert(r);
        }
        ResolvedResultRefs(by_ref.into_values().collect())
    }

    fn origin(task: &ResolvedPipelineTask, execution: &ChildExecution) -> ResultOrigin {
        if task.is_custom_task() {
            ResultOrigin::Run(execution.name.clone())
        } else {
            ResultOrigin::TaskRun(execution.name.clone())
        }
    }

    fn not_found(reference: &ResultRef) -> ResolutionError {
        ResolutionError::ResultNotFound {
            task: reference.pipeline_task.clone(),
            result: reference.result.clone(),
        }
    }

    fn resolve_single(
        task: &ResolvedPipelineTask,
        reference: &ResultRef,
    ) -> ResolutionResult<ResolvedResultRef> {
        let execution = task
            .executions
            .first()
            .ok_or_else(|| Self::not_found(reference))?;
        let value = execution
            .result(&reference.result)
            .ok_or_else(|| Self::not_found(reference))?;

        let value = match reference.index {
            None => value.clone(),
            Some(index) => {
                let values = value.as_array().ok_or_else(|| ResolutionError::IndexOnNonArray {
                    task: reference.pipeline_task.clone(),
                    result: reference.result.clone(),
                    index,
                })?;
                let element = values
                    .get(index)
                    .ok_or_else(|| ResolutionError::IndexOutOfBounds {
                        task: reference.pipeline_task.clone(),
                        result: reference.result.clone(),
                        index,
                        size: values.len(),
                    })?;
                ParamValue::String(element.clone())
            }
        };

        Ok(ResolvedResultRef {
            value,
            reference: reference.clone(),
            origin: Self::origin(task, execution),
        })
    }

    fn resolve_matrixed(
        task: &ResolvedPipelineTask,
        reference: &ResultRef,
    ) -> ResolutionResult<ResolvedResultRef> {
        match reference.index {
            Some(index) => {
                // Combination i is the child whose index is i, not the i-th child
                let execution = task
                    .executions
                    .iter()
                    .find(|e| e.index == index)
                    .ok_or_else(|| ResolutionError::IndexOutOfBounds {
                        task: reference.pipeline_task.clone(),
                        result: reference.result.clone(),
                        index,
                        size: task.executions.len(),
                    })?;
                let value = execution
                    .result(&reference.result)
                    .and_then(ParamValue::as_str)
                    .ok_or_else(|| Self::not_found(reference))?;

                Ok(ResolvedResultRef {
                    value: ParamValue::String(value.to_string()),
                    reference: reference.clone(),
                    origin: Self::origin(task, execution),
                })
            }
            None => {
                // Children lacking the result are skipped
                let (children, values): (Vec<ChildOrigin>, Vec<String>) = task
                    .executions_by_index()
                    .into_iter()
                    .filter_map(|e| {
                        e.result(&reference.result)
                            .and_then(ParamValue::as_str)
                            .map(|v| (ChildOrigin::new(e.index, e.name.clone()), v.to_string()))
                    })
                    .unzip();

                if values.is_empty() {
                    return Err(Self::not_found(reference));
                }

                Ok(ResolvedResultRef {
                    value: ParamValue::Array(values),
                    reference: reference.clone(),
                    origin: ResultOrigin::TaskRuns(children),
                })
            }
        }
    }
}
