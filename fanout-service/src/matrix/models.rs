// Matrix Data Models
// Declarative matrix types as authored in a pipeline task, and the typed views used by fan-out

use crate::config::FanoutConfig;
use crate::matrix::fanout::MatrixExpander;
use crate::matrix::validation::{MatrixValidator, ValidationError};
use crate::params::{Param, ParamValue, Params};

use serde::{Deserialize, Serialize};

// =============================================================================
// Declaration types
// =============================================================================

/// Matrix as declared on a pipeline task.
///
/// `params` are the axes and must be array-typed; `include` entries carry
/// string-typed parameters only. Both constraints are checked by
/// [`MatrixValidator`] before any fan-out runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matrix {
    #[serde(default)]
    pub params: Params,

    #[serde(default)]
    pub include: Vec<MatrixInclude>,
}

/// An explicit combination (or partial combination) merged into the matrix
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixInclude {
    /// Label only, never used for matching
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub params: Params,
}

impl Matrix {
    pub fn has_params(&self) -> bool {
        !self.params.is_empty()
    }

    pub fn has_include(&self) -> bool {
        !self.include.is_empty()
    }

    /// Typed axes, in declaration order.
    ///
    /// Returns `None` if any axis is not array-typed.
    pub fn axes(&self) -> Option<Vec<Axis>> {
        self.params
            .iter()
            .map(|param| {
                param.value.as_array().map(|values| Axis {
                    name: param.name.clone(),
                    values: values.to_vec(),
                })
            })
            .collect()
    }

    /// Typed include entries, in declaration order.
    ///
    /// Returns `None` if any include parameter is not string-typed.
    pub fn include_entries(&self) -> Option<Vec<IncludeEntry>> {
        self.include
            .iter()
            .map(|include| {
                let params = include
                    .params
                    .iter()
                    .map(|param| {
                        param
                            .value
                            .as_str()
                            .map(|value| Binding::new(param.name.clone(), value))
                    })
                    .collect::<Option<Vec<_>>>()?;
                Some(IncludeEntry {
                    name: include.name.clone(),
                    params,
                })
            })
            .collect()
    }
}

// =============================================================================
// Typed views
// =============================================================================

/// A single `name = value` string binding
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Binding {
    pub name: String,
    pub value: String,
}

impl Binding {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One matrix dimension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Axis {
    pub name: String,
    pub values: Vec<String>,
}

impl Axis {
    pub fn new(name: impl Into<String>, values: &[&str]) -> Self {
        Self {
            name: name.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

/// Typed include entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeEntry {
    pub name: String,
    pub params: Vec<Binding>,
}

impl IncludeEntry {
    pub fn new(name: impl Into<String>, params: &[(&str, &str)]) -> Self {
        Self {
            name: name.into(),
            params: params.iter().map(|(n, v)| Binding::new(*n, *v)).collect(),
        }
    }
}

/// One concrete assignment of values, becoming one child execution.
///
/// `index` is positional: combination *i* is always child execution *i*.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combination {
    pub index: usize,
    pub bindings: Vec<Binding>,
}

/// Ordered combinations, index order
pub type Combinations = Vec<Combination>;

impl Combination {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            bindings: Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| b.name == name)
            .map(|b| b.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.iter().any(|b| b.name == name)
    }

    /// Appends the binding unless its name is already bound.
    /// Returns whether anything was added.
    pub fn bind_if_absent(&mut self, binding: &Binding) -> bool {
        if self.contains(&binding.name) {
            return false;
        }
        self.bindings.push(binding.clone());
        true
    }

    /// Bindings as string-typed parameters
    pub fn to_params(&self) -> Params {
        self.bindings
            .iter()
            .map(|b| Param::new(b.name.clone(), ParamValue::String(b.value.clone())))
            .collect()
    }

    /// Deterministic child execution name, `<task>-<index>`
    pub fn child_name(&self, task_name: &str) -> String {
        format!("{}-{}", task_name, self.index)
    }
}

// =============================================================================
// Pipeline task
// =============================================================================

/// The slice of a pipeline task declaration this crate cares about
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineTask {
    pub name: String,

    /// Plain (non-matrix) parameters
    #[serde(default)]
    pub params: Params,

    #[serde(default)]
    pub matrix: Option<Matrix>,
}

/// A concrete child execution to be created by the scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildSpec {
    pub name: String,
    pub index: usize,
    pub params: Params,
}

impl PipelineTask {
    pub fn is_matrixed(&self) -> bool {
        self.matrix
            .as_ref()
            .is_some_and(|m| m.has_params() || m.has_include())
    }

    /// Validate, admit and fan the task out into child specs.
    ///
    /// Non-matrixed tasks produce a single child named after the task.
    pub fn fan_out(&self, config: &FanoutConfig) -> Result<Vec<ChildSpec>, Vec<ValidationError>> {
        MatrixValidator::validate(self, config)?;

        let matrix = match &self.matrix {
            Some(matrix) if self.is_matrixed() => matrix,
            _ => {
                return Ok(vec![ChildSpec {
                    name: self.name.clone(),
                    index: 0,
                    params: self.params.clone(),
                }])
            }
        };

        // Validation guarantees both typed views exist
        let axes = matrix.axes().unwrap_or_default();
        let includes = matrix.include_entries().unwrap_or_default();

        let children = MatrixExpander::fan_out(&axes, &includes)
            .into_iter()
            .map(|combination| {
                let mut params = self.params.clone();
                params.0.extend(combination.to_params().0);
                ChildSpec {
                    name: combination.child_name(&self.name),
                    index: combination.index,
                    params,
                }
            })
            .collect();

        Ok(children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn go_matrix() -> Matrix {
        Matrix {
            params: vec![
                Param::new("GOARCH", vec!["linux/amd64", "linux/ppc64le"]),
                Param::new("version", vec!["go1.17", "go1.18.1"]),
            ]
            .into(),
            include: vec![MatrixInclude {
                name: "common-package".to_string(),
                params: vec![Param::string("package", "path/to/common/package/")].into(),
            }],
        }
    }

    #[test]
    fn test_typed_axes() {
        let axes = go_matrix().axes().unwrap();
        assert_eq!(axes.len(), 2);
        assert_eq!(axes[0].name, "GOARCH");
        assert!(axes[0].contains("linux/ppc64le"));
        assert!(!axes[1].contains("go1.19"));
    }

    #[test]
    fn test_typed_views_reject_wrong_types() {
        let mut matrix = go_matrix();
        matrix.params.push(Param::string("flags", "-v"));
        assert!(matrix.axes().is_none());

        let mut matrix = go_matrix();
        matrix.include[0]
            .params
            .push(Param::new("images", vec!["a", "b"]));
        assert!(matrix.include_entries().is_none());
    }

    #[test]
    fn test_combination_bind_if_absent() {
        let mut combination = Combination::new(3);
        assert!(combination.bind_if_absent(&Binding::new("os", "linux")));
        assert!(!combination.bind_if_absent(&Binding::new("os", "mac")));
        assert_eq!(combination.get("os"), Some("linux"));
        assert_eq!(combination.child_name("build"), "build-3");
    }

    #[test]
    fn test_is_matrixed() {
        let mut task = PipelineTask {
            name: "build".to_string(),
            ..Default::default()
        };
        assert!(!task.is_matrixed());

        task.matrix = Some(Matrix::default());
        assert!(!task.is_matrixed());

        task.matrix = Some(go_matrix());
        assert!(task.is_matrixed());
    }

    #[test]
    fn test_fan_out_names_children_by_index() {
        let task = PipelineTask {
            name: "build".to_string(),
            params: vec![Param::string("flags", "-race")].into(),
            matrix: Some(go_matrix()),
        };

        let children = task.fan_out(&FanoutConfig::default()).unwrap();
        assert_eq!(children.len(), 4);
        for (i, child) in children.iter().enumerate() {
            assert_eq!(child.index, i);
            assert_eq!(child.name, format!("build-{}", i));
            assert_eq!(child.params.get("flags"), Some(&ParamValue::from("-race")));
            assert_eq!(
                child.params.get("package"),
                Some(&ParamValue::from("path/to/common/package/"))
            );
        }
        assert_eq!(
            children[1].params.get("GOARCH"),
            Some(&ParamValue::from("linux/ppc64le"))
        );
    }

    #[test]
    fn test_fan_out_non_matrixed_task() {
        let task = PipelineTask {
            name: "lint".to_string(),
            params: vec![Param::string("path", "./...")].into(),
            matrix: None,
        };

        let children = task.fan_out(&FanoutConfig::default()).unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "lint");
        assert_eq!(children[0].params.len(), 1);
    }

    #[test]
    fn test_fan_out_rejects_invalid_task() {
        let task = PipelineTask {
            name: "build".to_string(),
            params: vec![Param::string("GOARCH", "linux/amd64")].into(),
            matrix: Some(go_matrix()),
        };

        let errors = task.fan_out(&FanoutConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
    }
}
