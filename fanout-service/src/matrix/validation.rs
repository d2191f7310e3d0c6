// Matrix Validation
// Definition-time checks on matrixed pipeline tasks, collected rather than short-circuited

use crate::config::FanoutConfig;
use crate::matrix::count::CombinationCounter;
use crate::matrix::models::{Matrix, PipelineTask};
use crate::params::{ParamType, Params};

use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Axis not array-typed, or include param not string-typed
    TypeMismatch,
    /// Combination count exceeds the configured maximum
    CombinationOverflow,
    /// Same name used as a matrix axis and as a plain task param
    NameCollision,
    /// Axis name declared more than once
    DuplicateAxis,
}

/// Validation error for a single field of a pipeline task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub message: String,
    pub path: String,
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            path: path.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn type_mismatch(expected: ParamType, got: ParamType, path: impl Into<String>) -> Self {
        Self::new(
            ValidationErrorKind::TypeMismatch,
            format!(
                "parameters of type {} only are allowed, but got param type {}",
                expected, got
            ),
            path,
        )
    }

    pub fn combination_overflow(count: usize, max: usize) -> Self {
        Self::new(
            ValidationErrorKind::CombinationOverflow,
            format!("expected 0 <= {} <= {}", count, max),
            "matrix",
        )
        .with_suggestion(
            "reduce the number of matrix values or raise the maximum combinations count",
        )
    }

    pub fn name_collision(name: &str) -> Self {
        Self::new(
            ValidationErrorKind::NameCollision,
            "expected exactly one, got both",
            format!("matrix[{}], params[{}]", name, name),
        )
        .with_suggestion(format!(
            "pass '{}' either as a matrix parameter or as a task parameter",
            name
        ))
    }

    pub fn duplicate_axis(name: &str) -> Self {
        Self::new(
            ValidationErrorKind::DuplicateAxis,
            format!("matrix parameter '{}' is declared more than once", name),
            format!("matrix.params[{}]", name),
        )
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation error at '{}': {}", self.path, self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " ({})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Validator for matrixed pipeline tasks
pub struct MatrixValidator;

impl MatrixValidator {
    /// Validate a pipeline task, returning every problem found
    pub fn validate(task: &PipelineTask, config: &FanoutConfig) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Some(matrix) = &task.matrix {
            let types_ok = Self::validate_param_types(matrix, &mut errors);
            Self::validate_unique_axes(matrix, &mut errors);
            Self::validate_one_of_matrix_or_params(matrix, &task.params, &mut errors);

            // Counting assumes well-typed input
            if types_ok {
                Self::validate_combinations_count(matrix, config, &mut errors);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            tracing::debug!(task = %task.name, errors = errors.len(), "pipeline task rejected");
            Err(errors)
        }
    }

    /// Returns whether all types were valid
    fn validate_param_types(matrix: &Matrix, errors: &mut Vec<ValidationError>) -> bool {
        let before = errors.len();

        for (i, include) in matrix.include.iter().enumerate() {
            for param in &include.params {
                if !param.value.is_string() {
                    errors.push(ValidationError::type_mismatch(
                        ParamType::String,
                        param.value.param_type(),
                        format!("matrix.include[{}].params[{}]", i, param.name),
                    ));
                }
            }
        }

        for param in &matrix.params {
            if !param.value.is_array() {
                errors.push(ValidationError::type_mismatch(
                    ParamType::Array,
                    param.value.param_type(),
                    format!("matrix.params[{}]", param.name),
                ));
            }
        }

        errors.len() == before
    }

    fn validate_unique_axes(matrix: &Matrix, errors: &mut Vec<ValidationError>) {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        for name in matrix.params.names() {
            if !seen.insert(name) && reported.insert(name) {
                errors.push(ValidationError::duplicate_axis(name));
            }
        }
    }

    fn validate_one_of_matrix_or_params(
        matrix: &Matrix,
        params: &Params,
        errors: &mut Vec<ValidationError>,
    ) {
        for name in params.names() {
            if matrix.params.contains(name) {
                errors.push(ValidationError::name_collision(name));
            }
        }
    }

    fn validate_combinations_count(
        matrix: &Matrix,
        config: &FanoutConfig,
        errors: &mut Vec<ValidationError>,
    ) {
        let (Some(axes), Some(includes)) = (matrix.axes(), matrix.include_entries()) else {
            return;
        };
        if let Err(err) = CombinationCounter::admit(&axes, &includes, config) {
            errors.push(err);
        }
    }
}
