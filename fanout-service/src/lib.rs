// Fan-Out Service Library
// Matrix fan-out and cross-run result aggregation for pipeline orchestration

pub mod config;
pub mod loader;
pub mod matrix;
pub mod params;
pub mod results;

// Re-export commonly used types
pub use config::{ConfigError, FanoutConfig, DEFAULT_MAX_MATRIX_COMBINATIONS};
pub use loader::{LoadError, Loader};
pub use params::{Param, ParamType, ParamValue, Params};

// Re-export matrix types
pub use matrix::{
    Axis, Binding, ChildSpec, Combination, CombinationCounter, Combinations, IncludeEntry,
    IncludePolicy, IncludeResolver, Matrix, MatrixExpander, MatrixInclude, MatrixValidator,
    PipelineTask, ValidationError, ValidationErrorKind,
};

// Re-export result types
pub use results::{
    ChildExecution, ChildOrigin, ExecutionKind, ExecutionStatus, PipelineRunState, ResolutionError,
    ResolvedPipelineTask, ResolvedResultRef, ResolvedResultRefs, ResultOrigin, ResultRef,
    ResultResolver, RunResult,
};
