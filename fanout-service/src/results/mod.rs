// Results Module
// Resolution of upstream result references and substitution-target generation

pub mod models;
pub mod replacements;
pub mod resolver;

pub use models::{
    ChildExecution, ChildOrigin, ExecutionKind, ExecutionStatus, PipelineRunState, RefParseError,
    ResolvedPipelineTask, ResolvedResultRef, ResolvedResultRefs, ResultOrigin, ResultRef,
    RunResult,
};
pub use resolver::{ResolutionError, ResolutionResult, ResultResolver};
