// Matrix Module
// Fan-out of matrixed pipeline tasks: expansion, include merging, counting and validation

pub mod count;
pub mod fanout;
pub mod include;
pub mod models;
pub mod validation;

pub use count::CombinationCounter;
pub use fanout::MatrixExpander;
pub use include::{IncludePolicy, IncludeResolver};
pub use models::{
    Axis, Binding, ChildSpec, Combination, Combinations, IncludeEntry, Matrix, MatrixInclude,
    PipelineTask,
};
pub use validation::{MatrixValidator, ValidationError, ValidationErrorKind};
