// Matrix Fan-Out
// Expands array-typed axes into the ordered cross product of combinations

use crate::matrix::include::IncludeResolver;
use crate::matrix::models::{Axis, Binding, Combination, Combinations, IncludeEntry};

use tracing::{debug, trace};

/// Matrix expander for pipeline tasks
pub struct MatrixExpander;

impl MatrixExpander {
    /// Expand axes and merge include entries into the final combination sequence
    pub fn fan_out(axes: &[Axis], includes: &[IncludeEntry]) -> Combinations {
        let base = Self::expand(axes);
        let combinations = IncludeResolver::merge(base, includes, axes);
        debug!(
            axes = axes.len(),
            includes = includes.len(),
            combinations = combinations.len(),
            "matrix fanned out"
        );
        combinations
    }

    /// Expand axes into their cross product.
    ///
    /// Mixed-radix order: each new axis becomes the most significant digit so
    /// far. Axis values are the outer loop and existing combinations the inner
    /// loop, so adjacent indices differ only in the earliest axes.
    pub fn expand(axes: &[Axis]) -> Combinations {
        let mut axes_iter = axes.iter();
        let Some(first) = axes_iter.next() else {
            return Vec::new();
        };

        let mut combinations = Self::initialize(first);
        for axis in axes_iter {
            combinations = Self::distribute(&combinations, axis);
        }

        trace!(count = combinations.len(), "expanded matrix axes");
        combinations
    }

    /// Seed combinations from the first axis
    fn initialize(axis: &Axis) -> Combinations {
        axis.values
            .iter()
            .enumerate()
            .map(|(index, value)| Combination {
                index,
                bindings: vec![Binding::new(axis.name.clone(), value.clone())],
            })
            .collect()
    }

    /// Pair every existing combination with every value of `axis`
    fn distribute(combinations: &[Combination], axis: &Axis) -> Combinations {
        let mut expanded = Vec::with_capacity(combinations.len() * axis.values.len());
        for value in &axis.values {
            for combination in combinations {
                let mut bindings = combination.bindings.clone();
                bindings.push(Binding::new(axis.name.clone(), value.clone()));
                expanded.push(Combination {
                    index: expanded.len(),
                    bindings,
                });
            }
        }
        expanded
    }
}
