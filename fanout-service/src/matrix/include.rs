// Include Merge
// Merges explicit include entries into the base cross product

use crate::matrix::models::{Axis, Binding, Combination, Combinations, IncludeEntry};

use tracing::{debug, trace};

/// How a single include binding relates to the matrix axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludePolicy {
    /// Name is not an axis: carried by every combination
    Broadcast,
    /// Name is an axis and the value is one of its declared values
    Patch,
    /// Name is an axis but the value is not declared: a standalone combination
    NewBranch,
}

impl IncludePolicy {
    pub fn classify(binding: &Binding, axes: &[Axis]) -> Self {
        match axes.iter().find(|axis| axis.name == binding.name) {
            None => IncludePolicy::Broadcast,
            Some(axis) if axis.contains(&binding.value) => IncludePolicy::Patch,
            Some(_) => IncludePolicy::NewBranch,
        }
    }
}

/// Resolver applying include entries to a combination set
pub struct IncludeResolver;

impl IncludeResolver {
    /// Merge `includes` into `base`, entry by entry in declaration order.
    ///
    /// With no axes every non-empty include entry becomes its own combination
    /// verbatim; label-only entries produce nothing.
    pub fn merge(base: Combinations, includes: &[IncludeEntry], axes: &[Axis]) -> Combinations {
        if axes.is_empty() {
            return Self::explicit_combinations(includes);
        }

        let mut combinations = base;
        for entry in includes {
            Self::apply_entry(&mut combinations, entry, axes);
        }
        combinations
    }

    fn explicit_combinations(includes: &[IncludeEntry]) -> Combinations {
        let mut combinations = Vec::new();
        for entry in includes.iter().filter(|e| !e.params.is_empty()) {
            let index = combinations.len();
            combinations.push(Self::standalone(index, entry));
        }
        debug!(count = combinations.len(), "built explicit include combinations");
        combinations
    }

    fn apply_entry(combinations: &mut Combinations, entry: &IncludeEntry, axes: &[Axis]) {
        let classified: Vec<(&Binding, IncludePolicy)> = entry
            .params
            .iter()
            .map(|binding| (binding, IncludePolicy::classify(binding, axes)))
            .collect();

        trace!(include = %entry.name, ?classified, "classified include entry");

        let has = |policy: IncludePolicy| classified.iter().any(|(_, p)| *p == policy);

        if has(IncludePolicy::Patch) {
            let mut patched = 0usize;
            for combination in combinations.iter_mut() {
                if Self::matches(combination, entry) {
                    for binding in &entry.params {
                        combination.bind_if_absent(binding);
                    }
                    patched += 1;
                }
            }
            debug!(include = %entry.name, patched, "patched matching combinations");
        }

        for (binding, _) in classified
            .iter()
            .filter(|(_, policy)| *policy == IncludePolicy::Broadcast)
        {
            for combination in combinations.iter_mut() {
                combination.bind_if_absent(binding);
            }
            debug!(include = %entry.name, param = %binding.name, "broadcast include param");
        }

        // One new branch per entry no matter how many of its values are unknown
        if has(IncludePolicy::NewBranch) {
            let index = combinations.len();
            combinations.push(Self::standalone(index, entry));
            debug!(include = %entry.name, index, "appended new branch combination");
        }
    }

    /// A combination matches an entry when it agrees with at least one of the
    /// entry's bindings and contradicts none of them.
    fn matches(combination: &Combination, entry: &IncludeEntry) -> bool {
        let mut agrees = false;
        for binding in &entry.params {
            match combination.get(&binding.name) {
                Some(value) if value == binding.value => agrees = true,
                Some(_) => return false,
                None => {}
            }
        }
        agrees
    }

    fn standalone(index: usize, entry: &IncludeEntry) -> Combination {
        let mut combination = Combination::new(index);
        for binding in &entry.params {
            combination.bind_if_absent(binding);
        }
        combination
    }
}
