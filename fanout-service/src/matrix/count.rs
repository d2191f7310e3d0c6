// Combination Counter
// Closed-form combination count used for admission before any expansion runs

use crate::config::FanoutConfig;
use crate::matrix::models::{Axis, IncludeEntry};
use crate::matrix::validation::ValidationError;

use tracing::debug;

pub struct CombinationCounter;

impl CombinationCounter {
    /// Number of combinations fan-out would produce, without producing them.
    ///
    /// Always equal to `MatrixExpander::fan_out(axes, includes).len()`.
    pub fn count(axes: &[Axis], includes: &[IncludeEntry]) -> usize {
        Self::count_from_axes(axes).saturating_add(Self::count_from_includes(axes, includes))
    }

    fn count_from_axes(axes: &[Axis]) -> usize {
        if axes.is_empty() {
            return 0;
        }
        axes.iter()
            .fold(1usize, |count, axis| count.saturating_mul(axis.values.len()))
    }

    fn count_from_includes(axes: &[Axis], includes: &[IncludeEntry]) -> usize {
        if axes.is_empty() {
            return includes.iter().filter(|e| !e.params.is_empty()).count();
        }

        // An entry opens at most one new branch, on its first undeclared axis value
        includes
            .iter()
            .filter(|entry| {
                entry.params.iter().any(|binding| {
                    axes.iter()
                        .find(|axis| axis.name == binding.name)
                        .is_some_and(|axis| !axis.contains(&binding.value))
                })
            })
            .count()
    }

    /// Admission check against the configured maximum.
    ///
    /// Returns the count when admitted.
    pub fn admit(
        axes: &[Axis],
        includes: &[IncludeEntry],
        config: &FanoutConfig,
    ) -> Result<usize, ValidationError> {
        let count = Self::count(axes, includes);
        if count > config.max_combinations {
            debug!(count, max = config.max_combinations, "matrix rejected");
            return Err(ValidationError::combination_overflow(
                count,
                config.max_combinations,
            ));
        }
        debug!(count, max = config.max_combinations, "matrix admitted");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::validation::ValidationErrorKind;

    fn go_axes() -> Vec<Axis> {
        vec![
            Axis::new("GOARCH", &["linux/amd64", "linux/ppc64le", "linux/s390x"]),
            Axis::new("version", &["go1.17", "go1.18.1"]),
        ]
    }

    #[test]
    fn test_count_empty_matrix() {
        assert_eq!(CombinationCounter::count(&[], &[]), 0);
    }

    #[test]
    fn test_count_axes_product() {
        assert_eq!(CombinationCounter::count(&go_axes(), &[]), 6);
    }

    #[test]
    fn test_count_include_only_skips_label_entries() {
        let includes = vec![
            IncludeEntry::new("build-1", &[]),
            IncludeEntry::new("", &[("IMAGE", "image-1")]),
            IncludeEntry::new("", &[("IMAGE", "image-2")]),
        ];
        assert_eq!(CombinationCounter::count(&[], &includes), 2);
    }

    #[test]
    fn test_count_new_branch_once_per_entry() {
        let includes = vec![IncludeEntry::new(
            "two-unknowns",
            &[("GOARCH", "linux/arm64"), ("version", "go1.20")],
        )];
        assert_eq!(CombinationCounter::count(&go_axes(), &includes), 7);
    }

    #[test]
    fn test_count_ignores_broadcast_and_patch() {
        let includes = vec![
            IncludeEntry::new("common", &[("package", "pkg/")]),
            IncludeEntry::new("patch", &[("GOARCH", "linux/s390x")]),
        ];
        assert_eq!(CombinationCounter::count(&go_axes(), &includes), 6);
    }

    #[test]
    fn test_count_unknown_value_after_known_value() {
        let includes = vec![IncludeEntry::new(
            "known-then-unknown",
            &[("version", "go1.17"), ("GOARCH", "I-do-not-exist")],
        )];
        assert_eq!(CombinationCounter::count(&go_axes(), &includes), 7);
    }

    #[test]
    fn test_admit_within_limit() {
        let config = FanoutConfig { max_combinations: 6 };
        assert_eq!(CombinationCounter::admit(&go_axes(), &[], &config).unwrap(), 6);
    }

    #[test]
    fn test_admit_rejects_overflow() {
        let config = FanoutConfig { max_combinations: 5 };
        let err = CombinationCounter::admit(&go_axes(), &[], &config).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::CombinationOverflow);
        assert_eq!(err.path, "matrix");
        assert!(err.message.contains('6'));
    }

    #[test]
    fn test_count_saturates() {
        let wide: Vec<String> = (0..1024).map(|i| i.to_string()).collect();
        let axes: Vec<Axis> = (0..16)
            .map(|i| Axis {
                name: format!("axis{}", i),
                values: wide.clone(),
            })
            .collect();
        assert_eq!(CombinationCounter::count(&axes, &[]), usize::MAX);
    }
}
