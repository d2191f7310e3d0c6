// Substitution Targets
// Turns resolved results into `target -> value` pairs for the templating engine

use crate::params::ParamValue;
use crate::results::models::{ResolvedResultRef, ResolvedResultRefs, ResultOrigin};

use std::collections::BTreeMap;

impl ResolvedResultRef {
    /// `tasks.<t>.results.<r>` in its dotted, double-quoted and single-quoted forms
    pub fn replace_targets(&self) -> Vec<String> {
        let task = &self.reference.pipeline_task;
        let result = &self.reference.result;
        vec![
            format!("tasks.{}.results.{}", task, result),
            format!("tasks.{}.results[\"{}\"]", task, result),
            format!("tasks.{}.results['{}']", task, result),
        ]
    }

    pub fn replace_targets_for_index(&self, index: usize) -> Vec<String> {
        self.replace_targets()
            .into_iter()
            .map(|target| format!("{}[{}]", target, index))
            .collect()
    }

    pub fn replace_targets_for_key(&self, key: &str) -> Vec<String> {
        let task = &self.reference.pipeline_task;
        let result = &self.reference.result;
        vec![
            format!("tasks.{}.results.{}.{}", task, result, key),
            format!("tasks.{}.results[\"{}\"][{}]", task, result, key),
            format!("tasks.{}.results['{}'][{}]", task, result, key),
        ]
    }
}

impl ResolvedResultRefs {
    /// Every scalar substitution: strings, array elements and object fields
    pub fn string_replacements(&self) -> BTreeMap<String, String> {
        let mut replacements = BTreeMap::new();
        for r in self.iter() {
            match &r.value {
                ParamValue::String(value) => {
                    let targets = match r.reference.index {
                        Some(index) => r.replace_targets_for_index(index),
                        None => r.replace_targets(),
                    };
                    for target in targets {
                        replacements.insert(target, value.clone());
                    }
                }
                ParamValue::Array(values) => {
                    // Aggregated elements are addressed by combination index
                    let indices: Vec<usize> = match &r.origin {
                        ResultOrigin::TaskRuns(children) => {
                            children.iter().map(|c| c.index).collect()
                        }
                        _ => (0..values.len()).collect(),
                    };
                    for (i, value) in indices.into_iter().zip(values) {
                        for target in r.replace_targets_for_index(i) {
                            replacements.insert(target, value.clone());
                        }
                    }
                }
                ParamValue::Object(map) => {
                    for (key, value) in map {
                        for target in r.replace_targets_for_key(key) {
                            replacements.insert(target, value.clone());
                        }
                    }
                }
            }
        }
        replacements
    }

    /// Whole-array substitutions
    pub fn array_replacements(&self) -> BTreeMap<String, Vec<String>> {
        let mut replacements = BTreeMap::new();
        for r in self.iter() {
            if let ParamValue::Array(values) = &r.value {
                for target in r.replace_targets() {
                    replacements.insert(target, values.clone());
                }
            }
        }
        replacements
    }

    /// Whole-object substitutions
    pub fn object_replacements(&self) -> BTreeMap<String, BTreeMap<String, String>> {
        let mut replacements = BTreeMap::new();
        for r in self.iter() {
            if let ParamValue::Object(map) = &r.value {
                for target in r.replace_targets() {
                    replacements.insert(target, map.clone());
                }
            }
        }
        replacements
    }
}
