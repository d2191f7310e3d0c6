// Parameter Model
// Typed parameter values shared by matrices, pipeline tasks and task results

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Discriminated type tag of a parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Array,
    Object,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamType::String => "string",
            ParamType::Array => "array",
            ParamType::Object => "object",
        };
        f.write_str(name)
    }
}

/// A parameter or result value.
///
/// Deserialization is untagged: a scalar becomes `String`, a sequence becomes
/// `Array` and a mapping becomes `Object`. Object keys are kept in a sorted map
/// so nothing downstream depends on hash iteration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    String(String),
    Array(Vec<String>),
    Object(BTreeMap<String, String>),
}

impl Default for ParamValue {
    fn default() -> Self {
        ParamValue::String(String::new())
    }
}

impl ParamValue {
    pub fn param_type(&self) -> ParamType {
        match self {
            ParamValue::String(_) => ParamType::String,
            ParamValue::Array(_) => ParamType::Array,
            ParamValue::Object(_) => ParamType::Object,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, ParamValue::String(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, ParamValue::Array(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, ParamValue::Object(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[String]> {
        match self {
            ParamValue::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            ParamValue::Object(map) => Some(map),
            _ => None,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::String(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::String(s)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        ParamValue::Array(values)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(values: Vec<&str>) -> Self {
        ParamValue::Array(values.into_iter().map(str::to_string).collect())
    }
}

impl From<BTreeMap<String, String>> for ParamValue {
    fn from(map: BTreeMap<String, String>) -> Self {
        ParamValue::Object(map)
    }
}

/// A named parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub value: ParamValue,
}

impl Param {
    pub fn new(name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Shorthand for a string-typed parameter
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, ParamValue::String(value.into()))
    }
}

/// Ordered list of parameters. Declaration order is preserved everywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(pub Vec<Param>);

impl Params {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.iter().find(|p| p.name == name).map(|p| &p.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|p| p.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|p| p.name.as_str())
    }

    pub fn push(&mut self, param: Param) {
        self.0.push(param);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Param> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Param>> for Params {
    fn from(params: Vec<Param>) -> Self {
        Params(params)
    }
}

impl FromIterator<Param> for Params {
    fn from_iter<I: IntoIterator<Item = Param>>(iter: I) -> Self {
        Params(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_type_predicates() {
        let s = ParamValue::from("linux");
        let a = ParamValue::from(vec!["linux", "mac"]);
        let o = ParamValue::Object(BTreeMap::from([("k".to_string(), "v".to_string())]));

        assert!(s.is_string() && !s.is_array() && !s.is_object());
        assert!(a.is_array() && !a.is_string());
        assert!(o.is_object());
        assert_eq!(s.param_type(), ParamType::String);
        assert_eq!(a.param_type(), ParamType::Array);
        assert_eq!(o.param_type(), ParamType::Object);
        assert_eq!(s.as_str(), Some("linux"));
        assert_eq!(a.as_array().map(|v| v.len()), Some(2));
        assert!(s.as_array().is_none());
    }

    #[test]
    fn test_param_type_display() {
        assert_eq!(ParamType::String.to_string(), "string");
        assert_eq!(ParamType::Array.to_string(), "array");
        assert_eq!(ParamType::Object.to_string(), "object");
    }

    #[test]
    fn test_untagged_yaml_deserialization() {
        let yaml = r#"
- name: platform
  value: [linux, mac]
- name: package
  value: path/to/package
- name: labels
  value:
    team: infra
"#;
        let params: Params = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(params.len(), 3);
        assert!(params.get("platform").unwrap().is_array());
        assert!(params.get("package").unwrap().is_string());
        assert!(params.get("labels").unwrap().is_object());
        assert!(params.get("missing").is_none());
    }

    #[test]
    fn test_params_preserve_declaration_order() {
        let params: Params = vec![
            Param::string("zeta", "1"),
            Param::string("alpha", "2"),
            Param::string("mid", "3"),
        ]
        .into();
        let names: Vec<_> = params.names().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert!(params.contains("alpha"));
    }
}
