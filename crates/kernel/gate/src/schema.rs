use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use warden_kernel_types::{ParamMap, ParamType, ParamValue};

/// Contract for one tool's parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub required_params: Vec<String>,
    pub optional_params: Vec<String>,
    /// Declared type per parameter name. Parameters without a declared type
    /// accept any value.
    pub param_types: HashMap<String, ParamType>,
    /// Maximum serialized size in bytes of the whole parameter bag.
    pub max_param_size: Option<usize>,
    /// Closed value sets per parameter name.
    pub allowed_values: HashMap<String, Vec<ParamValue>>,
}

impl ToolSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required_params: Vec::new(),
            optional_params: Vec::new(),
            param_types: HashMap::new(),
            max_param_size: None,
            allowed_values: HashMap::new(),
        }
    }

    pub fn required(mut self, name: impl Into<String>, ty: ParamType) -> Self {
        let name = name.into();
        self.param_types.insert(name.clone(), ty);
        self.required_params.push(name);
        self
    }

    pub fn optional(mut self, name: impl Into<String>, ty: ParamType) -> Self {
        let name = name.into();
        self.param_types.insert(name.clone(), ty);
        self.optional_params.push(name);
        self
    }

    pub fn max_size(mut self, bytes: usize) -> Self {
        self.max_param_size = Some(bytes);
        self
    }

    pub fn allow_values(mut self, name: impl Into<String>, values: Vec<ParamValue>) -> Self {
        self.allowed_values.insert(name.into(), values);
        self
    }

    fn is_known(&self, name: &str) -> bool {
        self.required_params.iter().any(|p| p == name)
            || self.optional_params.iter().any(|p| p == name)
    }

    /// Validate a parameter bag against this schema.
    ///
    /// All violations are collected, not just the first; the result is valid
    /// iff the error list is empty.
    pub fn validate(&self, params: &ParamMap) -> SchemaValidation {
        let mut errors = Vec::new();

        for required in &self.required_params {
            if !params.contains_key(required) {
                errors.push(format!("Missing required parameter: {required}"));
            }
        }

        for (name, value) in params {
            if !self.is_known(name) {
                errors.push(format!("Unknown parameter: {name}"));
                continue;
            }
            if let Some(expected) = self.param_types.get(name) {
                match value.param_type() {
                    Some(actual) if actual == *expected => {}
                    _ => errors.push(format!(
                        "Parameter {name}: expected {expected}, got {}",
                        value.type_name()
                    )),
                }
            }
            if let Some(allowed) = self.allowed_values.get(name) {
                if !allowed.contains(value) {
                    errors.push(format!("Parameter {name}: value not in allowed values"));
                }
            }
        }

        if let Some(max) = self.max_param_size {
            let size = ParamValue::Object(params.clone()).serialized_size();
            if size > max {
                errors.push(format!(
                    "Parameters for {} exceed size limit ({size} > {max})",
                    self.name
                ));
            }
        }

        SchemaValidation { errors }
    }
}

/// Outcome of schema validation. Valid iff no errors were collected.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SchemaValidation {
    pub errors: Vec<String>,
}

impl SchemaValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_schema() -> ToolSchema {
        ToolSchema::new("search")
            .required("query", ParamType::String)
            .optional("limit", ParamType::Number)
            .optional("mode", ParamType::String)
            .allow_values("mode", vec!["exact".into(), "fuzzy".into()])
            .max_size(256)
    }

    fn params(pairs: &[(&str, ParamValue)]) -> ParamMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn valid_params_pass() {
        let result = search_schema().validate(&params(&[
            ("query", "foo".into()),
            ("limit", 10.0.into()),
        ]));
        assert!(result.is_valid(), "{:?}", result.errors);
    }

    #[test]
    fn missing_required_param() {
        let result = search_schema().validate(&params(&[("limit", 10.0.into())]));
        assert!(!result.is_valid());
        assert!(result.errors[0].contains("Missing required parameter: query"));
    }

    #[test]
    fn unknown_param_rejected() {
        let result = search_schema()
            .validate(&params(&[("query", "foo".into()), ("extra", 1.0.into())]));
        assert!(result.errors.iter().any(|e| e.contains("Unknown parameter: extra")));
    }

    #[test]
    fn string_field_rejects_array() {
        let result = search_schema().validate(&params(&[(
            "query",
            ParamValue::Array(vec!["foo".into()]),
        )]));
        assert!(result
            .errors
            .iter()
            .any(|e| e.contains("expected string, got array")));
    }

    #[test]
    fn type_mismatch_reported() {
        let result = search_schema()
            .validate(&params(&[("query", "x".into()), ("limit", "ten".into())]));
        assert!(result
            .errors
            .iter()
            .any(|e| e.contains("Parameter limit: expected number, got string")));
    }

    #[test]
    fn allowed_values_enforced() {
        let result = search_schema()
            .validate(&params(&[("query", "x".into()), ("mode", "regex".into())]));
        assert!(result
            .errors
            .iter()
            .any(|e| e.contains("not in allowed values")));

        let ok = search_schema()
            .validate(&params(&[("query", "x".into()), ("mode", "fuzzy".into())]));
        assert!(ok.is_valid());
    }

    #[test]
    fn size_limit_enforced() {
        let big = "x".repeat(300);
        let result = search_schema().validate(&params(&[("query", big.as_str().into())]));
        assert!(result.errors.iter().any(|e| e.contains("exceed size limit")));
    }

    #[test]
    fn all_violations_collected() {
        let result = search_schema().validate(&params(&[
            ("limit", "ten".into()),
            ("bogus", 1.0.into()),
        ]));
        // Missing required + type mismatch + unknown.
        assert_eq!(result.errors.len(), 3);
    }
}
