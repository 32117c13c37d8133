//! Validation of chart documents against the embedded JSON Schema.
//!
//! Validation never mutates the document. Defaults declared in the schema are
//! applied afterwards, by serde, when the document is deserialized into
//! [`crate::models::ChartSpec`]; [`declared_default`] exposes the schema side
//! so the two can be kept in agreement.

use jsonschema::Draft;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// The chart schema (JSON Schema draft 2020-12).
pub const SCHEMA_JSON: &str = include_str!("data.schema.json");

/// One failed constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON pointer into the instance, e.g. `/bars/Total/values/1`.
    pub instance_path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.instance_path.is_empty() {
            "/"
        } else {
            self.instance_path.as_str()
        };
        write!(f, "{}: {}", path, self.message)
    }
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("embedded schema is unusable: {0}")]
    Schema(String),
    #[error("chart does not match the schema:\n{}", list(.0))]
    Invalid(Vec<Violation>),
}

fn list(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("  - {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parsed schema document.
pub fn schema() -> Result<Value, SchemaError> {
    serde_json::from_str(SCHEMA_JSON).map_err(|e| SchemaError::Schema(e.to_string()))
}

/// Check `instance` against the schema, collecting every violation.
pub fn validate(instance: &Value) -> Result<(), SchemaError> {
    let schema = schema()?;
    let validator = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&schema)
        .map_err(|e| SchemaError::Schema(e.to_string()))?;

    let violations: Vec<Violation> = validator
        .iter_errors(instance)
        .map(|err| Violation {
            instance_path: err.instance_path.to_string(),
            message: err.to_string(),
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        log::debug!("{} schema violation(s)", violations.len());
        Err(SchemaError::Invalid(violations))
    }
}

/// The `default` declared for a property, following nested `properties`.
/// A `$ref` to a local `$defs` entry is followed once per step.
///
/// `declared_default(&["fig", "fontfamily"])` -> `Some("sans-serif")`.
pub fn declared_default(path: &[&str]) -> Option<Value> {
    let root = schema().ok()?;
    let mut node = &root;
    for name in path {
        node = deref(&root, node);
        node = node
            .get("properties")
            .and_then(|p| p.get(*name))
            .or_else(|| {
                node.get("additionalProperties")
                    .filter(|_| *name == "*")
            })?;
    }
    node.get("default")
        .or_else(|| deref(&root, node).get("default"))
        .cloned()
}

fn deref<'a>(root: &'a Value, node: &'a Value) -> &'a Value {
    node.get("$ref")
        .and_then(Value::as_str)
        .and_then(|r| r.strip_prefix('#'))
        .and_then(|ptr| root.pointer(ptr))
        .unwrap_or(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "bars": {
                "Total": {"labels": ["A", "B"], "values": [3, 7], "colors": ["#000", "#fff"]}
            }
        })
    }

    #[test]
    fn embedded_schema_parses() {
        let s = schema().unwrap();
        assert_eq!(s["type"], "object");
    }

    #[test]
    fn minimal_chart_is_valid() {
        validate(&minimal()).unwrap();
    }

    #[test]
    fn missing_bars_is_reported() {
        let err = validate(&json!({"si_unit": "mm"})).unwrap_err();
        let SchemaError::Invalid(v) = err else {
            panic!("expected violations");
        };
        assert!(v.iter().any(|v| v.message.contains("bars")), "{v:?}");
    }

    #[test]
    fn violations_carry_instance_paths() {
        let mut doc = minimal();
        doc["bars"]["Total"]["values"] = json!([3, "seven"]);
        doc["fig"] = json!({"fontsize": -1});
        let SchemaError::Invalid(v) = validate(&doc).unwrap_err() else {
            panic!("expected violations");
        };
        let paths: Vec<&str> = v.iter().map(|v| v.instance_path.as_str()).collect();
        assert!(paths.contains(&"/bars/Total/values/1"), "{paths:?}");
        assert!(paths.contains(&"/fig/fontsize"), "{paths:?}");
    }

    #[test]
    fn malformed_parent_is_rejected() {
        let mut doc = minimal();
        doc["bars"]["Total"]["parent"] = json!("no-colon");
        assert!(validate(&doc).is_err());
    }

    #[test]
    fn unknown_bar_field_is_rejected() {
        let mut doc = minimal();
        doc["bars"]["Total"]["colour"] = json!(["#000"]);
        assert!(validate(&doc).is_err());
    }

    #[test]
    fn declared_defaults_are_reachable() {
        assert_eq!(
            declared_default(&["fig", "fontfamily"]),
            Some(json!("sans-serif"))
        );
        assert_eq!(declared_default(&["fmt"]), Some(json!("%.2f")));
        assert_eq!(
            declared_default(&["bars", "*", "label_offset"]),
            Some(json!([]))
        );
        assert_eq!(declared_default(&["bars", "*", "labels"]), None);
    }
}
