//! Schema validation helpers.
//!
//! Validates a `serde_json::Value` against a [`Schema`] before the value is
//! expanded into domain types, producing detailed diagnostics with dotted
//! attribute paths.
//!
//! # Example
//!
//! ```
//! use sensu_provider::schema::{Schema, Attribute};
//! use sensu_provider::validation::validate;
//! use serde_json::json;
//!
//! let schema = Schema::v0()
//!     .with_attribute("name", Attribute::required_string())
//!     .with_attribute("filters", Attribute::optional_string_list());
//!
//! let diagnostics = validate(&schema, &json!({"name": "example"}));
//! assert!(diagnostics.is_empty());
//!
//! let diagnostics = validate(&schema, &json!({"name": "example", "filters": "oops"}));
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].attribute, Some("filters".to_string()));
//! ```

use serde_json::Value;

use crate::schema::{Attribute, AttributeType, Diagnostic, DiagnosticSeverity, Schema};

/// Validate a JSON value against a schema.
///
/// Returns a list of diagnostics for any validation errors found; an empty
/// list means the value is valid.
///
/// # Validation Rules
///
/// - Required attributes must be present and non-null
/// - Optional attributes may be absent or null
/// - Computed-only attributes are skipped (the provider sets these)
/// - Attribute types must match the schema
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let obj = match value {
        Value::Object(map) => map,
        Value::Null => return diagnostics,
        _ => {
            diagnostics.push(
                Diagnostic::error("Expected object")
                    .with_detail(format!("Got {}", value_type_name(value))),
            );
            return diagnostics;
        }
    };

    for (name, attr) in &schema.attributes {
        validate_attribute(attr, obj.get(name.as_str()), name, &mut diagnostics);
    }

    diagnostics
}

/// Validate a JSON value against a schema, returning `Err` with the
/// diagnostics when invalid.
pub fn validate_result(schema: &Schema, value: &Value) -> Result<(), Vec<Diagnostic>> {
    let diagnostics = validate(schema, value);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}

/// Check if a JSON value is valid against a schema.
///
/// Use [`validate`] to get detailed error information.
pub fn is_valid(schema: &Schema, value: &Value) -> bool {
    validate(schema, value).is_empty()
}

fn validate_attribute(
    attr: &Attribute,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    // Computed-only attributes are filled in by the provider.
    if attr.flags.computed && !attr.flags.optional && !attr.flags.required {
        return;
    }

    match value {
        None | Some(Value::Null) => {
            if attr.flags.required {
                diagnostics.push(
                    Diagnostic::error(format!("Missing required attribute '{}'", path))
                        .with_detail("This attribute is required and must be provided")
                        .with_attribute(path),
                );
            }
        }
        Some(v) => {
            validate_attribute_type(&attr.attr_type, v, path, diagnostics);
        }
    }
}

fn validate_attribute_type(
    attr_type: &AttributeType,
    value: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match attr_type {
        AttributeType::String => {
            if !value.is_string() {
                diagnostics.push(type_error(path, "string", value));
            }
        }
        AttributeType::Int64 => {
            if !value.is_i64() && !value.is_u64() {
                diagnostics.push(type_error(path, "int64", value));
            }
        }
        AttributeType::List(element_type) => {
            if let Some(arr) = value.as_array() {
                for (i, elem) in arr.iter().enumerate() {
                    let elem_path = format!("{}.{}", path, i);
                    validate_attribute_type(element_type, elem, &elem_path, diagnostics);
                }
            } else {
                diagnostics.push(type_error(path, "list", value));
            }
        }
        AttributeType::Map(value_type) => {
            if let Some(obj) = value.as_object() {
                for (key, val) in obj {
                    let key_path = format!("{}.{}", path, key);
                    validate_attribute_type(value_type, val, &key_path, diagnostics);
                }
            } else {
                diagnostics.push(type_error(path, "map", value));
            }
        }
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn type_error(path: &str, expected: &str, got: &Value) -> Diagnostic {
    Diagnostic {
        severity: DiagnosticSeverity::Error,
        summary: format!("Invalid type for attribute '{}'", path),
        detail: Some(format!(
            "Expected {}, got {}",
            expected,
            value_type_name(got)
        )),
        attribute: Some(path.to_string()),
    }
}
