//! Typed coercions between JSON config/state values and domain types.
//!
//! Each coercion returns an explicit [`ProviderError::Validation`] on a type
//! mismatch instead of silently discarding values that do not fit.

use std::collections::HashMap;

use serde_json::{json, Value};

use crate::asset::{Asset, AssetSpec};
use crate::error::ProviderError;

fn type_mismatch(key: &str, expected: &str, got: &Value) -> ProviderError {
    let got = match got {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    ProviderError::Validation(format!("expected {} for '{}', got {}", expected, key, got))
}

/// Extract a required string field.
pub fn string_field(config: &Value, key: &str) -> Result<String, ProviderError> {
    match config.get(key) {
        None | Some(Value::Null) => Err(ProviderError::Validation(format!(
            "missing required attribute '{}'",
            key
        ))),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(type_mismatch(key, "string", other)),
    }
}

/// Extract an optional string field.
pub fn optional_string_field(config: &Value, key: &str) -> Result<Option<String>, ProviderError> {
    match config.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(type_mismatch(key, "string", other)),
    }
}

/// Extract an optional list of strings. An absent or null field expands to
/// an empty list; a non-string element is a validation error.
pub fn string_list(config: &Value, key: &str) -> Result<Vec<String>, ProviderError> {
    match config.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(type_mismatch(&format!("{}.{}", key, i), "string", other)),
            })
            .collect(),
        Some(other) => Err(type_mismatch(key, "list", other)),
    }
}

/// Extract an optional string-to-string mapping. An absent or null field
/// expands to an empty map; a non-string value is a validation error.
pub fn string_map(config: &Value, key: &str) -> Result<HashMap<String, String>, ProviderError> {
    match config.get(key) {
        None | Some(Value::Null) => Ok(HashMap::new()),
        Some(Value::Object(entries)) => entries
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => Ok((k.clone(), s.clone())),
                other => Err(type_mismatch(&format!("{}.{}", key, k), "string", other)),
            })
            .collect(),
        Some(other) => Err(type_mismatch(key, "map", other)),
    }
}

/// Expand a declarative asset config into an [`AssetSpec`].
pub fn asset_spec_from_config(config: &Value) -> Result<AssetSpec, ProviderError> {
    Ok(AssetSpec {
        name: string_field(config, "name")?,
        sha512: string_field(config, "sha512")?,
        url: string_field(config, "url")?,
        filters: string_list(config, "filters")?,
        metadata: string_map(config, "metadata")?,
    })
}

/// Flatten an [`Asset`] into the state representation.
///
/// The asset name doubles as the resource id. Filters and metadata are
/// always present so the state shape is stable across reads. The
/// organization is provider-level and deliberately not part of the state.
pub fn asset_to_state(asset: &Asset) -> Value {
    json!({
        "id": asset.name,
        "name": asset.name,
        "sha512": asset.sha512,
        "url": asset.url,
        "filters": asset.filters,
        "metadata": asset.metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_field() {
        let config = json!({"name": "example", "count": 3});
        assert_eq!(string_field(&config, "name").unwrap(), "example");

        let err = string_field(&config, "missing").unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));

        let err = string_field(&config, "count").unwrap_err();
        assert!(format!("{}", err).contains("expected string for 'count', got number"));
    }

    #[test]
    fn test_optional_string_field() {
        let config = json!({"api_key": "secret", "bad": 1, "null_key": null});
        assert_eq!(
            optional_string_field(&config, "api_key").unwrap(),
            Some("secret".to_string())
        );
        assert_eq!(optional_string_field(&config, "absent").unwrap(), None);
        assert_eq!(optional_string_field(&config, "null_key").unwrap(), None);
        assert!(optional_string_field(&config, "bad").is_err());
    }

    #[test]
    fn test_string_list() {
        let config = json!({"filters": ["a", "b"]});
        assert_eq!(
            string_list(&config, "filters").unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );

        assert!(string_list(&json!({}), "filters").unwrap().is_empty());
        assert!(string_list(&json!({"filters": null}), "filters")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_string_list_rejects_non_string_elements() {
        let err = string_list(&json!({"filters": ["ok", 42]}), "filters").unwrap_err();
        assert!(format!("{}", err).contains("filters.1"));

        let err = string_list(&json!({"filters": "oops"}), "filters").unwrap_err();
        assert!(format!("{}", err).contains("expected list"));
    }

    #[test]
    fn test_string_map() {
        let config = json!({"metadata": {"header1": "test1", "header2": "test2"}});
        let map = string_map(&config, "metadata").unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["header1"], "test1");

        assert!(string_map(&json!({}), "metadata").unwrap().is_empty());
    }

    #[test]
    fn test_string_map_rejects_non_string_values() {
        let err = string_map(&json!({"metadata": {"count": 42}}), "metadata").unwrap_err();
        assert!(format!("{}", err).contains("metadata.count"));

        let err = string_map(&json!({"metadata": [1, 2]}), "metadata").unwrap_err();
        assert!(format!("{}", err).contains("expected map"));
    }

    #[test]
    fn test_asset_spec_from_config() {
        let spec = asset_spec_from_config(&json!({
            "name": "example",
            "sha512": "abc123",
            "url": "http://example.com/asset/example.tar.gz",
            "filters": ["system.os == 'linux'"],
            "metadata": {"header1": "test1"}
        }))
        .unwrap();

        assert_eq!(spec.name, "example");
        assert_eq!(spec.sha512, "abc123");
        assert_eq!(spec.filters.len(), 1);
        assert_eq!(spec.metadata["header1"], "test1");
    }

    #[test]
    fn test_asset_spec_from_config_missing_required() {
        let err = asset_spec_from_config(&json!({"name": "example"})).unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
    }

    #[test]
    fn test_asset_to_state_uses_name_as_id() {
        let asset = AssetSpec::new("example", "abc123", "http://example.com/a.tar.gz")
            .into_asset("default");
        let state = asset_to_state(&asset);

        assert_eq!(state["id"], "example");
        assert_eq!(state["name"], "example");
        assert_eq!(state["sha512"], "abc123");
        assert_eq!(state["filters"], json!([]));
        assert_eq!(state["metadata"], json!({}));
        assert!(state.get("organization").is_none());
    }
}
