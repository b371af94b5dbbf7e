//! Tool Input Schemas
//!
//! Derives the JSON Schema advertised in `tools/list` from a parameter type.

use std::sync::Arc;

use rmcp::model::JsonObject;
use schemars::JsonSchema;
use serde_json::{json, Value};

/// Build the input schema for a tool whose arguments deserialize into `P`
pub fn input_schema<P: JsonSchema>() -> Arc<JsonObject> {
    let schema = schemars::schema_for!(P);
    let value = serde_json::to_value(&schema).unwrap_or_else(|_| empty_object_schema());
    Arc::new(into_object(value))
}

/// Keep only what a tool schema needs; an unusable schema becomes an empty object
fn into_object(value: Value) -> JsonObject {
    match value {
        Value::Object(mut object) if object.get("type") == Some(&json!("object")) => {
            object.remove("$schema");
            object
                .entry("properties")
                .or_insert_with(|| json!({}));
            object
        }
        _ => match empty_object_schema() {
            Value::Object(object) => object,
            _ => JsonObject::new(),
        },
    }
}

/// Returns an empty object JSON Schema
fn empty_object_schema() -> Value {
    json!({
        "type": "object",
        "properties": {},
        "required": []
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    /// Arguments for a test tool
    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct Sample {
        /// Required name
        name: String,
        /// Optional count
        count: Option<u32>,
    }

    #[derive(Deserialize, JsonSchema)]
    struct NoArgs {}

    #[test]
    fn test_schema_lists_properties() {
        let schema = input_schema::<Sample>();

        assert_eq!(schema["type"], "object");
        assert!(schema["properties"].get("name").is_some());
        assert!(schema["properties"].get("count").is_some());
        assert!(schema.get("$schema").is_none());

        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("name")));
        assert!(!required.contains(&json!("count")));
    }

    #[test]
    fn test_schema_for_empty_params() {
        let schema = input_schema::<NoArgs>();
        assert_eq!(schema["type"], "object");
        assert!(schema["properties"].is_object());
    }

    #[test]
    fn test_non_object_schema_falls_back() {
        let object = into_object(json!({ "type": "string" }));
        assert_eq!(object["type"], "object");
        assert_eq!(object["properties"], json!({}));
    }
}
