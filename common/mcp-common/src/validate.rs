//! Argument validation against generated JSON schemas
//!
//! Checks the top-level shape of untyped arguments against the schema that
//! schemars derives for an operation's argument type, collecting every
//! violation instead of stopping at the first one. Nested `$ref` shapes are
//! left to serde, whose error is appended as a final violation.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Validate `args` against `schema` and deserialize into `T`
///
/// `null` arguments are treated as an empty object.
pub fn parse_arguments<T: DeserializeOwned>(schema: &Value, args: Value) -> Result<T, Vec<String>> {
    let args = match args {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };

    let mut violations = check_arguments(schema, &args);
    if !violations.is_empty() {
        return Err(violations);
    }

    serde_json::from_value(args).map_err(|e| {
        violations.push(e.to_string());
        violations
    })
}

/// Collect schema violations for an argument object
pub fn check_arguments(schema: &Value, args: &Value) -> Vec<String> {
    let Some(object) = args.as_object() else {
        return vec![format!(
            "arguments must be a JSON object, got {}",
            json_type_name(args)
        )];
    };

    let mut violations = Vec::new();

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            if !object.contains_key(field) {
                violations.push(format!("missing required field `{}`", field));
            }
        }
    }

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return violations;
    };

    for (field, value) in object {
        if let Some(property) = properties.get(field) {
            check_value(field, property, value, &mut violations);
        }
    }

    violations
}

fn check_value(field: &str, property: &Value, value: &Value, violations: &mut Vec<String>) {
    let allowed = allowed_types(property);
    if !allowed.is_empty() && !allowed.iter().any(|t| matches_type(t, value)) {
        violations.push(format!(
            "field `{}`: expected {}, got {}",
            field,
            allowed.join(" or "),
            json_type_name(value)
        ));
        return;
    }

    if let (Some(minimum), Some(number)) = (
        property.get("minimum").and_then(Value::as_f64),
        value.as_f64(),
    ) {
        if number < minimum {
            violations.push(format!("field `{}`: must be >= {}", field, minimum));
        }
    }

    if let (Some(items), Some(elements)) = (property.get("items"), value.as_array()) {
        for (i, element) in elements.iter().enumerate() {
            check_value(&format!("{}[{}]", field, i), items, element, violations);
        }
    }
}

fn allowed_types(property: &Value) -> Vec<&str> {
    match property.get("type") {
        Some(Value::String(t)) => vec![t.as_str()],
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn matches_type(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
