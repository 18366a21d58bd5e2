//! Input schema model and structural validator for tool arguments.
//!
//! Tool input schemas are declared as typed Rust values rather than raw JSON
//! blobs, so the validator and the `tools/list` rendering can never drift
//! apart. The model covers the subset of JSON Schema the tool catalog
//! actually uses: primitive types, string enums, arrays with a single item
//! schema, and nested objects with required properties.
//!
//! Validation is additive, not exhaustive: arguments carrying fields the
//! schema does not declare pass through untouched. Validation never mutates
//! the argument object.

use indexmap::IndexMap;
use serde_json::{json, Value};
use thiserror::Error;

/// A structural argument validation failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is absent.
    #[error("missing required parameter: {field}")]
    MissingField {
        /// Dotted path of the missing field.
        field: String,
    },

    /// A present field has the wrong runtime type.
    #[error("parameter '{field}' must be of type {expected}, got {found}")]
    TypeMismatch {
        /// Dotted path of the offending field.
        field: String,
        /// The declared type name.
        expected: &'static str,
        /// The runtime type name encountered.
        found: &'static str,
    },

    /// A present string field is not a member of its declared enum.
    #[error("parameter '{field}' must be one of [{allowed}], got '{value}'")]
    InvalidEnumValue {
        /// Dotted path of the offending field.
        field: String,
        /// The rejected value.
        value: String,
        /// Comma-separated list of allowed values.
        allowed: String,
    },
}

/// A property entry in an object schema.
#[derive(Debug, Clone)]
pub struct Property {
    /// The property's value schema.
    pub schema: Schema,
    /// Human-readable description, surfaced in `tools/list`.
    pub description: Option<String>,
}

/// An object schema: ordered declared properties plus the required subset.
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    /// Declared properties in declaration order.
    pub properties: IndexMap<String, Property>,
    /// Names of required properties.
    pub required: Vec<String>,
}

impl ObjectSchema {
    /// Creates an empty object schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a required property.
    #[must_use]
    pub fn required(mut self, name: &str, schema: Schema, description: &str) -> Self {
        self.properties.insert(
            name.to_string(),
            Property {
                schema,
                description: Some(description.to_string()),
            },
        );
        self.required.push(name.to_string());
        self
    }

    /// Declares an optional property.
    #[must_use]
    pub fn optional(mut self, name: &str, schema: Schema, description: &str) -> Self {
        self.properties.insert(
            name.to_string(),
            Property {
                schema,
                description: Some(description.to_string()),
            },
        );
        self
    }
}

/// The structural schema of a value.
#[derive(Debug, Clone)]
pub enum Schema {
    /// A string, optionally constrained to an enum of allowed values.
    String {
        /// Allowed values, if constrained.
        enum_values: Option<Vec<String>>,
    },
    /// Any JSON number.
    Number,
    /// An integral JSON number.
    Integer,
    /// A boolean.
    Boolean,
    /// An array whose elements all match one item schema.
    Array {
        /// Schema every element must satisfy.
        items: Box<Schema>,
    },
    /// A nested object.
    Object(ObjectSchema),
}

impl Schema {
    /// An unconstrained string schema.
    #[must_use]
    pub const fn string() -> Self {
        Self::String { enum_values: None }
    }

    /// A string schema constrained to the given values.
    #[must_use]
    pub fn string_enum<const N: usize>(values: [&str; N]) -> Self {
        Self::String {
            enum_values: Some(values.iter().map(ToString::to_string).collect()),
        }
    }

    /// An array schema with the given item schema.
    #[must_use]
    pub fn array_of(items: Self) -> Self {
        Self::Array {
            items: Box::new(items),
        }
    }

    /// The declared type name, as used in error messages and JSON Schema.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::String { .. } => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array { .. } => "array",
            Self::Object(_) => "object",
        }
    }

    /// Renders this schema as a JSON Schema value for `tools/list`.
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        match self {
            Self::String { enum_values } => {
                let mut obj = json!({ "type": "string" });
                if let Some(values) = enum_values {
                    obj["enum"] = json!(values);
                }
                obj
            }
            Self::Number => json!({ "type": "number" }),
            Self::Integer => json!({ "type": "integer" }),
            Self::Boolean => json!({ "type": "boolean" }),
            Self::Array { items } => json!({
                "type": "array",
                "items": items.to_json_schema(),
            }),
            Self::Object(object) => {
                let mut properties = serde_json::Map::new();
                for (name, property) in &object.properties {
                    let mut rendered = property.schema.to_json_schema();
                    if let Some(ref description) = property.description {
                        rendered["description"] = json!(description);
                    }
                    properties.insert(name.clone(), rendered);
                }

                let mut obj = json!({
                    "type": "object",
                    "properties": properties,
                });
                if !object.required.is_empty() {
                    obj["required"] = json!(object.required);
                }
                obj
            }
        }
    }
}

/// Validates `arguments` against an object `schema`.
///
/// Checks, in order: required fields present, declared primitive types
/// match, enum membership for constrained strings. Arrays validate each
/// element against the item schema; nested objects validate their declared
/// properties recursively. Undeclared fields pass through without
/// validation.
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered.
pub fn validate(schema: &ObjectSchema, arguments: &Value) -> Result<(), ValidationError> {
    validate_object(schema, arguments, "")
}

fn validate_object(
    schema: &ObjectSchema,
    value: &Value,
    path: &str,
) -> Result<(), ValidationError> {
    let Some(map) = value.as_object() else {
        return Err(ValidationError::TypeMismatch {
            field: display_path(path),
            expected: "object",
            found: runtime_type_name(value),
        });
    };

    for name in &schema.required {
        if !map.contains_key(name) {
            return Err(ValidationError::MissingField {
                field: join_path(path, name),
            });
        }
    }

    for (name, property) in &schema.properties {
        if let Some(field_value) = map.get(name) {
            validate_value(&property.schema, field_value, &join_path(path, name))?;
        }
    }

    Ok(())
}

fn validate_value(schema: &Schema, value: &Value, path: &str) -> Result<(), ValidationError> {
    let matches = match schema {
        Schema::String { .. } => value.is_string(),
        Schema::Number => value.is_number(),
        Schema::Integer => value.is_i64() || value.is_u64(),
        Schema::Boolean => value.is_boolean(),
        Schema::Array { .. } => value.is_array(),
        Schema::Object(_) => value.is_object(),
    };

    if !matches {
        return Err(ValidationError::TypeMismatch {
            field: path.to_string(),
            expected: schema.type_name(),
            found: runtime_type_name(value),
        });
    }

    match schema {
        Schema::String {
            enum_values: Some(allowed),
        } => {
            // Type check above guarantees a string here.
            let text = value.as_str().unwrap_or_default();
            if !allowed.iter().any(|candidate| candidate == text) {
                return Err(ValidationError::InvalidEnumValue {
                    field: path.to_string(),
                    value: text.to_string(),
                    allowed: allowed.join(", "),
                });
            }
        }
        Schema::Array { items } => {
            // Type check above guarantees an array here.
            let elements = value.as_array().map_or(&[] as &[Value], Vec::as_slice);
            for (index, element) in elements.iter().enumerate() {
                validate_value(items, element, &format!("{path}[{index}]"))?;
            }
        }
        Schema::Object(object) => {
            validate_object(object, value, path)?;
        }
        _ => {}
    }

    Ok(())
}

const fn runtime_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn join_path(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "arguments".to_string()
    } else {
        path.to_string()
    }
}
