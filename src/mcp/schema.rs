//! Declarative parameter schemas for tools and the validator that checks
//! untrusted `arguments` against them.
//!
//! Validation is total: any JSON value yields either [`ValidatedArgs`] or a
//! [`ValidationError`] naming the offending field.

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::fmt;
use thiserror::Error;

/// The closed set of kinds a parameter can declare.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    String,
    Number,
    Integer,
    Boolean,
    Array(Box<ParamKind>),
}

impl ParamKind {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ParamKind::String => value.is_string(),
            ParamKind::Number => value.is_number(),
            ParamKind::Integer => match value {
                Value::Number(n) => {
                    n.is_i64()
                        || n.is_u64()
                        || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
                }
                _ => false,
            },
            ParamKind::Boolean => value.is_boolean(),
            ParamKind::Array(inner) => value
                .as_array()
                .is_some_and(|items| items.iter().all(|item| inner.matches(item))),
        }
    }

    fn json_schema(&self) -> Value {
        match self {
            ParamKind::String => json!({ "type": "string" }),
            ParamKind::Number => json!({ "type": "number" }),
            ParamKind::Integer => json!({ "type": "integer" }),
            ParamKind::Boolean => json!({ "type": "boolean" }),
            ParamKind::Array(inner) => json!({ "type": "array", "items": inner.json_schema() }),
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::String => f.write_str("string"),
            ParamKind::Number => f.write_str("number"),
            ParamKind::Integer => f.write_str("integer"),
            ParamKind::Boolean => f.write_str("boolean"),
            ParamKind::Array(inner) => write!(f, "array of {}", inner),
        }
    }
}

/// Extra checks applied after the kind matches.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Minimum character count for strings, element count for arrays.
    MinLength(usize),
    Prefix(&'static str),
    Minimum(f64),
    Maximum(f64),
}

impl Constraint {
    fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            Constraint::MinLength(min) => {
                let len = match value {
                    Value::String(s) => s.chars().count(),
                    Value::Array(items) => items.len(),
                    _ => return Ok(()),
                };
                if len < *min {
                    return Err(format!("length must be at least {}, got {}", min, len));
                }
            }
            Constraint::Prefix(prefix) => {
                if let Some(s) = value.as_str() {
                    if !s.starts_with(prefix) {
                        return Err(format!("must start with '{}'", prefix));
                    }
                }
            }
            Constraint::Minimum(min) => {
                if let Some(n) = value.as_f64() {
                    if n < *min {
                        return Err(format!("must be >= {}, got {}", min, n));
                    }
                }
            }
            Constraint::Maximum(max) => {
                if let Some(n) = value.as_f64() {
                    if n > *max {
                        return Err(format!("must be <= {}, got {}", max, n));
                    }
                }
            }
        }
        Ok(())
    }

    fn annotate(&self, property: &mut Map<String, Value>) {
        match self {
            Constraint::MinLength(min) => {
                let key = if property.get("type") == Some(&json!("array")) {
                    "minItems"
                } else {
                    "minLength"
                };
                property.insert(key.into(), json!(min));
            }
            Constraint::Prefix(prefix) => {
                property.insert("pattern".into(), json!(format!("^{}", prefix)));
            }
            Constraint::Minimum(min) => {
                property.insert("minimum".into(), json!(min));
            }
            Constraint::Maximum(max) => {
                property.insert("maximum".into(), json!(max));
            }
        }
    }
}

/// Declaration of a single named parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub kind: ParamKind,
    pub required: bool,
    pub description: Option<String>,
    pub default: Option<Value>,
    pub constraints: Vec<Constraint>,
}

impl ParamSpec {
    pub fn required(kind: ParamKind) -> Self {
        Self {
            kind,
            required: true,
            description: None,
            default: None,
            constraints: Vec::new(),
        }
    }

    pub fn optional(kind: ParamKind) -> Self {
        Self {
            required: false,
            ..Self::required(kind)
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn constrain(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }
}

/// Ordered mapping from field name to [`ParamSpec`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSchema {
    fields: Vec<(String, ParamSpec)>,
}

impl ParameterSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, replacing any earlier declaration with the same name.
    pub fn field(mut self, name: impl Into<String>, spec: ParamSpec) -> Self {
        let name = name.into();
        self.fields.retain(|(existing, _)| *existing != name);
        self.fields.push((name, spec));
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &ParamSpec)> {
        self.fields.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, spec)| spec)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// JSON Schema object advertised as a tool's `inputSchema`.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for (name, spec) in self.fields() {
            let mut property = match spec.kind.json_schema() {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            if let Some(description) = &spec.description {
                property.insert("description".into(), json!(description));
            }
            if let Some(default) = &spec.default {
                property.insert("default".into(), default.clone());
            }
            for constraint in &spec.constraints {
                constraint.annotate(&mut property);
            }
            if spec.required {
                required.push(json!(name));
            }
            properties.insert(name.to_string(), Value::Object(property));
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("arguments must be an object, got {found}")]
    NotAnObject { found: &'static str },
    #[error("missing required field '{field}' (expected {expected})")]
    MissingField { field: String, expected: String },
    #[error("field '{field}' must be {expected}, got {found}")]
    WrongKind {
        field: String,
        expected: String,
        found: &'static str,
    },
    #[error("field '{field}' is invalid: {reason}")]
    ConstraintViolated { field: String, reason: String },
}

impl ValidationError {
    /// The field that failed, if the failure is tied to one.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::NotAnObject { .. } => None,
            ValidationError::MissingField { field, .. }
            | ValidationError::WrongKind { field, .. }
            | ValidationError::ConstraintViolated { field, .. } => Some(field),
        }
    }
}

/// Arguments that passed validation: only the fields the schema declares.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedArgs {
    values: Map<String, Value>,
}

impl ValidatedArgs {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn i64(&self, name: &str) -> Option<i64> {
        let value = self.get(name)?;
        value
            .as_i64()
            .or_else(|| {
                value
                    .as_f64()
                    .filter(|f| {
                        f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64
                    })
                    .map(|f| f as i64)
            })
    }

    pub fn f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn into_typed<T: DeserializeOwned>(self) -> serde_json::Result<T> {
        serde_json::from_value(Value::Object(self.values))
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Checks `raw` against `schema`.
///
/// `null` is read as an empty argument object. Fields the schema does not
/// declare are dropped. A `null` field counts as absent.
pub fn validate(schema: &ParameterSchema, raw: &Value) -> Result<ValidatedArgs, ValidationError> {
    let empty = Map::new();
    let object = match raw {
        Value::Null => &empty,
        Value::Object(map) => map,
        other => {
            return Err(ValidationError::NotAnObject {
                found: describe(other),
            })
        }
    };

    let mut values = Map::new();
    for (name, spec) in schema.fields() {
        match object.get(name).filter(|v| !v.is_null()) {
            Some(value) => {
                if !spec.kind.matches(value) {
                    return Err(ValidationError::WrongKind {
                        field: name.to_string(),
                        expected: spec.kind.to_string(),
                        found: describe(value),
                    });
                }
                for constraint in &spec.constraints {
                    constraint
                        .check(value)
                        .map_err(|reason| ValidationError::ConstraintViolated {
                            field: name.to_string(),
                            reason,
                        })?;
                }
                values.insert(name.to_string(), value.clone());
            }
            None => {
                if let Some(default) = &spec.default {
                    values.insert(name.to_string(), default.clone());
                } else if spec.required {
                    return Err(ValidationError::MissingField {
                        field: name.to_string(),
                        expected: spec.kind.to_string(),
                    });
                }
            }
        }
    }

    Ok(ValidatedArgs { values })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address_schema() -> ParameterSchema {
        ParameterSchema::new()
            .field(
                "address",
                ParamSpec::required(ParamKind::String).constrain(Constraint::Prefix("0x")),
            )
            .field("limit", ParamSpec::optional(ParamKind::Integer))
    }

    #[test]
    fn test_valid_input_keeps_recognized_fields_only() {
        let args = validate(
            &address_schema(),
            &json!({ "address": "0xABC", "limit": 5, "extra": true }),
        )
        .unwrap();

        assert_eq!(args.str("address"), Some("0xABC"));
        assert_eq!(args.i64("limit"), Some(5));
        assert!(!args.contains("extra"));
        assert_eq!(args.as_map().len(), 2);
    }

    #[test]
    fn test_integer_accessor_rejects_out_of_range_floats() {
        let args = validate(&address_schema(), &json!({ "address": "0x1", "limit": 3.0 })).unwrap();
        assert_eq!(args.i64("limit"), Some(3));

        let args = validate(&address_schema(), &json!({ "address": "0x1", "limit": 1e19 })).unwrap();
        assert_eq!(args.i64("limit"), None);
        let args = validate(&address_schema(), &json!({ "address": "0x1", "limit": -1e19 })).unwrap();
        assert_eq!(args.i64("limit"), None);
    }

    #[test]
    fn test_missing_required_field_is_named() {
        let err = validate(&address_schema(), &json!({})).unwrap_err();
        assert_eq!(err.field(), Some("address"));
        let message = err.to_string();
        assert!(message.contains("address"));
        assert!(message.contains("string"));
    }

    #[test]
    fn test_optional_field_stays_absent_without_default() {
        let args = validate(&address_schema(), &json!({ "address": "0x1" })).unwrap();
        assert!(!args.contains("limit"));
    }

    #[test]
    fn test_default_fills_absent_field() {
        let schema = ParameterSchema::new().field(
            "verbose",
            ParamSpec::optional(ParamKind::Boolean).with_default(json!(false)),
        );
        let args = validate(&schema, &Value::Null).unwrap();
        assert_eq!(args.bool("verbose"), Some(false));
    }

    #[test]
    fn test_wrong_kind_reports_expected_and_found() {
        let err = validate(&address_schema(), &json!({ "address": 42 })).unwrap_err();
        assert_eq!(
            err,
            ValidationError::WrongKind {
                field: "address".into(),
                expected: "string".into(),
                found: "number",
            }
        );
    }

    #[test]
    fn test_integer_rejects_fractions() {
        let err = validate(&address_schema(), &json!({ "address": "0x1", "limit": 1.5 }))
            .unwrap_err();
        assert_eq!(err.field(), Some("limit"));
    }

    #[test]
    fn test_constraint_violation() {
        let err = validate(&address_schema(), &json!({ "address": "abc" })).unwrap_err();
        assert!(matches!(err, ValidationError::ConstraintViolated { .. }));
        assert!(err.to_string().contains("0x"));
    }

    #[test]
    fn test_non_object_arguments_fail() {
        for raw in [json!("0xABC"), json!([1, 2]), json!(3), json!(true)] {
            let err = validate(&address_schema(), &raw).unwrap_err();
            assert!(matches!(err, ValidationError::NotAnObject { .. }));
        }
    }

    #[test]
    fn test_array_kind_checks_elements() {
        let schema = ParameterSchema::new().field(
            "tags",
            ParamSpec::required(ParamKind::Array(Box::new(ParamKind::String))),
        );
        assert!(validate(&schema, &json!({ "tags": ["a", "b"] })).is_ok());
        let err = validate(&schema, &json!({ "tags": ["a", 1] })).unwrap_err();
        assert!(err.to_string().contains("array of string"));
    }

    #[test]
    fn test_json_schema_advertisement() {
        let schema = address_schema().to_json_schema();
        assert_eq!(schema["type"], json!("object"));
        assert_eq!(schema["required"], json!(["address"]));
        assert_eq!(schema["properties"]["address"]["type"], json!("string"));
        assert_eq!(schema["properties"]["address"]["pattern"], json!("^0x"));
        assert_eq!(schema["properties"]["limit"]["type"], json!("integer"));
    }

    #[test]
    fn test_typed_extraction() {
        #[derive(serde::Deserialize)]
        struct Args {
            address: String,
            limit: Option<u32>,
        }
        let args = validate(&address_schema(), &json!({ "address": "0xdead" }))
            .unwrap()
            .into_typed::<Args>()
            .unwrap();
        assert_eq!(args.address, "0xdead");
        assert!(args.limit.is_none());
    }
}
