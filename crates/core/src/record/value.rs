//! Closed value type carried by metadata records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single record value.
///
/// Records arrive as JSON objects or form posts; every value they can carry
/// maps onto one of these variants. `null` and nested objects are not
/// representable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
}

impl Value {
    /// Name of the runtime type, using the same vocabulary as schema type tags.
    ///
    /// Lists report the narrowest tag that describes all their elements;
    /// an empty list reports plain `list`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int64",
            Self::Float(_) => "float64",
            Self::String(_) => "string",
            Self::List(items) => {
                if items.is_empty() {
                    "list"
                } else if items.iter().all(|v| matches!(v, Self::String(_))) {
                    "list_str"
                } else if items.iter().all(|v| matches!(v, Self::Int(_))) {
                    "list_int"
                } else if items.iter().all(Self::is_number) {
                    "list_float"
                } else {
                    "list"
                }
            }
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// True for `0` and `0.0`; form and JSON decoding collapse all zero numerics.
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Int(i) => *i == 0,
            Self::Float(f) => *f == 0.0,
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Convert a decoded JSON value. Returns `None` for `null` and objects,
    /// at any depth.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null | serde_json::Value::Object(_) => None,
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float)),
            serde_json::Value::String(s) => Some(Self::String(s.clone())),
            serde_json::Value::Array(items) => items
                .iter()
                .map(Self::from_json)
                .collect::<Option<Vec<_>>>()
                .map(Self::List),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::List(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_json).collect())
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_names() {
        assert_eq!(Value::from(true).type_name(), "bool");
        assert_eq!(Value::from(3).type_name(), "int64");
        assert_eq!(Value::from(3.5).type_name(), "float64");
        assert_eq!(Value::from("x").type_name(), "string");
        assert_eq!(Value::from(vec!["a", "b"]).type_name(), "list_str");
        assert_eq!(Value::from(vec![1_i64, 2]).type_name(), "list_int");
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::Float(2.5)]).type_name(),
            "list_float"
        );
        assert_eq!(Value::List(vec![]).type_name(), "list");
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::from("a")]).type_name(),
            "list"
        );
    }

    #[test]
    fn test_from_json_numbers() {
        assert_eq!(Value::from_json(&json!(3)), Some(Value::Int(3)));
        assert_eq!(Value::from_json(&json!(3.0)), Some(Value::Float(3.0)));
        assert_eq!(Value::from_json(&json!(-7)), Some(Value::Int(-7)));
    }

    #[test]
    fn test_from_json_rejects_null_and_objects() {
        assert_eq!(Value::from_json(&json!(null)), None);
        assert_eq!(Value::from_json(&json!({"a": 1})), None);
        assert_eq!(Value::from_json(&json!([1, null])), None);
    }

    #[test]
    fn test_display_matches_membership_form() {
        assert_eq!(Value::Float(3.0).to_string(), "3");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::from(vec!["a", "b"]).to_string(), "[a b]");
    }

    #[test]
    fn test_zero_detection() {
        assert!(Value::Int(0).is_zero());
        assert!(Value::Float(0.0).is_zero());
        assert!(!Value::from("0").is_zero());
        assert!(!Value::Int(1).is_zero());
    }

    #[test]
    fn test_untagged_deserialize() {
        let v: Value = serde_json::from_str("[1, 2.5, \"x\", true]").unwrap();
        assert_eq!(
            v,
            Value::List(vec![
                Value::Int(1),
                Value::Float(2.5),
                Value::from("x"),
                Value::Bool(true)
            ])
        );
    }
}
