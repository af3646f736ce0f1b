//! Field type and field record definitions.

use serde::{Deserialize, Serialize};

use crate::record::Value;

/// Declared type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Bool,
    Int,
    Int64,
    Float,
    Float64,
    String,
    /// List of strings.
    ListStr,
    /// List of integers.
    ListInt,
    /// List of numbers.
    ListFloat,
    /// List of anything.
    List,
}

impl FieldType {
    pub const ALL: [FieldType; 10] = [
        Self::Bool,
        Self::Int,
        Self::Int64,
        Self::Float,
        Self::Float64,
        Self::String,
        Self::ListStr,
        Self::ListInt,
        Self::ListFloat,
        Self::List,
    ];

    /// Get the tag used in schema files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Int64 => "int64",
            Self::Float => "float",
            Self::Float64 => "float64",
            Self::String => "string",
            Self::ListStr => "list_str",
            Self::ListInt => "list_int",
            Self::ListFloat => "list_float",
            Self::List => "list",
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::ListStr | Self::ListInt | Self::ListFloat | Self::List)
    }

    /// Integer- or float-tagged, scalar or list.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Int
                | Self::Int64
                | Self::Float
                | Self::Float64
                | Self::ListInt
                | Self::ListFloat
        )
    }

    /// Scalar type of list elements, if this is a typed list.
    pub fn element_type(&self) -> Option<FieldType> {
        match self {
            Self::ListStr => Some(Self::String),
            Self::ListInt => Some(Self::Int64),
            Self::ListFloat => Some(Self::Float64),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| format!("unknown field type: {s}"))
    }
}

/// One declared field of a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaFieldSpec {
    /// Canonical field name.
    pub key: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default)]
    pub optional: bool,

    /// Whether the value may carry several entries.
    #[serde(default)]
    pub multiple: bool,

    /// Presentation grouping.
    #[serde(default)]
    pub section: String,

    /// Default value; for list types, the allowed-value enumeration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,

    #[serde(default)]
    pub placeholder: String,

    #[serde(default)]
    pub description: String,
}

impl SchemaFieldSpec {
    pub fn new(key: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            key: key.into(),
            field_type,
            optional: false,
            multiple: false,
            section: String::new(),
            value: None,
            placeholder: String::new(),
            description: String::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn in_section(mut self, section: impl Into<String>) -> Self {
        self.section = section.into();
        self
    }

    pub fn with_value(mut self, value: serde_json::Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn is_mandatory(&self) -> bool {
        !self.optional
    }

    /// Allowed values for a list-typed field, trimmed.
    ///
    /// Only a list-shaped `value` on a list-typed field acts as an
    /// enumeration; any other default is just a default.
    pub fn enumeration(&self) -> Option<Vec<String>> {
        if !self.field_type.is_list() {
            return None;
        }
        let items = self.value.as_ref()?.as_array()?;
        Some(
            items
                .iter()
                .map(|item| match Value::from_json(item) {
                    Some(v) => v.to_string().trim().to_string(),
                    None => item.to_string(),
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_type_from_str() {
        assert_eq!("bool".parse::<FieldType>().unwrap(), FieldType::Bool);
        assert_eq!("int64".parse::<FieldType>().unwrap(), FieldType::Int64);
        assert_eq!("float".parse::<FieldType>().unwrap(), FieldType::Float);
        assert_eq!("list_str".parse::<FieldType>().unwrap(), FieldType::ListStr);
        assert_eq!("list_float".parse::<FieldType>().unwrap(), FieldType::ListFloat);
        assert_eq!("list".parse::<FieldType>().unwrap(), FieldType::List);
        assert!("uint8".parse::<FieldType>().is_err());
        assert!("String".parse::<FieldType>().is_err());
    }

    #[test]
    fn test_field_type_serde_tags() {
        for t in FieldType::ALL {
            let encoded = serde_json::to_string(&t).unwrap();
            assert_eq!(encoded, format!("\"{}\"", t.as_str()));
        }
    }

    #[test]
    fn test_numeric_tags() {
        assert!(FieldType::Int.is_numeric());
        assert!(FieldType::ListFloat.is_numeric());
        assert!(!FieldType::String.is_numeric());
        assert!(!FieldType::ListStr.is_numeric());
    }

    #[test]
    fn test_enumeration_only_for_list_types() {
        let listed = SchemaFieldSpec::new("Detectors", FieldType::ListStr)
            .with_value(json!([" eiger ", "pilatus", 3.0]));
        assert_eq!(
            listed.enumeration(),
            Some(vec!["eiger".to_string(), "pilatus".to_string(), "3".to_string()])
        );

        let scalar =
            SchemaFieldSpec::new("Cycle", FieldType::String).with_value(json!(["a", "b"]));
        assert_eq!(scalar.enumeration(), None);

        let no_value = SchemaFieldSpec::new("Tags", FieldType::ListStr);
        assert_eq!(no_value.enumeration(), None);
    }

    #[test]
    fn test_json_deserialize_defaults() {
        let spec: SchemaFieldSpec =
            serde_json::from_str(r#"{"key": "Pi", "type": "string"}"#).unwrap();
        assert_eq!(spec.key, "Pi");
        assert!(!spec.optional);
        assert!(spec.is_mandatory());
        assert!(spec.value.is_none());
    }
}
