//! Field types and per-document values

use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage type of a primitive field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Long,
    Double,
    Keyword,
    Boolean,
}

impl FieldType {
    /// Mapping type name, as written in a mapping definition.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Long => "long",
            Self::Double => "double",
            Self::Keyword => "keyword",
            Self::Boolean => "boolean",
        }
    }

    /// Parse a mapping type name. Returns `None` for non-primitive types.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "long" => Some(Self::Long),
            "double" => Some(Self::Double),
            "keyword" => Some(Self::Keyword),
            "boolean" => Some(Self::Boolean),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single value of a field within one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Long(i64),
    Double(f64),
    Boolean(bool),
    Keyword(String),
}

impl FieldValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::Long(_) => FieldType::Long,
            Self::Double(_) => FieldType::Double,
            Self::Boolean(_) => FieldType::Boolean,
            Self::Keyword(_) => FieldType::Keyword,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view of the value; longs widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            Self::Long(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Keyword(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::Boolean(v) => write!(f, "{}", v),
            Self::Keyword(v) => f.write_str(v),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Keyword(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Keyword(v)
    }
}

impl From<FieldValue> for serde_json::Value {
    fn from(v: FieldValue) -> Self {
        match v {
            FieldValue::Long(n) => serde_json::Value::from(n),
            FieldValue::Double(n) => serde_json::Value::from(n),
            FieldValue::Boolean(b) => serde_json::Value::Bool(b),
            FieldValue::Keyword(s) => serde_json::Value::String(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_parse_roundtrip() {
        for t in [
            FieldType::Long,
            FieldType::Double,
            FieldType::Keyword,
            FieldType::Boolean,
        ] {
            assert_eq!(FieldType::parse(t.as_str()), Some(t));
        }
        assert_eq!(FieldType::parse("flattened"), None);
        assert_eq!(FieldType::parse("alias"), None);
    }

    #[test]
    fn test_field_value_accessors() {
        assert_eq!(FieldValue::Long(7).as_i64(), Some(7));
        assert_eq!(FieldValue::Long(7).as_f64(), Some(7.0));
        assert_eq!(FieldValue::Double(1.5).as_i64(), None);
        assert_eq!(FieldValue::from("abc").as_str(), Some("abc"));
        assert_eq!(FieldValue::from(true).as_bool(), Some(true));
        assert_eq!(FieldValue::from("abc").as_bool(), None);
    }

    #[test]
    fn test_field_value_type() {
        assert_eq!(FieldValue::from(1i64).field_type(), FieldType::Long);
        assert_eq!(FieldValue::from(1.0).field_type(), FieldType::Double);
        assert_eq!(FieldValue::from("x").field_type(), FieldType::Keyword);
        assert_eq!(FieldValue::from(false).field_type(), FieldType::Boolean);
    }

    #[test]
    fn test_field_value_to_json() {
        let json: serde_json::Value = FieldValue::from("v").into();
        assert_eq!(json, serde_json::json!("v"));
        let json: serde_json::Value = FieldValue::Long(3).into();
        assert_eq!(json, serde_json::json!(3));
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::Long(-4).to_string(), "-4");
        assert_eq!(FieldValue::from("key").to_string(), "key");
    }
}
