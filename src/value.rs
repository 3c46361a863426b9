use std::{collections::BTreeMap, fmt};

use crate::record::RecordId;

/// A single field value of a catalog record.
///
/// Records are loosely typed: the same logical field may hold a string in
/// one entry and a list in another. Matching walks this union recursively.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

/// The implicit type of a storage key, used to pick its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Number,
    Bool,
    List,
    /// Nullable text, such as timestamps or the collection name.
    OptionalText,
}

impl ValueKind {
    /// The value a record reports for a storage key it does not carry.
    pub fn default_value(self) -> FieldValue {
        self.default_ref().to_value()
    }

    pub fn default_ref(self) -> FieldRef<'static> {
        match self {
            ValueKind::Text => FieldRef::Text(""),
            ValueKind::Number => FieldRef::Integer(0),
            ValueKind::Bool => FieldRef::Bool(false),
            ValueKind::List => FieldRef::Texts(&[]),
            ValueKind::OptionalText => FieldRef::Null,
        }
    }
}

/// A borrowed view of one stored value.
///
/// Matching runs over these so that scoring a record never copies its
/// strings or lists.
#[derive(Debug, Clone, Copy)]
pub enum FieldRef<'a> {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(&'a str),
    /// A plain string list, the shape most record fields use.
    Texts(&'a [String]),
    Ids(&'a [RecordId]),
    /// A key outside the known table, kept as raw JSON.
    Json(&'a serde_json::Value),
    Value(&'a FieldValue),
}

fn parse_finite(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

impl FieldRef<'_> {
    pub fn to_value(self) -> FieldValue {
        match self {
            FieldRef::Null => FieldValue::Null,
            FieldRef::Bool(b) => FieldValue::Bool(b),
            FieldRef::Integer(n) => FieldValue::Integer(n),
            FieldRef::Float(x) => FieldValue::Float(x),
            FieldRef::Text(s) => FieldValue::from(s),
            FieldRef::Texts(items) => FieldValue::from(items),
            FieldRef::Ids(ids) => FieldValue::List(
                ids.iter().map(|id| FieldValue::from(id.as_str())).collect(),
            ),
            FieldRef::Json(value) => FieldValue::from(value),
            FieldRef::Value(value) => value.clone(),
        }
    }

    /// Numeric interpretation: numbers as-is, strings when they parse to a
    /// finite number.
    pub fn as_number(self) -> Option<f64> {
        match self {
            FieldRef::Integer(n) => Some(n as f64),
            FieldRef::Float(x) => Some(x),
            FieldRef::Text(s) => parse_finite(s),
            FieldRef::Json(serde_json::Value::Number(n)) => n.as_f64(),
            FieldRef::Json(serde_json::Value::String(s)) => parse_finite(s),
            FieldRef::Value(value) => value.as_number(),
            _ => None,
        }
    }

    /// Number of items for lists and maps, `None` for scalars.
    pub fn container_len(self) -> Option<usize> {
        match self {
            FieldRef::Texts(items) => Some(items.len()),
            FieldRef::Ids(ids) => Some(ids.len()),
            FieldRef::Json(serde_json::Value::Array(items)) => Some(items.len()),
            FieldRef::Json(serde_json::Value::Object(map)) => Some(map.len()),
            FieldRef::Value(value) => value.container_len(),
            _ => None,
        }
    }

    /// Length in characters of the plain string form.
    pub fn text_len(self) -> usize {
        match self {
            FieldRef::Null => 0,
            FieldRef::Text(s) => s.chars().count(),
            FieldRef::Json(serde_json::Value::String(s)) => s.chars().count(),
            FieldRef::Value(value) => value.to_string().chars().count(),
            other => other.to_value().to_string().chars().count(),
        }
    }
}

impl FieldValue {
    /// Numeric interpretation: numbers as-is, strings when they parse to a
    /// finite number. `"nan"` or `"inf"` stay text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(n) => Some(*n as f64),
            FieldValue::Float(f) => Some(*f),
            FieldValue::Text(s) => parse_finite(s),
            _ => None,
        }
    }

    /// Number of items for lists and maps, `None` for scalars.
    pub fn container_len(&self) -> Option<usize> {
        match self {
            FieldValue::List(items) => Some(items.len()),
            FieldValue::Map(entries) => Some(entries.len()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Integer(n) => write!(f, "{n}"),
            FieldValue::Float(x) => write!(f, "{x}"),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            FieldValue::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<&serde_json::Value> for FieldValue {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => FieldValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => FieldValue::Text(s.clone()),
            Value::Array(items) => {
                FieldValue::List(items.iter().map(FieldValue::from).collect())
            }
            Value::Object(entries) => FieldValue::Map(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), FieldValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<&[String]> for FieldValue {
    fn from(values: &[String]) -> Self {
        FieldValue::List(
            values.iter().map(|v| FieldValue::Text(v.clone())).collect(),
        )
    }
}
