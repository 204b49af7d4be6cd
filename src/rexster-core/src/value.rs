use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::fmt::Write;

use crate::error::{QueryError, Result};

/// Value carried in a Rexster request, tagged with the type the server should
/// coerce it to.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    String(String),
    Integer(i32),
    Long(i64),
    Double(f64),
    Boolean(bool),
    List(Vec<TypedValue>),
    Map(IndexMap<String, TypedValue>),
}

impl TypedValue {
    /// Build a list from anything convertible into typed values
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<TypedValue>,
    {
        TypedValue::List(items.into_iter().map(Into::into).collect())
    }

    /// Build a map, keeping the iteration order of `entries`
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<TypedValue>,
    {
        TypedValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Render the value in Rexster's typed-literal notation
    pub fn encode(&self) -> String {
        let mut out = String::new();
        self.write_encoded(&mut out);
        out
    }

    fn write_encoded(&self, out: &mut String) {
        match self {
            TypedValue::String(s) => out.push_str(s),
            TypedValue::Boolean(b) => {
                let _ = write!(out, "(b,{})", b);
            }
            TypedValue::Integer(i) => {
                let _ = write!(out, "(i,{})", i);
            }
            TypedValue::Long(l) => {
                let _ = write!(out, "(l,{})", l);
            }
            // printf spelling: `nan`, `inf`, `-inf`
            TypedValue::Double(d) if d.is_nan() => out.push_str("(d,nan)"),
            TypedValue::Double(d) => {
                let _ = write!(out, "(d,{:.6})", d);
            }
            TypedValue::List(items) => {
                out.push_str("(list,(");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    item.write_encoded(out);
                }
                out.push_str("))");
            }
            TypedValue::Map(entries) => {
                out.push_str("(map,(");
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(key);
                    out.push('=');
                    value.write_encoded(out);
                }
                out.push_str("))");
            }
        }
    }

    /// Render the value as a Groovy literal for Gremlin scripts
    pub fn to_script_literal(&self) -> String {
        match self {
            TypedValue::String(s) => quote_single(s),
            TypedValue::Boolean(b) => b.to_string(),
            TypedValue::Integer(i) => i.to_string(),
            TypedValue::Long(l) => format!("{}L", l),
            TypedValue::Double(d) => {
                if d.is_nan() {
                    "Double.NaN".to_string()
                } else if d.is_infinite() && d.is_sign_positive() {
                    "Double.POSITIVE_INFINITY".to_string()
                } else if d.is_infinite() {
                    "Double.NEGATIVE_INFINITY".to_string()
                } else {
                    // Debug keeps the fractional part ("1.0", not "1")
                    format!("{:?}d", d)
                }
            }
            TypedValue::List(items) => {
                let parts: Vec<String> = items.iter().map(TypedValue::to_script_literal).collect();
                format!("[{}]", parts.join(", "))
            }
            TypedValue::Map(entries) if entries.is_empty() => "[:]".to_string(),
            TypedValue::Map(entries) => {
                let parts: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", quote_single(k), v.to_script_literal()))
                    .collect();
                format!("[{}]", parts.join(", "))
            }
        }
    }

    /// Plain JSON form, used for request bodies
    pub fn to_json(&self) -> JsonValue {
        match self {
            TypedValue::String(s) => JsonValue::String(s.clone()),
            TypedValue::Integer(i) => JsonValue::from(*i),
            TypedValue::Long(l) => JsonValue::from(*l),
            TypedValue::Double(d) => JsonValue::from(*d),
            TypedValue::Boolean(b) => JsonValue::Bool(*b),
            TypedValue::List(items) => JsonValue::Array(items.iter().map(TypedValue::to_json).collect()),
            TypedValue::Map(entries) => JsonValue::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Encode a value in Rexster's typed-literal notation.
///
/// Strings pass through untouched; everything else is wrapped in a
/// `(<tag>,<payload>)` pair that the server uses to pick the property type.
pub fn encode(value: &TypedValue) -> String {
    value.encode()
}

fn quote_single(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

impl From<String> for TypedValue {
    fn from(value: String) -> Self {
        TypedValue::String(value)
    }
}

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        TypedValue::String(value.to_string())
    }
}

impl From<&String> for TypedValue {
    fn from(value: &String) -> Self {
        TypedValue::String(value.clone())
    }
}

impl From<bool> for TypedValue {
    fn from(value: bool) -> Self {
        TypedValue::Boolean(value)
    }
}

macro_rules! impl_from_small_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for TypedValue {
                fn from(value: $t) -> Self {
                    TypedValue::Integer(i32::from(value))
                }
            }
        )*
    };
}

impl_from_small_int!(i8, i16, i32, u8, u16);

impl From<i64> for TypedValue {
    fn from(value: i64) -> Self {
        match i32::try_from(value) {
            Ok(small) => TypedValue::Integer(small),
            Err(_) => TypedValue::Long(value),
        }
    }
}

impl From<u32> for TypedValue {
    fn from(value: u32) -> Self {
        TypedValue::from(i64::from(value))
    }
}

impl TryFrom<u64> for TypedValue {
    type Error = QueryError;

    fn try_from(value: u64) -> Result<Self> {
        i64::try_from(value)
            .map(TypedValue::from)
            .map_err(|_| QueryError::UnsupportedType(format!("integer {} exceeds 64-bit signed range", value)))
    }
}

impl From<f32> for TypedValue {
    fn from(value: f32) -> Self {
        TypedValue::Double(f64::from(value))
    }
}

impl From<f64> for TypedValue {
    fn from(value: f64) -> Self {
        TypedValue::Double(value)
    }
}

impl<V: Into<TypedValue>> From<Vec<V>> for TypedValue {
    fn from(items: Vec<V>) -> Self {
        TypedValue::list(items)
    }
}

impl From<IndexMap<String, TypedValue>> for TypedValue {
    fn from(entries: IndexMap<String, TypedValue>) -> Self {
        TypedValue::Map(entries)
    }
}

impl TryFrom<JsonValue> for TypedValue {
    type Error = QueryError;

    fn try_from(value: JsonValue) -> Result<Self> {
        match value {
            JsonValue::Null => Err(QueryError::UnsupportedType("null".to_string())),
            JsonValue::Bool(b) => Ok(TypedValue::Boolean(b)),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(TypedValue::from(i))
                } else if let Some(u) = n.as_u64() {
                    TypedValue::try_from(u)
                } else if let Some(f) = n.as_f64() {
                    Ok(TypedValue::Double(f))
                } else {
                    Err(QueryError::UnsupportedType(format!("number {}", n)))
                }
            }
            JsonValue::String(s) => Ok(TypedValue::String(s)),
            JsonValue::Array(items) => items
                .into_iter()
                .map(TypedValue::try_from)
                .collect::<Result<Vec<_>>>()
                .map(TypedValue::List),
            JsonValue::Object(entries) => entries
                .into_iter()
                .map(|(k, v)| TypedValue::try_from(v).map(|v| (k, v)))
                .collect::<Result<IndexMap<_, _>>>()
                .map(TypedValue::Map),
        }
    }
}
