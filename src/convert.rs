use std::collections::BTreeMap;
use std::sync::Arc;

use crate::value::{Map, Seq, Value};

/// Conversion of Rust data into a snapshot tree.
///
/// Implemented for primitives, strings, containers and, with the `macros`
/// feature, derivable for structs:
///
/// ```
/// use memotree::{IntoValue, Value};
///
/// #[derive(IntoValue)]
/// struct Channel {
///     id: u32,
///     #[memotree(rename = "title")]
///     name: String,
/// }
///
/// let value = Channel { id: 1, name: "general".into() }.into_value();
/// assert_eq!(value.lookup("title"), Some(Value::from("general")));
/// ```
pub trait IntoValue {
    /// Convert `self` into a tree.
    fn into_value(self) -> Value;
}

macro_rules! primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Self::$variant(v.into())
            }
        })*
    };
}

primitive! {
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Int,
    u16 => Int,
    u32 => Int,
    f32 => Float,
    f64 => Float,
    &str => Str,
    String => Str,
    Arc<str> => Str,
    Seq => Seq,
    Map => Map,
}

/// Integers beyond the `i64` range become floats.
impl From<u64> for Value {
    fn from(v: u64) -> Self {
        i64::try_from(v).map_or(Self::Float(v as f64), Self::Int)
    }
}

/// Integers beyond the `i64` range become floats.
impl From<usize> for Value {
    fn from(v: usize) -> Self {
        i64::try_from(v).map_or(Self::Float(v as f64), Self::Int)
    }
}

impl From<isize> for Value {
    fn from(v: isize) -> Self {
        Self::Int(v as i64)
    }
}

/// `None` becomes [`Value::Null`].
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::Seq(v.into_iter().collect())
    }
}

macro_rules! into_value {
    ($($ty:ty),* $(,)?) => {
        $(impl IntoValue for $ty {
            fn into_value(self) -> Value {
                Value::from(self)
            }
        })*
    };
}

into_value! {
    bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64,
    &str, String, Arc<str>, Seq, Map,
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        self.map_or(Value::Null, IntoValue::into_value)
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::Seq(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: IntoValue> IntoValue for BTreeMap<String, T> {
    fn into_value(self) -> Value {
        Value::Map(self.into_iter().map(|(k, v)| (k, v.into_value())).collect())
    }
}

/// Numbers that fit into an `i64` become [`Value::Int`], all others
/// [`Value::Float`].
#[cfg(feature = "json")]
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match v {
            Json::Null => Self::Null,
            Json::Bool(v) => Self::Bool(v),
            Json::Number(n) => match n.as_i64() {
                Some(v) => Self::Int(v),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(v) => Self::Str(v.into()),
            Json::Array(items) => Self::Seq(items.into_iter().collect()),
            Json::Object(entries) => Self::Map(entries.into_iter().collect()),
        }
    }
}

#[cfg(feature = "json")]
impl IntoValue for serde_json::Value {
    fn into_value(self) -> Value {
        Value::from(self)
    }
}
