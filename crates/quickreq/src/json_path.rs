//! Dotted-path lookups into a JSON object
//!
//! A path such as `"a.b.c"` descends through nested objects, one literal key per
//! segment. Every segment but the last must land on an object; the last one is
//! the leaf handed to [`JsonLeaf`].

use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};

use crate::error::HttpError;
use crate::response::HttpResult;

/// Resolve `path` against `root`
pub fn resolve<'a>(root: &'a Map<String, Value>, path: &str) -> HttpResult<&'a Value> {
    let (parents, leaf) = match path.rsplit_once('.') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, path),
    };

    let mut current = root;
    let mut index = 0;

    for segment in parents.into_iter().flat_map(|p| p.split('.')) {
        current = lookup(current, segment, index)?
            .as_object()
            .ok_or_else(|| HttpError::PathTraversal {
                segment: segment.to_string(),
                index,
            })?;
        index += 1;
    }

    lookup(current, leaf, index)
}

fn lookup<'a>(map: &'a Map<String, Value>, key: &str, index: usize) -> HttpResult<&'a Value> {
    map.get(key).ok_or_else(|| HttpError::MissingKey {
        key: key.to_string(),
        index,
    })
}

/// Resolve `path` and convert the leaf to `T`
pub fn extract<T: JsonLeaf>(root: &Map<String, Value>, path: &str) -> HttpResult<T> {
    let leaf = resolve(root, path)?;
    T::from_leaf(leaf).ok_or(HttpError::TypeMismatch {
        actual: type_name(leaf),
        requested: T::TYPE_NAME,
    })
}

/// JSON type of `value`, as reported in [`HttpError::TypeMismatch`]
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Deserialize `value` as `T`, falling back to its converted forms
///
/// A numeric string is also tried as a number or boolean, and a number or
/// boolean as its string form.
pub fn coerce<T: DeserializeOwned>(value: Value) -> HttpResult<T> {
    let actual = type_name(&value);
    let alternatives = conversions(&value);

    std::iter::once(value)
        .chain(alternatives)
        .find_map(|candidate| serde_json::from_value(candidate).ok())
        .ok_or(HttpError::TypeMismatch {
            actual,
            requested: std::any::type_name::<T>(),
        })
}

fn conversions(value: &Value) -> Vec<Value> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(n) = s.parse::<i64>() {
                vec![Value::from(n)]
            } else if let Ok(n) = s.parse::<u64>() {
                vec![Value::from(n)]
            } else if let Some(n) = s.parse::<f64>().ok().and_then(Number::from_f64) {
                vec![Value::Number(n)]
            } else if let Ok(b) = s.parse::<bool>() {
                vec![Value::Bool(b)]
            } else {
                Vec::new()
            }
        }
        Value::Number(n) => vec![Value::String(n.to_string())],
        Value::Bool(b) => vec![Value::String(b.to_string())],
        _ => Vec::new(),
    }
}

/// A Rust type a JSON leaf can be read as without coercion
pub trait JsonLeaf: Sized {
    /// Name used in type mismatch errors
    const TYPE_NAME: &'static str;

    /// Convert `value`, or `None` if its JSON type does not match
    fn from_leaf(value: &Value) -> Option<Self>;
}

impl JsonLeaf for String {
    const TYPE_NAME: &'static str = "string";

    fn from_leaf(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl JsonLeaf for bool {
    const TYPE_NAME: &'static str = "boolean";

    fn from_leaf(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl JsonLeaf for i64 {
    const TYPE_NAME: &'static str = "integer";

    fn from_leaf(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl JsonLeaf for i32 {
    const TYPE_NAME: &'static str = "integer";

    fn from_leaf(value: &Value) -> Option<Self> {
        value.as_i64().and_then(|n| i32::try_from(n).ok())
    }
}

impl JsonLeaf for u64 {
    const TYPE_NAME: &'static str = "unsigned integer";

    fn from_leaf(value: &Value) -> Option<Self> {
        value.as_u64()
    }
}

impl JsonLeaf for f64 {
    const TYPE_NAME: &'static str = "float";

    fn from_leaf(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl JsonLeaf for f32 {
    const TYPE_NAME: &'static str = "float";

    fn from_leaf(value: &Value) -> Option<Self> {
        value.as_f64().map(|n| n as f32)
    }
}

impl JsonLeaf for Vec<Value> {
    const TYPE_NAME: &'static str = "array";

    fn from_leaf(value: &Value) -> Option<Self> {
        value.as_array().cloned()
    }
}

impl JsonLeaf for Map<String, Value> {
    const TYPE_NAME: &'static str = "object";

    fn from_leaf(value: &Value) -> Option<Self> {
        value.as_object().cloned()
    }
}

impl JsonLeaf for Value {
    const TYPE_NAME: &'static str = "any";

    fn from_leaf(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}
