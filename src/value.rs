use im::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A dynamic value exchanged between test bodies, stubs, and assertions.
///
/// Stub invocations are recorded as ordered tuples of `Value`, and the
/// assertion helpers compare `Value`s with [`deep_equal`]. Anything a mod
/// script would hand to a collaborator can be modeled with these variants.
///
/// # Examples
///
/// ```rust
/// use modspec::value::Value;
/// let n = Value::Number(3.14);
/// assert_eq!(n.type_name(), "Number");
/// let s = Value::from("hello");
/// assert_eq!(s.type_name(), "String");
/// let nil = Value::default();
/// assert!(nil.is_nil());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Nil,
    Number(f64),
    String(String),
    Bool(bool),
    List(Vec<Value>),
    Map(HashMap<String, Value>),
}

impl Value {
    /// Returns the type name of the value as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "Nil",
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::Bool(_) => "Bool",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
        }
    }

    /// Returns true if the value is Nil.
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Returns the contained number if this is a Number value.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the contained bool if this is a Bool value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the contained string slice if this is a String value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    // ------------------------------------------------------------------------
    // Display formatting helpers
    // ------------------------------------------------------------------------

    fn fmt_list(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
        write!(f, "(")?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, ")")
    }

    fn fmt_map(f: &mut fmt::Formatter<'_>, map: &HashMap<String, Value>) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for (k, v) in map.iter() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", k, v)?;
            first = false;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Number(n) => {
                if n.fract() == 0.0 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::List(items) => Value::fmt_list(f, items),
            Value::Map(map) => Value::fmt_map(f, map),
        }
    }
}

/// Structural equality over the closed set of value kinds.
///
/// Scalars compare by value. Lists are equal iff they have equal length and
/// equal elements at every index. Maps are equal iff they have equal length
/// and equal values at every key present in either map, recursively.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Nil, Value::Nil) => true,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::List(xs), Value::List(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys.iter()).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Map(xs), Value::Map(ys)) => {
            // Equal length plus one-sided coverage implies the key sets match.
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).map_or(false, |y| deep_equal(x, y)))
        }
        _ => false,
    }
}

// ----------------------------------------------------------------------------
// Conversions
// ----------------------------------------------------------------------------

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_compare_by_value() {
        assert!(deep_equal(&Value::from(2), &Value::Number(2.0)));
        assert!(deep_equal(&Value::from("a"), &Value::from("a")));
        assert!(!deep_equal(&Value::from(2), &Value::from("2")));
        assert!(!deep_equal(&Value::Nil, &Value::Bool(false)));
    }

    #[test]
    fn lists_require_equal_length_and_elements() {
        let a = Value::from(vec![Value::from(1), Value::from("x")]);
        let b = Value::from(vec![Value::from(1), Value::from("x")]);
        let c = Value::from(vec![Value::from(1)]);
        assert!(deep_equal(&a, &b));
        assert!(!deep_equal(&a, &c));
    }

    #[test]
    fn maps_cover_keys_from_either_side() {
        let a = Value::from(json!({"pos": [1, 2], "owner": "singleplayer"}));
        let b = Value::from(json!({"owner": "singleplayer", "pos": [1, 2]}));
        let c = Value::from(json!({"pos": [1, 2]}));
        let d = Value::from(json!({"pos": [1, 2], "meta": "x"}));
        assert!(deep_equal(&a, &b));
        assert!(!deep_equal(&a, &c));
        assert!(!deep_equal(&c, &a));
        assert!(!deep_equal(&c, &d));
    }

    #[test]
    fn nested_containers_recurse() {
        let a = Value::from(json!({"inv": {"slots": [1, 2, 3]}}));
        let b = Value::from(json!({"inv": {"slots": [1, 2, 3]}}));
        let c = Value::from(json!({"inv": {"slots": [1, 2, 4]}}));
        assert!(deep_equal(&a, &b));
        assert!(!deep_equal(&a, &c));
    }

    #[test]
    fn display_collapses_integral_numbers() {
        assert_eq!(Value::Number(2.0).to_string(), "2");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(
            Value::from(vec![Value::from(1), Value::from("a")]).to_string(),
            "(1 a)"
        );
        assert_eq!(Value::Nil.to_string(), "nil");
    }
}
