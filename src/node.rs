//! Safe lookups over loosely typed JSON trees.
//!
//! Structured data embedded in pages has no guaranteed shape, so every
//! accessor here answers with `Value::Null` instead of failing when a key is
//! missing or a node has the wrong kind.

use serde_json::Value;

static NULL: Value = Value::Null;

pub trait Node {
    /// Child of a map, `Null` for anything else.
    fn field(&self, key: &str) -> &Value;

    /// Chained [`Node::field`] lookups.
    fn path(&self, keys: &[&str]) -> &Value;

    /// A map itself, or the first element of a list when that element is a map.
    fn first_object(&self) -> &Value;

    /// Emptiness check: null, `false`, zero, `""`, `[]` and `{}` are falsy.
    fn truthy(&self) -> bool;

    /// `self` when truthy, otherwise `other`.
    fn or<'a>(&'a self, other: &'a Value) -> &'a Value;

    /// Scalar rendered as text; `None` for null, lists and maps.
    fn text(&self) -> Option<String>;
}

impl Node for Value {
    fn field(&self, key: &str) -> &Value {
        match self {
            Value::Object(map) => map.get(key).unwrap_or(&NULL),
            _ => &NULL,
        }
    }

    fn path(&self, keys: &[&str]) -> &Value {
        keys.iter().fold(self, |node, key| node.field(key))
    }

    fn first_object(&self) -> &Value {
        match self {
            Value::Object(_) => self,
            Value::Array(items) => match items.first() {
                Some(first @ Value::Object(_)) => first,
                _ => &NULL,
            },
            _ => &NULL,
        }
    }

    fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
        }
    }

    fn or<'a>(&'a self, other: &'a Value) -> &'a Value {
        if self.truthy() { self } else { other }
    }

    fn text(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}
