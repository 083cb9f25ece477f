//! Safe navigation over loosely-typed JSON trees.
//!
//! Upstream page state changes shape without notice, so every lookup returns
//! `None` on a missing key, an out-of-range index or a type mismatch instead of
//! failing. Paths use JSON pointer syntax (`/contents/tabs/0/tabRenderer`).

use serde_json::{Map, Value};

pub trait Dig {
    /// Value at `path`, if every step along it exists.
    fn dig(&self, path: &str) -> Option<&Value>;

    /// String at `path`. Non-string values count as absent.
    fn dig_str(&self, path: &str) -> Option<&str> {
        self.dig(path).and_then(Value::as_str)
    }

    /// Array at `path`, or an empty slice.
    fn dig_array(&self, path: &str) -> &[Value] {
        self.dig(path)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Object at `path`, or an empty object.
    fn dig_object(&self, path: &str) -> Value {
        match self.dig(path) {
            Some(value @ Value::Object(_)) => value.clone(),
            _ => empty_object(),
        }
    }
}

impl Dig for Value {
    fn dig(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return Some(self);
        }

        self.pointer(path).filter(|value| !value.is_null())
    }
}

pub fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Treats `""` and whitespace-only strings as absent.
pub fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}
