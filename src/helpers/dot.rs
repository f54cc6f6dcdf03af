//! Dot-path access into nested maps
//!
//! Addresses positions in a nested [`serde_json::Value`] with a delimited
//! path such as `"user.profile.name"`. Numeric segments index into lists on
//! reads; writes auto-vivify missing maps along the way.
//!
//! The delimiter is reserved: a key that contains it cannot be addressed as a
//! single segment.

use crate::error::{Result, UtilError};
use serde_json::{Map, Value};

/// Dot-path accessor with a configurable delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dot {
    delimiter: char,
}

impl Default for Dot {
    fn default() -> Self {
        Self { delimiter: '.' }
    }
}

impl Dot {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Resolve `path`, falling back to `default` when any segment is absent.
    ///
    /// ```rust
    /// use scriptkit::helpers::dot::Dot;
    /// use serde_json::{json, Map};
    ///
    /// let data = json!({"user": {"name": "Al"}});
    /// let map = data.as_object().unwrap();
    /// let dot = Dot::default();
    /// assert_eq!(dot.get(map, "user.name", None), Some(&json!("Al")));
    /// assert_eq!(dot.get(&Map::new(), "x.y.z", None), None);
    /// ```
    pub fn get<'a>(
        &self,
        map: &'a Map<String, Value>,
        path: &str,
        default: Option<&'a Value>,
    ) -> Option<&'a Value> {
        self.resolve(map, path).or(default)
    }

    /// Whether `path` resolves. Presence counts, not truthiness: a stored
    /// `null`, `false` or `""` is present.
    pub fn has(&self, map: &Map<String, Value>, path: &str) -> bool {
        self.resolve(map, path).is_some()
    }

    fn resolve<'a>(&self, map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
        if !path.contains(self.delimiter) {
            return map.get(path);
        }

        let mut segments = path.split(self.delimiter);
        let first = segments.next()?;
        let mut current = map.get(first)?;
        for segment in segments {
            current = child(current, segment)?;
        }
        Some(current)
    }

    /// Assign `value` at `path`, creating empty maps for missing or `null`
    /// intermediate segments. Returns the (mutated) input map.
    ///
    /// Descending through an existing scalar, or through a list with an index
    /// that is not already present, is an invalid argument. A final list
    /// segment may replace an element or append at exactly `len`.
    pub fn set<'a>(
        &self,
        map: &'a mut Map<String, Value>,
        path: &str,
        value: Value,
    ) -> Result<&'a mut Map<String, Value>> {
        if !path.contains(self.delimiter) {
            map.insert(path.to_string(), value);
            return Ok(map);
        }

        let segments: Vec<&str> = path.split(self.delimiter).collect();
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| UtilError::invalid_argument("path", "empty path"))?;

        {
            let (first, rest) = parents
                .split_first()
                .ok_or_else(|| UtilError::invalid_argument("path", "empty path"))?;

            let mut current = map
                .entry(first.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            vivify(current);

            for segment in rest {
                current = child_for_write(current, segment, path)?;
            }
            assign(current, last, value, path)?;
        }
        Ok(map)
    }

    /// Remove the entry at `path`. Missing segments make this a no-op.
    pub fn unset(&self, map: &mut Map<String, Value>, path: &str) {
        if !path.contains(self.delimiter) {
            map.shift_remove(path);
            return;
        }

        let segments: Vec<&str> = path.split(self.delimiter).collect();
        let Some((last, parents)) = segments.split_last() else {
            return;
        };
        let Some((first, rest)) = parents.split_first() else {
            return;
        };

        let Some(mut current) = map.get_mut(*first) else {
            return;
        };
        for segment in rest {
            let Some(next) = child_mut(current, segment) else {
                return;
            };
            current = next;
        }

        match current {
            Value::Object(obj) => {
                obj.shift_remove(*last);
            }
            Value::Array(list) => {
                if let Some(index) = list_index(last).filter(|i| *i < list.len()) {
                    list.remove(index);
                }
            }
            _ => {}
        }
    }
}

fn list_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

fn child<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(obj) => obj.get(segment),
        Value::Array(list) => list.get(list_index(segment)?),
        _ => None,
    }
}

fn child_mut<'a>(value: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(obj) => obj.get_mut(segment),
        Value::Array(list) => {
            let index = list_index(segment)?;
            list.get_mut(index)
        }
        _ => None,
    }
}

fn vivify(value: &mut Value) {
    if value.is_null() {
        *value = Value::Object(Map::new());
    }
}

fn child_for_write<'a>(value: &'a mut Value, segment: &str, path: &str) -> Result<&'a mut Value> {
    let next = match value {
        Value::Object(obj) => obj
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new())),
        Value::Array(list) => {
            let len = list.len();
            list_index(segment)
                .and_then(|i| list.get_mut(i))
                .ok_or_else(|| {
                    UtilError::invalid_argument(
                        "path",
                        format!("'{path}': segment '{segment}' is not an index of a list of {len}"),
                    )
                })?
        }
        other => {
            return Err(UtilError::invalid_argument(
                "path",
                format!("'{path}': cannot descend into {} at '{segment}'", kind(other)),
            ));
        }
    };
    vivify(next);
    Ok(next)
}

fn assign(target: &mut Value, segment: &str, value: Value, path: &str) -> Result<()> {
    match target {
        Value::Object(obj) => {
            obj.insert(segment.to_string(), value);
            Ok(())
        }
        Value::Array(list) => match list_index(segment) {
            Some(i) if i < list.len() => {
                list[i] = value;
                Ok(())
            }
            Some(i) if i == list.len() => {
                list.push(value);
                Ok(())
            }
            _ => Err(UtilError::invalid_argument(
                "path",
                format!(
                    "'{path}': segment '{segment}' is not an index of a list of {}",
                    list.len()
                ),
            )),
        },
        other => Err(UtilError::invalid_argument(
            "path",
            format!("'{path}': cannot assign into {} at '{segment}'", kind(other)),
        )),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a map",
    }
}

/// [`Dot::get`] with the default `.` delimiter.
pub fn array_get<'a>(
    map: &'a Map<String, Value>,
    path: &str,
    default: Option<&'a Value>,
) -> Option<&'a Value> {
    Dot::default().get(map, path, default)
}

/// [`Dot::set`] with the default `.` delimiter.
pub fn array_set<'a>(
    map: &'a mut Map<String, Value>,
    path: &str,
    value: Value,
) -> Result<&'a mut Map<String, Value>> {
    Dot::default().set(map, path, value)
}

/// [`Dot::unset`] with the default `.` delimiter.
pub fn array_unset(map: &mut Map<String, Value>, path: &str) {
    Dot::default().unset(map, path)
}

/// [`Dot::has`] with the default `.` delimiter.
pub fn array_has(map: &Map<String, Value>, path: &str) -> bool {
    Dot::default().has(map, path)
}
