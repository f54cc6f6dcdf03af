//! Associative-array helpers over [`serde_json::Map`]

use crate::error::{Result, UtilError};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Position argument for [`array_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPos {
    First,
    Last,
    /// 1-based from the front when positive, from the back when negative.
    /// `0` means the first key.
    Index(i64),
}

impl FromStr for KeyPos {
    type Err = UtilError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "first" => Ok(KeyPos::First),
            "last" => Ok(KeyPos::Last),
            other => other.parse::<i64>().map(KeyPos::Index).map_err(|_| {
                UtilError::invalid_argument(
                    "pos",
                    format!("expected \"first\", \"last\", or an integer, got \"{other}\""),
                )
            }),
        }
    }
}

/// Key at the given position, or `None` when out of range.
pub fn array_key(map: &Map<String, Value>, pos: KeyPos) -> Option<&str> {
    let key = match pos {
        KeyPos::First | KeyPos::Index(0) => map.keys().next(),
        KeyPos::Last => map.keys().next_back(),
        KeyPos::Index(n) if n > 0 => map.keys().nth(usize::try_from(n - 1).ok()?),
        KeyPos::Index(n) => map.keys().rev().nth(usize::try_from(-(n + 1)).ok()?),
    };
    key.map(String::as_str)
}

/// Entries of `map` whose key is listed in `keys`, in `keys` order.
pub fn array_select_keys<S: AsRef<str>>(map: &Map<String, Value>, keys: &[S]) -> Map<String, Value> {
    keys.iter()
        .filter_map(|key| {
            let key = key.as_ref();
            map.get(key).map(|value| (key.to_string(), value.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Map<String, Value> {
        match json!({"a": 1, "b": 2, "c": 3}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_array_key_positions() {
        let map = sample();
        assert_eq!(array_key(&map, KeyPos::First), Some("a"));
        assert_eq!(array_key(&map, KeyPos::Last), Some("c"));
        assert_eq!(array_key(&map, KeyPos::Index(0)), Some("a"));
        assert_eq!(array_key(&map, KeyPos::Index(2)), Some("b"));
        assert_eq!(array_key(&map, KeyPos::Index(-1)), Some("c"));
        assert_eq!(array_key(&map, KeyPos::Index(-3)), Some("a"));
        assert_eq!(array_key(&map, KeyPos::Index(4)), None);
        assert_eq!(array_key(&Map::new(), KeyPos::First), None);
    }

    #[test]
    fn test_key_pos_parse() {
        assert_eq!("last".parse::<KeyPos>().unwrap(), KeyPos::Last);
        assert_eq!("-2".parse::<KeyPos>().unwrap(), KeyPos::Index(-2));
        assert!("middle".parse::<KeyPos>().is_err());
    }

    #[test]
    fn test_select_keys_skips_missing() {
        let picked = array_select_keys(&sample(), &["c", "zz", "a"]);
        assert_eq!(Value::Object(picked), json!({"c": 3, "a": 1}));
    }
}
