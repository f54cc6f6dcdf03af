//! Conversions between Rhai values and `serde_json` values
//!
//! Rhai object maps are sorted by key, so map order is lost on the way into
//! a script and comes back sorted.

use rhai::{Dynamic, EvalAltResult};
use serde::Serialize;
use serde_json::{Map, Value};

pub fn to_dynamic<T: Serialize + ?Sized>(value: &T) -> Result<Dynamic, Box<EvalAltResult>> {
    rhai::serde::to_dynamic(value)
}

pub fn to_value(value: &Dynamic) -> Result<Value, Box<EvalAltResult>> {
    rhai::serde::from_dynamic::<Value>(value)
}

pub fn map_to_object(map: &rhai::Map) -> Result<Map<String, Value>, Box<EvalAltResult>> {
    match to_value(&Dynamic::from_map(map.clone()))? {
        Value::Object(obj) => Ok(obj),
        other => Err(format!("expected a map, got {other}").into()),
    }
}

pub fn object_to_map(obj: Map<String, Value>) -> Result<rhai::Map, Box<EvalAltResult>> {
    let value = Value::Object(obj);
    to_dynamic(&value)?
        .try_cast::<rhai::Map>()
        .ok_or_else(|| "expected a map".into())
}
