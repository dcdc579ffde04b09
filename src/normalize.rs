// src/normalize.rs

//! Single numeric pass applied to every payload before it is written out.
//!
//! Integers wider than 2^53 - 1 cannot round-trip through a JavaScript
//! number, so they are rewritten as floats (lossy above that range). They
//! print in float form (`9007199254740992.0`); a JS client parses that to
//! the same double as the bare integer text.
//! Non-finite floats have no JSON form and serialize as `null`.

use serde::Serialize;
use serde_json::{Number, Value};

pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

pub fn to_json<T: Serialize>(payload: &T) -> serde_json::Result<Value> {
    let mut value = serde_json::to_value(payload)?;
    normalize(&mut value);
    Ok(value)
}

pub fn normalize(value: &mut Value) {
    match value {
        Value::Number(n) => {
            if let Some(wide) = wide_integer(n).and_then(Number::from_f64) {
                *n = wide;
            }
        }
        Value::Array(items) => items.iter_mut().for_each(normalize),
        Value::Object(map) => map.values_mut().for_each(normalize),
        Value::Null | Value::Bool(_) | Value::String(_) => {}
    }
}

fn wide_integer(n: &Number) -> Option<f64> {
    if let Some(i) = n.as_i64() {
        (i.unsigned_abs() > MAX_SAFE_INTEGER).then_some(i as f64)
    } else if let Some(u) = n.as_u64() {
        (u > MAX_SAFE_INTEGER).then_some(u as f64)
    } else {
        None
    }
}
