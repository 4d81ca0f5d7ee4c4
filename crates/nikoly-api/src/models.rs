// Controller wire records
//
// Models for the payloads of `listactions`, `listlocations` and
// `executeactions`. Every field is `#[serde(default)]` and numeric fields
// go through a lenient deserializer: the controller's firmware is not
// consistent about field presence or about numbers-as-strings, and a
// missing field must never fail a whole listing.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::codec::truncate_f64;
use crate::error::Error;

// ── Actions ──────────────────────────────────────────────────────────

/// One element of the `listactions` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    /// 1 = on/off, 2 = dimmer; other codes are passed through untouched.
    #[serde(default, rename = "type", deserialize_with = "lenient_i64")]
    pub action_type: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub location: i64,
    /// Primary value: 0/255 for on/off actions, 0-100 for dimmers.
    #[serde(default, deserialize_with = "lenient_i64")]
    pub value1: i64,
}

// ── Locations ────────────────────────────────────────────────────────

/// One element of the `listlocations` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
}

// ── Execute ──────────────────────────────────────────────────────────

/// One entry of the `actions` array in an `executeactions` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionValue {
    pub id: i64,
    pub value1: i64,
}

impl ActionValue {
    pub fn new(id: i64, value1: i64) -> Self {
        Self { id, value1 }
    }

    /// Build an action from a loosely typed value (CLI input, JSON
    /// pass-through).
    pub fn coerce(id: i64, value: &Value) -> Result<Self, Error> {
        let value1 = coerce_int(value).ok_or_else(|| Error::InvalidRequest {
            reason: format!("value {value} cannot be coerced to an integer"),
        })?;
        Ok(Self { id, value1 })
    }
}

/// Integer coercion: integers, finite floats (truncated), booleans, and
/// strings holding an integer literal.
pub fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate_f64)),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

// ── Lenient field decoding ───────────────────────────────────────────

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_int(&value).unwrap_or_default())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}
