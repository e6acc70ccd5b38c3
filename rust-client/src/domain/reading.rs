use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const METER_ID_FIELD: &str = "meterID";
pub const MOBILE_NO_FIELD: &str = "mobileNo";
pub const REQUEST_ID_FIELD: &str = "requestID";

/// The (meterID, mobileNo, requestID) triple a reading is looked up by.
///
/// Values are kept as sent; a numeric `mobileNo` stays a number.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingKey {
    pub meter_id: Value,
    pub mobile_no: Value,
    pub request_id: Value,
}

impl ReadingKey {
    pub fn new(
        meter_id: impl Into<Value>,
        mobile_no: impl Into<Value>,
        request_id: impl Into<Value>,
    ) -> Self {
        Self {
            meter_id: meter_id.into(),
            mobile_no: mobile_no.into(),
            request_id: request_id.into(),
        }
    }
}

/// `null`, `false`, `0` and `""` count as no value at all.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Strict equality on JSON scalars. Numbers compare by value, so `555` and
/// `555.0` are equal. Arrays and objects never compare equal.
fn strict_eq(stored: &Value, wanted: &Value) -> bool {
    match (stored, wanted) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a == b,
            _ => a.as_f64() == b.as_f64(),
        },
        _ => false,
    }
}

/// A single meter reading as stored in a house data file.
///
/// Only the three identifying fields are interpreted; every other attribute
/// (consumption, timestamps, ...) is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reading(Map<String, Value>);

impl Reading {
    pub fn meter_id(&self) -> Option<&Value> {
        self.0.get(METER_ID_FIELD)
    }

    pub fn mobile_no(&self) -> Option<&Value> {
        self.0.get(MOBILE_NO_FIELD)
    }

    pub fn request_id(&self) -> Option<&Value> {
        self.0.get(REQUEST_ID_FIELD)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// All three identifying fields must be present and strictly equal to the
    /// key; no coercion between strings and numbers.
    pub fn matches(&self, key: &ReadingKey) -> bool {
        let eq = |stored: Option<&Value>, wanted: &Value| stored.is_some_and(|v| strict_eq(v, wanted));

        eq(self.meter_id(), &key.meter_id)
            && eq(self.mobile_no(), &key.mobile_no)
            && eq(self.request_id(), &key.request_id)
    }
}

impl From<Map<String, Value>> for Reading {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}
