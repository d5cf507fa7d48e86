use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("notification options are not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("notification options must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Parsed notification options. The dictionary is kept verbatim so it can be
/// persisted and handed back to callers without schema changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    dict: Map<String, Value>,
}

impl Options {
    pub fn from_json(raw: &str) -> Result<Self, OptionsError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, OptionsError> {
        match value {
            Value::Object(dict) => Ok(Self { dict }),
            other => Err(OptionsError::NotAnObject(kind_of(&other))),
        }
    }

    pub fn from_map(dict: Map<String, Value>) -> Self {
        Self { dict }
    }

    /// Numeric id of the notification. Numeric strings and fractional
    /// numbers are truncated toward zero; anything else, or a value outside
    /// the `i32` range, maps to 0.
    pub fn id(&self) -> i32 {
        self.dict.get("id").and_then(coerce_int).unwrap_or(0)
    }

    /// Key used for the preference store.
    pub fn identifier(&self) -> String {
        self.id().to_string()
    }

    pub fn trigger(&self) -> &Map<String, Value> {
        static EMPTY: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();
        match self.dict.get("trigger") {
            Some(Value::Object(trigger)) => trigger,
            _ => EMPTY.get_or_init(Map::new),
        }
    }

    /// `trigger.at` as a timestamp, when given in epoch milliseconds.
    pub fn trigger_at(&self) -> Option<DateTime<Utc>> {
        let millis = self.trigger().get("at")?.as_i64()?;
        Utc.timestamp_millis_opt(millis).single()
    }

    pub fn dict(&self) -> &Map<String, Value> {
        &self.dict
    }
}

fn coerce_int(value: &Value) -> Option<i32> {
    let number = match value {
        Value::Number(number) => match number.as_i64() {
            Some(int) => return i32::try_from(int).ok(),
            None => number.as_f64()?,
        },
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    let truncated = number.trunc();
    if !truncated.is_finite() || truncated < i32::MIN as f64 || truncated > i32::MAX as f64 {
        return None;
    }
    Some(truncated as i32)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
