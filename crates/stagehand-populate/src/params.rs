use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use crate::errors::PopulateError;

/// Accepted value shape for one sampler parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Int,
    Float,
    String,
    /// `YYYY-MM-DD` string.
    Date,
    /// Epoch seconds or an RFC 3339 string.
    Timestamp,
}

/// Declares one parameter a sampler accepts.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub key: &'static str,
    pub kind: ParamKind,
    pub required: bool,
}

impl ParamSpec {
    pub const fn new(key: &'static str, kind: ParamKind, required: bool) -> Self {
        Self {
            key,
            kind,
            required,
        }
    }
}

/// Validated sampler parameters.
#[derive(Debug, Clone, Default)]
pub struct ParamMap {
    values: BTreeMap<String, Value>,
}

impl ParamMap {
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(Value::as_i64)
    }

    pub fn get_u32(&self, key: &str) -> Option<u32> {
        self.get_i64(key).and_then(|value| u32::try_from(value).ok())
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.values.get(key).and_then(Value::as_f64)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn get_date(&self, key: &str) -> Option<NaiveDate> {
        self.values.get(key).and_then(parse_date_value)
    }

    pub fn get_timestamp(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(parse_timestamp_value)
    }
}

/// Checks raw params against a sampler's spec table.
///
/// Unknown keys, missing required keys, and kind mismatches are recipe
/// errors so that typos surface instead of silently falling back.
pub fn validate_params(
    params: Option<&Value>,
    specs: &[ParamSpec],
    sampler_id: &str,
) -> Result<ParamMap, PopulateError> {
    let Some(params) = params else {
        for spec in specs {
            if spec.required {
                return Err(PopulateError::InvalidRecipe(format!(
                    "sampler '{sampler_id}' requires param '{}'",
                    spec.key
                )));
            }
        }
        return Ok(ParamMap::default());
    };

    let Some(object) = params.as_object() else {
        return Err(PopulateError::InvalidRecipe(format!(
            "sampler '{sampler_id}' params must be an object"
        )));
    };

    for key in object.keys() {
        if !specs.iter().any(|spec| spec.key == key) {
            return Err(PopulateError::InvalidRecipe(format!(
                "sampler '{sampler_id}' does not accept param '{key}'"
            )));
        }
    }

    let mut values = BTreeMap::new();
    for spec in specs {
        match object.get(spec.key) {
            Some(value) => {
                if !kind_matches(spec.kind, value) {
                    return Err(PopulateError::InvalidRecipe(format!(
                        "sampler '{sampler_id}' param '{}' has the wrong type",
                        spec.key
                    )));
                }
                values.insert(spec.key.to_string(), value.clone());
            }
            None if spec.required => {
                return Err(PopulateError::InvalidRecipe(format!(
                    "sampler '{sampler_id}' requires param '{}'",
                    spec.key
                )));
            }
            None => {}
        }
    }

    Ok(ParamMap { values })
}

fn kind_matches(kind: ParamKind, value: &Value) -> bool {
    match kind {
        ParamKind::Int => value.is_i64() || value.is_u64(),
        ParamKind::Float => value.is_number(),
        ParamKind::String => value.is_string(),
        ParamKind::Date => parse_date_value(value).is_some(),
        ParamKind::Timestamp => parse_timestamp_value(value).is_some(),
    }
}

pub fn parse_date_value(value: &Value) -> Option<NaiveDate> {
    let raw = value.as_str()?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

pub fn parse_timestamp_value(value: &Value) -> Option<i64> {
    if let Some(raw) = value.as_i64() {
        return Some(raw);
    }
    let raw = value.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.timestamp())
        .ok()
}
