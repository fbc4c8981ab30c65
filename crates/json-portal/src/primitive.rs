//! Atomic portals over single primitive values.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Number, Value};

use crate::data::truncate_to_i64;
use crate::error::{PortalError, PortalResult};
use crate::portal::Portal;

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("uuid regex")
});

#[derive(Debug, Clone, Copy, Default)]
pub struct StrPortal;

#[derive(Debug, Clone, Copy, Default)]
pub struct BoolPortal;

#[derive(Debug, Clone, Copy, Default)]
pub struct IntPortal;

#[derive(Debug, Clone, Copy, Default)]
pub struct FloatPortal;

#[derive(Debug, Clone, Copy, Default)]
pub struct RawPortal;

#[derive(Debug, Clone, Copy, Default)]
pub struct NothingPortal;

#[derive(Debug, Clone, Copy, Default)]
pub struct UuidPortal;

pub fn string() -> StrPortal {
    StrPortal
}

pub fn boolean() -> BoolPortal {
    BoolPortal
}

/// Numbers truncated toward zero. Values outside the `i64` range fail.
pub fn int() -> IntPortal {
    IntPortal
}

pub fn float() -> FloatPortal {
    FloatPortal
}

/// Identity in both directions. Never fails.
pub fn raw() -> RawPortal {
    RawPortal
}

/// Occupies a slot without carrying data: reads `()`, writes `""`.
pub fn nothing() -> NothingPortal {
    NothingPortal
}

/// Canonical 8-4-4-4-12 text, version 1 to 5, RFC 4122 variant.
pub fn uuid() -> UuidPortal {
    UuidPortal
}

impl Portal for StrPortal {
    type Value = String;

    fn read(&self, input: &Value) -> PortalResult<String> {
        match input {
            Value::String(s) => Ok(s.clone()),
            other => Err(PortalError::new(other.clone(), self.description())),
        }
    }

    fn write(&self, value: &String) -> PortalResult<Value> {
        Ok(Value::String(value.clone()))
    }

    fn description(&self) -> String {
        "str".into()
    }
}

impl Portal for BoolPortal {
    type Value = bool;

    fn read(&self, input: &Value) -> PortalResult<bool> {
        input
            .as_bool()
            .ok_or_else(|| PortalError::new(input.clone(), self.description()))
    }

    fn write(&self, value: &bool) -> PortalResult<Value> {
        Ok(Value::Bool(*value))
    }

    fn description(&self) -> String {
        "bool".into()
    }
}

/// Numeric reading shared by `int` and `float`: JSON numbers and strings that
/// parse completely as a decimal number. Anything else, and non-finite
/// results, count as not-a-number.
pub(crate) fn parse_number(input: &Value) -> Option<f64> {
    let parsed = match input {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

impl Portal for IntPortal {
    type Value = i64;

    fn read(&self, input: &Value) -> PortalResult<i64> {
        if let Some(i) = input.as_i64() {
            return Ok(i);
        }
        parse_number(input)
            .and_then(truncate_to_i64)
            .ok_or_else(|| PortalError::new(input.clone(), self.description()))
    }

    fn write(&self, value: &i64) -> PortalResult<Value> {
        Ok(Value::from(*value))
    }

    fn description(&self) -> String {
        "int".into()
    }
}

impl Portal for FloatPortal {
    type Value = f64;

    fn read(&self, input: &Value) -> PortalResult<f64> {
        parse_number(input).ok_or_else(|| PortalError::new(input.clone(), self.description()))
    }

    fn write(&self, value: &f64) -> PortalResult<Value> {
        Number::from_f64(*value)
            .map(Value::Number)
            .ok_or_else(|| PortalError::new(Value::Null, self.description()))
    }

    fn description(&self) -> String {
        "float".into()
    }
}

impl Portal for RawPortal {
    type Value = Value;

    fn read(&self, input: &Value) -> PortalResult<Value> {
        Ok(input.clone())
    }

    fn write(&self, value: &Value) -> PortalResult<Value> {
        Ok(value.clone())
    }

    fn description(&self) -> String {
        "raw".into()
    }
}

impl Portal for NothingPortal {
    type Value = ();

    fn read(&self, _: &Value) -> PortalResult<()> {
        Ok(())
    }

    fn write(&self, _: &()) -> PortalResult<Value> {
        Ok(Value::String(String::new()))
    }

    fn description(&self) -> String {
        "nothing".into()
    }
}

impl UuidPortal {
    fn check(&self, candidate: &Value) -> PortalResult<String> {
        match candidate {
            Value::String(s) if UUID_RE.is_match(s) => Ok(s.clone()),
            other => Err(PortalError::new(other.clone(), self.description())),
        }
    }
}

impl Portal for UuidPortal {
    type Value = String;

    fn read(&self, input: &Value) -> PortalResult<String> {
        self.check(input)
    }

    fn write(&self, value: &String) -> PortalResult<Value> {
        self.check(&Value::String(value.clone())).map(Value::String)
    }

    fn description(&self) -> String {
        "uuid".into()
    }
}
