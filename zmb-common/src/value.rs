use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A data point value: boolean (coils, discrete inputs) or numeric (registers).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    /// Boolean value.
    Bool(bool),

    /// Integer value.
    Integer(i64),

    /// Unsigned integer above `i64::MAX`.
    Unsigned(u64),

    /// Floating point value.
    Float(f64),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric view of the value; booleans are not coerced.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Unsigned(u) => Some(*u as f64),
            Value::Float(f) => Some(*f),
            Value::Bool(_) => None,
        }
    }

    /// False only for NaN and infinite floats, which JSON cannot carry.
    pub fn is_finite(&self) -> bool {
        match self {
            Value::Float(f) => f.is_finite(),
            _ => true,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::Unsigned(v),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Unsigned(u) => write!(f, "{}", u),
            Value::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Error returned when text is not a boolean or finite number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a boolean or a number")]
pub struct ParseValueError(pub String);

impl FromStr for Value {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "true" => return Ok(Value::Bool(true)),
            "false" => return Ok(Value::Bool(false)),
            _ => {}
        }

        if let Ok(i) = s.parse::<i64>() {
            return Ok(Value::Integer(i));
        }

        if let Ok(u) = s.parse::<u64>() {
            return Ok(Value::Unsigned(u));
        }

        match s.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Value::Float(v)),
            _ => Err(ParseValueError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_wire_values() {
        let values: Vec<Value> = serde_json::from_str("[true, 123, -7, 1.23]").unwrap();
        assert_eq!(
            values,
            vec![
                Value::Bool(true),
                Value::Integer(123),
                Value::Integer(-7),
                Value::Float(1.23)
            ]
        );
    }

    #[test]
    fn test_large_unsigned_keeps_precision() {
        let value: Value = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(value, Value::Unsigned(u64::MAX));
        assert_eq!(serde_json::to_string(&value).unwrap(), "18446744073709551615");

        let value: Value = serde_json::from_str("9223372036854775807").unwrap();
        assert_eq!(value, Value::Integer(i64::MAX));
        assert_eq!(Value::from(u64::MAX), Value::Unsigned(u64::MAX));
        assert_eq!(Value::from(7u64), Value::Integer(7));
    }

    #[test]
    fn test_serialize_keeps_integers_integral() {
        assert_eq!(serde_json::to_string(&Value::Integer(123)).unwrap(), "123");
        assert_eq!(serde_json::to_string(&Value::Bool(false)).unwrap(), "false");
    }

    #[test]
    fn test_reject_non_scalar() {
        assert!(serde_json::from_str::<Value>("\"on\"").is_err());
        assert!(serde_json::from_str::<Value>("null").is_err());
        assert!(serde_json::from_str::<Value>("[1]").is_err());
    }

    #[test]
    fn test_parse_from_text() {
        assert_eq!("true".parse::<Value>(), Ok(Value::Bool(true)));
        assert_eq!(" 42 ".parse::<Value>(), Ok(Value::Integer(42)));
        assert_eq!("0.5".parse::<Value>(), Ok(Value::Float(0.5)));
        assert_eq!(
            "18446744073709551615".parse::<Value>(),
            Ok(Value::Unsigned(u64::MAX))
        );
        assert!("NaN".parse::<Value>().is_err());
        assert!("on".parse::<Value>().is_err());
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Integer(3).as_f64(), Some(3.0));
        assert_eq!(Value::Bool(true).as_f64(), None);
        assert!(Value::Integer(1).is_finite());
        assert!(!Value::Float(f64::NAN).is_finite());
        assert!(!Value::Float(f64::INFINITY).is_finite());
    }
}
