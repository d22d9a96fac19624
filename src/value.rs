//! Scalar key values extracted from JSON foreign-key arrays.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A scalar foreign-key value.
///
/// Keys are read from JSON arrays on the parent record and compared against
/// the related model's owner-key attribute. Unlike `serde_json::Value` they
/// are hashable and totally ordered, so they can serve as dictionary keys
/// and be sorted into a deterministic query parameter list.
///
/// Equality is typed: `Key::Int(3)` does not equal `Key::String("3")`.
/// Integral JSON floats normalize to `Int` on construction, so `3.0` and `3`
/// compare equal; the `Float` variant only ever holds non-integral values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    /// Null value (the empty-batch sentinel).
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Non-integral float value.
    Float(f64),
    /// String value.
    String(String),
}

impl Key {
    /// Check if this is the null sentinel.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Convert a scalar JSON value into a key.
    ///
    /// Returns `None` for arrays, objects, and JSON null: composite values
    /// cannot act as foreign keys, and null elements are lookup misses.
    pub fn from_scalar(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Bool(b) => Some(Self::Bool(*b)),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self::Int(i))
                } else {
                    n.as_f64().map(Self::from_f64)
                }
            }
            JsonValue::String(s) => Some(Self::String(s.clone())),
            JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
        }
    }

    /// Build a key from a float, normalizing integral values to `Int`.
    pub fn from_f64(f: f64) -> Self {
        if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
            Self::Int(f as i64)
        } else {
            Self::Float(f)
        }
    }

    /// Convert back into a JSON value (for parameter binding).
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Int(i) => JsonValue::from(*i),
            Self::Float(f) => JsonValue::from(*f),
            Self::String(s) => JsonValue::from(s.as_str()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) | Self::Float(_) => 2,
            Self::String(_) => 3,
        }
    }

    fn as_f64(&self) -> f64 {
        match self {
            Self::Int(i) => *i as f64,
            Self::Float(f) => *f,
            _ => unreachable!("as_f64 is only called on numeric keys"),
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            // Floats are non-integral by construction, so bit equality is
            // exact equality here (NaN never round-trips from JSON).
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::String(a), Self::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Null => state.write_u8(0),
            Self::Bool(b) => {
                state.write_u8(1);
                b.hash(state);
            }
            Self::Int(i) => {
                state.write_u8(2);
                i.hash(state);
            }
            Self::Float(f) => {
                state.write_u8(3);
                f.to_bits().hash(state);
            }
            Self::String(s) => {
                state.write_u8(4);
                s.hash(state);
            }
        }
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            (Self::Int(_) | Self::Float(_), Self::Int(_) | Self::Float(_)) => {
                self.as_f64().total_cmp(&other.as_f64())
            }
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(v) => write!(f, "{}", v),
            Self::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for Key {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Key {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for Key {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Key {
    fn from(v: f64) -> Self {
        Self::from_f64(v)
    }
}

impl From<String> for Key {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Key {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<Key>> From<Option<T>> for Key {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}
