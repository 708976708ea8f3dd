//! The decoded value model.

use crate::error::CborError;

/// A decoded (or to-be-encoded) CBOR item.
///
/// Map keys are always represented as `String` — CBOR permits arbitrary
/// key types, but every payload this crate handles uses text-string keys,
/// so non-text keys (small integers) are coerced to their decimal string
/// form on decode and anything else is rejected (see [`CborError::UnsupportedKeyType`]).
/// [`CborValue::Map`] is a `Vec` of pairs, not a hash map, so insertion
/// order survives decode -> encode round trips exactly.
#[derive(Debug, Clone, PartialEq)]
pub enum CborValue {
    /// Major type 0: an unsigned integer.
    Uint(u64),
    /// Major type 1: a negative integer, already resolved to its signed
    /// value (`-1 - argument`).
    NegInt(i128),
    /// Major type 2: a byte string.
    Bytes(Vec<u8>),
    /// Major type 3: a UTF-8 text string.
    Text(String),
    /// Major type 4: an array.
    Array(Vec<CborValue>),
    /// Major type 5: a map, in encounter/insertion order.
    Map(Vec<(String, CborValue)>),
    /// Major type 7, simple value 20 or 21.
    Bool(bool),
    /// Major type 7, simple value 22.
    Null,
    /// Major type 7, additional info 26 (f32) or 27 (f64). Always stored
    /// widened to `f64`.
    Float(f64),
}

impl CborValue {
    /// View this value as an unsigned integer, if it is one.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Uint(v) => Some(*v),
            _ => None,
        }
    }

    /// View this value as a byte string, if it is one.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// View this value as a text string, if it is one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// View this value as an array, if it is one.
    pub fn as_array(&self) -> Option<&[CborValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// View this value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Look up a key in this value if it is a map, returning `None` both
    /// when the value isn't a map and when the key is absent.
    pub fn get(&self, key: &str) -> Option<&CborValue> {
        match self {
            Self::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Look up a required field in a map, returning [`CborError::MissingField`]
    /// if absent or this value is not a map.
    pub fn require(&self, field: &'static str) -> Result<&CborValue, CborError> {
        self.get(field).ok_or(CborError::MissingField(field))
    }

    /// Require a field and coerce it to a byte string of exactly `len` bytes.
    pub fn require_bytes(&self, field: &'static str, len: usize) -> Result<&[u8], CborError> {
        let bytes = self.require(field)?.as_bytes().ok_or(CborError::WrongFieldType(field))?;
        if bytes.len() != len {
            return Err(CborError::WrongFieldType(field));
        }
        Ok(bytes)
    }

    /// Require a field and coerce it to `u64`.
    pub fn require_u64(&self, field: &'static str) -> Result<u64, CborError> {
        self.require(field)?.as_u64().ok_or(CborError::WrongFieldType(field))
    }

    /// Require a field and coerce it to text.
    pub fn require_text(&self, field: &'static str) -> Result<&str, CborError> {
        self.require(field)?.as_text().ok_or(CborError::WrongFieldType(field))
    }
}

pub(crate) fn coerce_key(value: &CborValue) -> Result<String, CborError> {
    match value {
        CborValue::Text(s) => Ok(s.clone()),
        CborValue::Uint(v) => Ok(v.to_string()),
        CborValue::NegInt(v) => Ok(v.to_string()),
        _ => Err(CborError::UnsupportedKeyType),
    }
}
