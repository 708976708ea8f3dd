//! Decoder for the supported CBOR subset.

use crate::{error::CborError, value::coerce_key, value::CborValue};

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn read_u8(&mut self) -> Result<u8, CborError> {
        let byte = *self.bytes.get(self.pos).ok_or(CborError::Truncated)?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], CborError> {
        let end = self.pos.checked_add(len).ok_or(CborError::Truncated)?;
        let slice = self.bytes.get(self.pos..end).ok_or(CborError::Truncated)?;
        self.pos = end;
        Ok(slice)
    }
}

/// Decode a single top-level CBOR item from `bytes`.
///
/// Fails with [`CborError::TrailingBytes`] if anything follows the item.
pub fn decode(bytes: &[u8]) -> Result<CborValue, CborError> {
    let mut cursor = Cursor::new(bytes);
    let value = parse_item(&mut cursor)?;
    if cursor.pos != cursor.bytes.len() {
        return Err(CborError::TrailingBytes(cursor.bytes.len() - cursor.pos));
    }
    Ok(value)
}

/// Read the argument (length/value) for the given additional-info nibble.
/// Additional info 28-30 are reserved, and 31 signals an indefinite-length
/// item — neither is supported by this subset.
fn read_argument(cursor: &mut Cursor<'_>, info: u8) -> Result<u64, CborError> {
    match info {
        0..=23 => Ok(u64::from(info)),
        24 => Ok(u64::from(cursor.read_u8()?)),
        25 => {
            let bytes = cursor.read_bytes(2)?;
            Ok(u64::from(u16::from_be_bytes([bytes[0], bytes[1]])))
        },
        26 => {
            let bytes = cursor.read_bytes(4)?;
            Ok(u64::from(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])))
        },
        27 => {
            let bytes = cursor.read_bytes(8)?;
            let mut array = [0u8; 8];
            array.copy_from_slice(bytes);
            Ok(u64::from_be_bytes(array))
        },
        31 => Err(CborError::IndefiniteLength),
        _ => Err(CborError::UnsupportedItem { major: 0xFF, info }),
    }
}

fn parse_item(cursor: &mut Cursor<'_>) -> Result<CborValue, CborError> {
    let initial = cursor.read_u8()?;
    let major = initial >> 5;
    let info = initial & 0x1F;

    match major {
        0 => {
            let value = read_argument(cursor, info)?;
            Ok(CborValue::Uint(value))
        },
        1 => {
            let argument = read_argument(cursor, info)?;
            Ok(CborValue::NegInt(-1 - i128::from(argument)))
        },
        2 => {
            let len = read_argument(cursor, info)? as usize;
            let bytes = cursor.read_bytes(len)?;
            Ok(CborValue::Bytes(bytes.to_vec()))
        },
        3 => {
            let len = read_argument(cursor, info)? as usize;
            let bytes = cursor.read_bytes(len)?;
            let text = std::str::from_utf8(bytes).map_err(|_| CborError::InvalidUtf8)?;
            Ok(CborValue::Text(text.to_string()))
        },
        4 => {
            let count = read_argument(cursor, info)?;
            let mut items = Vec::with_capacity(count.min(4096) as usize);
            for _ in 0..count {
                items.push(parse_item(cursor)?);
            }
            Ok(CborValue::Array(items))
        },
        5 => {
            let count = read_argument(cursor, info)?;
            let mut entries = Vec::with_capacity(count.min(4096) as usize);
            for _ in 0..count {
                let key = parse_item(cursor)?;
                let value = parse_item(cursor)?;
                entries.push((coerce_key(&key)?, value));
            }
            Ok(CborValue::Map(entries))
        },
        6 => Err(CborError::TaggedItemUnsupported),
        7 => parse_simple_or_float(cursor, info),
        _ => unreachable!("major type is a 3-bit field, 0..=7"),
    }
}

fn parse_simple_or_float(cursor: &mut Cursor<'_>, info: u8) -> Result<CborValue, CborError> {
    match info {
        20 => Ok(CborValue::Bool(false)),
        21 => Ok(CborValue::Bool(true)),
        22 => Ok(CborValue::Null),
        26 => {
            let bytes = cursor.read_bytes(4)?;
            let mut array = [0u8; 4];
            array.copy_from_slice(bytes);
            Ok(CborValue::Float(f64::from(f32::from_be_bytes(array))))
        },
        27 => {
            let bytes = cursor.read_bytes(8)?;
            let mut array = [0u8; 8];
            array.copy_from_slice(bytes);
            Ok(CborValue::Float(f64::from_be_bytes(array)))
        },
        31 => Err(CborError::IndefiniteLength),
        _ => Err(CborError::UnsupportedItem { major: 7, info }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode;

    #[test]
    fn decodes_small_uint() {
        assert_eq!(decode(&[0x05]).unwrap(), CborValue::Uint(5));
    }

    #[test]
    fn decodes_uint_with_1_byte_argument() {
        assert_eq!(decode(&[0x18, 0xFF]).unwrap(), CborValue::Uint(255));
    }

    #[test]
    fn decodes_negative_int() {
        // major 1, value 9 => -10
        assert_eq!(decode(&[0x29]).unwrap(), CborValue::NegInt(-10));
    }

    #[test]
    fn decodes_byte_string() {
        assert_eq!(decode(&[0x43, 1, 2, 3]).unwrap(), CborValue::Bytes(vec![1, 2, 3]));
    }

    #[test]
    fn decodes_text_string() {
        assert_eq!(decode(&[0x63, b'f', b'o', b'o']).unwrap(), CborValue::Text("foo".into()));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let bytes = [0x61, 0xFF];
        assert!(matches!(decode(&bytes), Err(CborError::InvalidUtf8)));
    }

    #[test]
    fn decodes_array() {
        let value = decode(&[0x82, 0x01, 0x02]).unwrap();
        assert_eq!(value, CborValue::Array(vec![CborValue::Uint(1), CborValue::Uint(2)]));
    }

    #[test]
    fn decodes_map_preserving_order() {
        let bytes = encode(&CborValue::Map(vec![
            ("b".into(), CborValue::Uint(1)),
            ("a".into(), CborValue::Uint(2)),
        ]));
        let CborValue::Map(entries) = decode(&bytes).unwrap() else { panic!("expected map") };
        assert_eq!(entries[0].0, "b");
        assert_eq!(entries[1].0, "a");
    }

    #[test]
    fn coerces_integer_map_keys_to_strings() {
        // map{1: true} -> {0xa1, 0x01, 0xf5}
        let value = decode(&[0xA1, 0x01, 0xF5]).unwrap();
        assert_eq!(value.get("1"), Some(&CborValue::Bool(true)));
    }

    #[test]
    fn rejects_indefinite_length() {
        assert!(matches!(decode(&[0x5F]), Err(CborError::IndefiniteLength)));
    }

    #[test]
    fn rejects_tagged_item() {
        assert!(matches!(decode(&[0xC0, 0x00]), Err(CborError::TaggedItemUnsupported)));
    }

    #[test]
    fn rejects_trailing_bytes() {
        assert!(matches!(decode(&[0x01, 0x02]), Err(CborError::TrailingBytes(1))));
    }

    #[test]
    fn decodes_bool_and_null() {
        assert_eq!(decode(&[0xF4]).unwrap(), CborValue::Bool(false));
        assert_eq!(decode(&[0xF5]).unwrap(), CborValue::Bool(true));
        assert_eq!(decode(&[0xF6]).unwrap(), CborValue::Null);
    }

    #[test]
    fn decodes_f64() {
        let bytes = encode(&CborValue::Float(1.5));
        assert_eq!(decode(&bytes).unwrap(), CborValue::Float(1.5));
    }

    #[test]
    fn truncated_input_fails() {
        assert!(matches!(decode(&[0x18]), Err(CborError::Truncated)));
    }
}
