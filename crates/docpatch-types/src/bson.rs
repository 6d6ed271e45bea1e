//! Binary (BSON) encoding of patch documents.
//!
//! BSON is little-endian throughout. A document is a 4-byte total length,
//! a sequence of `type byte, cstring key, payload` elements, and a trailing
//! NUL. Arrays are documents keyed by decimal indices.

use crate::error::EncodeError;
use crate::value::{Document, Value};

const TYPE_DOUBLE: u8 = 0x01;
const TYPE_STRING: u8 = 0x02;
const TYPE_DOCUMENT: u8 = 0x03;
const TYPE_ARRAY: u8 = 0x04;
const TYPE_BOOL: u8 = 0x08;
const TYPE_DATETIME: u8 = 0x09;
const TYPE_NULL: u8 = 0x0a;
const TYPE_INT32: u8 = 0x10;
const TYPE_INT64: u8 = 0x12;

/// Encode a document to BSON bytes.
pub fn encode_document(doc: &Document) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    write_document(&mut buf, doc.iter())?;
    Ok(buf)
}

fn write_document<'a, I>(buf: &mut Vec<u8>, entries: I) -> Result<(), EncodeError>
where
    I: Iterator<Item = (&'a str, &'a Value)>,
{
    let start = buf.len();
    buf.extend_from_slice(&[0u8; 4]);
    for (key, value) in entries {
        write_element(buf, key, value)?;
    }
    buf.push(0);

    let size = buf.len() - start;
    let size_i32 = i32::try_from(size).map_err(|_| EncodeError::DocumentTooLarge(size))?;
    buf[start..start + 4].copy_from_slice(&size_i32.to_le_bytes());
    Ok(())
}

fn write_element(buf: &mut Vec<u8>, key: &str, value: &Value) -> Result<(), EncodeError> {
    match value {
        Value::Null => {
            buf.push(TYPE_NULL);
            write_cstring(buf, key)?;
        }
        Value::Bool(b) => {
            buf.push(TYPE_BOOL);
            write_cstring(buf, key)?;
            buf.push(u8::from(*b));
        }
        Value::Int(i) => match i32::try_from(*i) {
            Ok(small) => {
                buf.push(TYPE_INT32);
                write_cstring(buf, key)?;
                buf.extend_from_slice(&small.to_le_bytes());
            }
            Err(_) => {
                buf.push(TYPE_INT64);
                write_cstring(buf, key)?;
                buf.extend_from_slice(&i.to_le_bytes());
            }
        },
        Value::Float(f) => {
            buf.push(TYPE_DOUBLE);
            write_cstring(buf, key)?;
            buf.extend_from_slice(&f.to_le_bytes());
        }
        Value::String(s) => {
            buf.push(TYPE_STRING);
            write_cstring(buf, key)?;
            write_string(buf, s)?;
        }
        Value::DateTime(t) => {
            buf.push(TYPE_DATETIME);
            write_cstring(buf, key)?;
            buf.extend_from_slice(&t.timestamp_millis().to_le_bytes());
        }
        Value::Array(items) => {
            buf.push(TYPE_ARRAY);
            write_cstring(buf, key)?;
            let keys: Vec<String> = (0..items.len()).map(|i| i.to_string()).collect();
            write_document(buf, keys.iter().map(String::as_str).zip(items.iter()))?;
        }
        Value::Document(doc) => {
            buf.push(TYPE_DOCUMENT);
            write_cstring(buf, key)?;
            write_document(buf, doc.iter())?;
        }
    }
    Ok(())
}

/// Keys are NUL-terminated, so an interior NUL would truncate them.
fn write_cstring(buf: &mut Vec<u8>, s: &str) -> Result<(), EncodeError> {
    if s.as_bytes().contains(&0) {
        return Err(EncodeError::InvalidKey(s.to_string()));
    }
    buf.extend_from_slice(s.as_bytes());
    buf.push(0);
    Ok(())
}

/// Length-prefixed string: i32 (byte count + 1), UTF-8 bytes, NUL.
fn write_string(buf: &mut Vec<u8>, s: &str) -> Result<(), EncodeError> {
    let len = s.len() + 1;
    let len_i32 = i32::try_from(len).map_err(|_| EncodeError::DocumentTooLarge(len))?;
    buf.extend_from_slice(&len_i32.to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
    buf.push(0);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn empty_document() {
        let bytes = encode_document(&Document::new()).unwrap();
        assert_eq!(bytes, vec![5, 0, 0, 0, 0]);
    }

    #[test]
    fn int32_element() {
        let doc = Document::new().with("a", 1);
        let bytes = encode_document(&doc).unwrap();
        assert_eq!(
            bytes,
            vec![12, 0, 0, 0, 0x10, b'a', 0, 1, 0, 0, 0, 0]
        );
    }

    #[test]
    fn wide_int_uses_int64() {
        let doc = Document::new().with("n", i64::MAX);
        let bytes = encode_document(&doc).unwrap();
        assert_eq!(bytes[4], 0x12);
        assert_eq!(bytes.len(), 4 + 1 + 2 + 8 + 1);
    }

    #[test]
    fn string_element() {
        let doc = Document::new().with("s", "hi");
        let bytes = encode_document(&doc).unwrap();
        assert_eq!(
            bytes,
            vec![15, 0, 0, 0, 0x02, b's', 0, 3, 0, 0, 0, b'h', b'i', 0, 0]
        );
    }

    #[test]
    fn array_is_index_keyed_document() {
        let doc = Document::new().with("xs", vec![true, false]);
        let bytes = encode_document(&doc).unwrap();
        // outer header, type, "xs\0", inner doc (4 + 2*(1+2+1) + 1 = 13), outer NUL
        assert_eq!(bytes.len(), 4 + 1 + 3 + 13 + 1);
        assert_eq!(bytes[4], 0x04);
        assert_eq!(&bytes[8..12], &13i32.to_le_bytes());
        assert_eq!(&bytes[12..16], &[0x08, b'0', 0, 1]);
    }

    #[test]
    fn datetime_is_millis() {
        let t = Utc.timestamp_millis_opt(1_500).unwrap();
        let doc = Document::new().with("t", t);
        let bytes = encode_document(&doc).unwrap();
        assert_eq!(bytes[4], 0x09);
        assert_eq!(&bytes[7..15], &1_500i64.to_le_bytes());
    }

    #[test]
    fn nested_document_length_is_patched() {
        let inner = Document::new().with("x", Value::Null);
        let doc = Document::new().with("$set", inner);
        let bytes = encode_document(&doc).unwrap();
        let total = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        assert_eq!(total, bytes.len());
    }

    #[test]
    fn nul_in_key_is_rejected() {
        let doc = Document::new().with("a\0b", 1);
        assert_eq!(
            encode_document(&doc),
            Err(EncodeError::InvalidKey("a\0b".into()))
        );
    }
}
