//! Serialization delegation helpers.
//!
//! Generated serializer glue never implements conversion logic of its own:
//! keyed types serialize as their key and deserialize through
//! [`KeyFactory`], so validation runs on every decode path. The helpers
//! here are the generic converters those one-line generated impls call.

use crate::error::ValidationError;
use crate::traits::{KeyFactory, Keyed};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error as ThisError;

// serde

/// Serialize a keyed type as its bare key.
pub fn serialize_keyed<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Keyed,
    T::Key: Serialize,
    S: Serializer,
{
    value.key().serialize(serializer)
}

/// Deserialize a key and rebuild the keyed type through its factory.
pub fn deserialize_keyed<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: KeyFactory,
    T::Key: Deserialize<'de>,
    D: Deserializer<'de>,
{
    let key = <T::Key as Deserialize<'de>>::deserialize(deserializer)?;

    T::try_from_key(key).map_err(D::Error::custom)
}

///
/// StorableError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("storable decode failed: {message}")]
pub struct StorableError {
    pub message: String,
}

impl StorableError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<ValidationError> for StorableError {
    fn from(err: ValidationError) -> Self {
        Self::new(err.to_string())
    }
}

///
/// Storable
///
/// Minimal byte codec for key values held in stable storage. Integers are
/// little-endian fixed width, strings are raw UTF-8.
///

pub trait Storable: Sized {
    fn to_bytes(&self) -> Vec<u8>;

    fn try_from_bytes(bytes: &[u8]) -> Result<Self, StorableError>;
}

macro_rules! storable_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Storable for $ty {
                fn to_bytes(&self) -> Vec<u8> {
                    self.to_le_bytes().to_vec()
                }

                fn try_from_bytes(bytes: &[u8]) -> Result<Self, StorableError> {
                    let array = bytes.try_into().map_err(|_| {
                        StorableError::new(format!(
                            "expected {} bytes for {}, got {}",
                            size_of::<$ty>(),
                            stringify!($ty),
                            bytes.len(),
                        ))
                    })?;

                    Ok(<$ty>::from_le_bytes(array))
                }
            }
        )*
    };
}

storable_int!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128, f32, f64);

impl Storable for bool {
    fn to_bytes(&self) -> Vec<u8> {
        vec![u8::from(*self)]
    }

    fn try_from_bytes(bytes: &[u8]) -> Result<Self, StorableError> {
        match bytes {
            [0] => Ok(false),
            [1] => Ok(true),
            _ => Err(StorableError::new("expected a single 0/1 byte for bool")),
        }
    }
}

impl Storable for char {
    fn to_bytes(&self) -> Vec<u8> {
        u32::from(*self).to_le_bytes().to_vec()
    }

    fn try_from_bytes(bytes: &[u8]) -> Result<Self, StorableError> {
        let scalar = u32::try_from_bytes(bytes)?;

        Self::from_u32(scalar).ok_or_else(|| StorableError::new("invalid char scalar value"))
    }
}

impl Storable for String {
    fn to_bytes(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    fn try_from_bytes(bytes: &[u8]) -> Result<Self, StorableError> {
        Self::from_utf8(bytes.to_vec()).map_err(|err| StorableError::new(err.to_string()))
    }
}

/// Encode a keyed type as its key's byte form.
pub fn store_keyed<T>(value: &T) -> Vec<u8>
where
    T: Keyed,
    T::Key: Storable,
{
    value.key().to_bytes()
}

/// Decode a key and rebuild the keyed type through its factory.
pub fn restore_keyed<T>(bytes: &[u8]) -> Result<T, StorableError>
where
    T: KeyFactory,
    T::Key: Storable,
{
    let key = <T::Key as Storable>::try_from_bytes(bytes)?;

    Ok(T::try_from_key(key)?)
}

// Length-prefixed framing for member-wise codecs of complex value objects.

/// Append one length-prefixed field to `out`.
pub fn write_field(out: &mut Vec<u8>, bytes: &[u8]) {
    let len = u32::try_from(bytes.len()).expect("field exceeds u32::MAX bytes");
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(bytes);
}

///
/// FieldReader
///
/// Sequential reader over length-prefixed fields written by `write_field`.
///

#[derive(Debug)]
pub struct FieldReader<'a> {
    bytes: &'a [u8],
}

impl<'a> FieldReader<'a> {
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// The next field's payload.
    pub fn next_field(&mut self) -> Result<&'a [u8], StorableError> {
        let (prefix, rest) = self
            .bytes
            .split_at_checked(4)
            .ok_or_else(|| StorableError::new("truncated field length prefix"))?;

        let len = u32::from_le_bytes(prefix.try_into().expect("prefix is four bytes")) as usize;
        let (field, rest) = rest
            .split_at_checked(len)
            .ok_or_else(|| StorableError::new("truncated field payload"))?;

        self.bytes = rest;
        Ok(field)
    }

    /// Assert that every field has been consumed.
    pub fn finish(&self) -> Result<(), StorableError> {
        if self.bytes.is_empty() {
            Ok(())
        } else {
            Err(StorableError::new(format!(
                "{} trailing bytes after the last field",
                self.bytes.len()
            )))
        }
    }
}

// candid

/// Serialize a keyed type onto the IDL wire as its bare key.
#[cfg(feature = "candid")]
pub fn idl_serialize_keyed<T, S>(value: &T, serializer: S) -> Result<(), S::Error>
where
    T: Keyed,
    T::Key: candid::CandidType,
    S: candid::types::Serializer,
{
    value.key().idl_serialize(serializer)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_round_trip() {
        let bytes = 0xDEAD_BEEF_u32.to_bytes();
        assert_eq!(u32::try_from_bytes(&bytes).unwrap(), 0xDEAD_BEEF);
    }

    #[test]
    fn short_buffer_is_rejected() {
        let err = u64::try_from_bytes(&[1, 2, 3]).unwrap_err();
        assert!(err.to_string().contains("8 bytes"));
    }

    #[test]
    fn string_round_trip() {
        let bytes = "grün".to_string().to_bytes();
        assert_eq!(String::try_from_bytes(&bytes).unwrap(), "grün");
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert!(String::try_from_bytes(&[0xFF, 0xFE]).is_err());
    }

    #[test]
    fn field_framing_round_trips() {
        let mut out = Vec::new();
        write_field(&mut out, &7_u32.to_bytes());
        write_field(&mut out, &"eur".to_string().to_bytes());

        let mut reader = FieldReader::new(&out);
        assert_eq!(u32::try_from_bytes(reader.next_field().unwrap()).unwrap(), 7);
        assert_eq!(
            String::try_from_bytes(reader.next_field().unwrap()).unwrap(),
            "eur"
        );
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn truncated_frames_are_rejected() {
        let mut out = Vec::new();
        write_field(&mut out, &7_u32.to_bytes());
        out.truncate(out.len() - 1);

        let mut reader = FieldReader::new(&out);
        assert!(reader.next_field().is_err());
    }
}
