use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// UnknownKeyError
///
/// Returned by generated `get` on an always-valid smart enum when no item
/// carries the requested key.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("`{type_name}` has no item with key `{key}`")]
pub struct UnknownKeyError {
    pub type_name: &'static str,
    pub key: String,
}

impl UnknownKeyError {
    #[must_use]
    pub fn new(type_name: &'static str, key: impl Into<String>) -> Self {
        Self {
            type_name,
            key: key.into(),
        }
    }
}

///
/// DuplicateItemError
///
/// Raised while the generated item lookup is being built when two items
/// resolve to the same key under the enum's key comparer.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("duplicate item key `{key}` on `{type_name}`")]
pub struct DuplicateItemError {
    pub type_name: &'static str,
    pub key: String,
}

impl DuplicateItemError {
    #[must_use]
    pub fn new(type_name: &'static str, key: impl Into<String>) -> Self {
        Self {
            type_name,
            key: key.into(),
        }
    }
}

///
/// ValidationError
///
/// Returned by generated factory methods (`try_create`, `try_from_key`,
/// parse and deserialize glue) when a candidate key is rejected.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("validation of `{type_name}` failed: {message}")]
pub struct ValidationError {
    pub type_name: &'static str,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(type_name: &'static str, message: impl Into<String>) -> Self {
        Self {
            type_name,
            message: message.into(),
        }
    }
}

impl From<UnknownKeyError> for ValidationError {
    fn from(err: UnknownKeyError) -> Self {
        Self::new(err.type_name, err.to_string())
    }
}
