//! Generic wrapper types used by generated bindings.

mod bitmask;
mod envelope;
mod hash;
mod int64;
mod nullable;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use bitmask::{BitmaskSet, BitmaskValue};
pub use envelope::{ERROR_CODE_NONE, ERROR_CODE_SUCCESS, Envelope};
pub use hash::{Definition, DefinitionSource, HashRef};
pub use int64::Int64;
pub use nullable::Nullable;

/// Untyped JSON object, for schemas that declare no properties.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// An ISO-8601 date-time string, kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub String);

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Joins array parameter values with commas, as query strings expect.
pub fn join_array<T: fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_array() {
        assert_eq!(join_array(&[100, 200, 205]), "100,200,205");
        assert_eq!(join_array::<u32>(&[]), "");
        assert_eq!(join_array(&[Int64(-3)]), "-3");
    }
}
