use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A value the API may send as `null`.
///
/// Unlike a missing field, `null` is an explicit wire value; a present zero
/// stays distinguishable from an absent one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Nullable<T>(Option<T>);

impl<T> Nullable<T> {
    pub const fn null() -> Self {
        Self(None)
    }

    pub const fn new(value: T) -> Self {
        Self(Some(value))
    }

    pub const fn is_null(&self) -> bool {
        self.0.is_none()
    }

    pub const fn value(&self) -> Option<&T> {
        self.0.as_ref()
    }

    pub fn into_option(self) -> Option<T> {
        self.0
    }
}

impl<T: Default> Nullable<T> {
    /// The value, or the type's zero value when null.
    pub fn or_default(self) -> T {
        self.0.unwrap_or_default()
    }
}

impl<T> Default for Nullable<T> {
    fn default() -> Self {
        Self(None)
    }
}

impl<T> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        Self(value)
    }
}

impl<T> From<Nullable<T>> for Option<T> {
    fn from(value: Nullable<T>) -> Self {
        value.0
    }
}

impl<T: fmt::Display> fmt::Display for Nullable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(v) => fmt::Display::fmt(v, f),
            None => f.write_str("null"),
        }
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.0 {
            Some(v) => serializer.serialize_some(v),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Nullable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_display_uses_format_spec() {
        let a = Nullable::new(1.333_333_333_33_f64);
        assert_eq!(format!("{a:.2}"), "1.33");
        let b: Nullable<f64> = Nullable::null();
        assert_eq!(format!("{b:.2}"), "null");
    }

    #[test]
    fn test_null_round_trip() {
        let n: Nullable<u32> = serde_json::from_value(Value::Null).unwrap();
        assert!(n.is_null());
        assert_eq!(serde_json::to_value(&n).unwrap(), Value::Null);
    }

    #[test]
    fn test_value_round_trip() {
        for v in [json!(0), json!(17), json!("zero"), json!([1, 2]), json!({"a": null})] {
            let n: Nullable<Value> = serde_json::from_value(v.clone()).unwrap();
            assert!(!n.is_null());
            assert_eq!(serde_json::to_value(&n).unwrap(), v);
        }
    }

    #[test]
    fn test_present_zero_is_not_null() {
        let n: Nullable<i32> = serde_json::from_str("0").unwrap();
        assert_eq!(n.value(), Some(&0));
        assert_eq!(n.or_default(), 0);
    }

    #[test]
    fn test_missing_field_defaults_to_null() {
        #[derive(Deserialize)]
        struct S {
            #[serde(default)]
            x: Nullable<i32>,
        }
        let s: S = serde_json::from_str("{}").unwrap();
        assert!(s.x.is_null());
    }
}
