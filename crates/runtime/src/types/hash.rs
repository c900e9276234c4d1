//! Typed foreign keys into definition tables.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;

use crate::error::DefinitionError;

/// A record type stored in a named definition table.
pub trait Definition: DeserializeOwned {
    /// Table name as listed in the content manifest.
    const TABLE: &'static str;
}

/// Anything that can look up a raw definition record by table and hash.
#[async_trait]
pub trait DefinitionSource: Send + Sync {
    async fn definition(&self, table: &str, hash: u32) -> Result<Box<RawValue>, DefinitionError>;
}

/// A 32-bit hash identifying one record of table `T`.
///
/// The wrapper carries no network capability; it resolves only through a
/// [`DefinitionSource`].
pub struct HashRef<T> {
    hash: u32,
    _table: PhantomData<fn() -> T>,
}

impl<T> HashRef<T> {
    pub const fn new(hash: u32) -> Self {
        Self {
            hash,
            _table: PhantomData,
        }
    }

    pub const fn hash(self) -> u32 {
        self.hash
    }
}

impl<T: Definition> HashRef<T> {
    pub fn table(self) -> &'static str {
        T::TABLE
    }

    /// Fetches and decodes the referenced record.
    pub async fn resolve<S>(self, source: &S) -> Result<T, DefinitionError>
    where
        S: DefinitionSource + ?Sized,
    {
        let raw = source.definition(T::TABLE, self.hash).await?;
        Ok(serde_json::from_str(raw.get())?)
    }
}

impl<T> Clone for HashRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for HashRef<T> {}

impl<T> PartialEq for HashRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl<T> Eq for HashRef<T> {}

impl<T> Hash for HashRef<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl<T> Default for HashRef<T> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<T> From<u32> for HashRef<T> {
    fn from(hash: u32) -> Self {
        Self::new(hash)
    }
}

impl<T> fmt::Debug for HashRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashRef({})", self.hash)
    }
}

impl<T> fmt::Display for HashRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.hash, f)
    }
}

impl<T> Serialize for HashRef<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.hash)
    }
}

impl<'de, T> Deserialize<'de> for HashRef<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u32::deserialize(deserializer).map(Self::new)
    }
}
