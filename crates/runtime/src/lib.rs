//! Runtime support for generated API bindings.
//!
//! Generated code depends on this crate for its value types ([`HashRef`],
//! [`Nullable`], [`BitmaskSet`], [`Int64`], [`Envelope`]) and sends every
//! operation through an [`Api`] handle.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod interceptor;
pub mod types;

pub use api::{Api, ENTITY_DEFINITION_PATH, MANIFEST_PATH, decode_envelope};
pub use client::{API_KEY_HEADER, Client, ClientRequest, DefaultClient, RawResponse, http_client};
pub use config::{ApiConfig, read_toml};
pub use error::{ApiError, ClientError, ConfigError, DefinitionError, TransportError};
pub use interceptor::{AddHeaderClient, BaseUrlClient};
pub use types::{
    BitmaskSet, BitmaskValue, Definition, DefinitionSource, ERROR_CODE_NONE, ERROR_CODE_SUCCESS,
    Envelope, HashRef, Int64, JsonMap, Nullable, Timestamp, join_array,
};

pub use async_trait::async_trait;
pub use serde_json::value::RawValue;
