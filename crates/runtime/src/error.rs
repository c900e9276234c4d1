//! Error types surfaced by the runtime client and definition lookups.

use thiserror::Error;

/// Failure to obtain a complete HTTP response.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The network call itself failed (connect, TLS, timeout, body read).
    #[error("request failed: {0}")]
    Connection(#[from] reqwest::Error),

    /// The server answered with a failing status and a body that was not an envelope.
    #[error("HTTP status {status}")]
    Status { status: u16, body: Vec<u8> },

    /// The request URL could not be assembled.
    #[error("invalid request URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A caller-supplied header name or value is not valid HTTP.
    #[error("invalid header '{name}'")]
    InvalidHeader { name: String },
}

impl TransportError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Connection(err) => err.status().map(|s| s.as_u16()),
            Self::Status { status, .. } => Some(*status),
            Self::InvalidUrl { .. } | Self::InvalidHeader { .. } => None,
        }
    }

    /// Raw response body, for status errors.
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            Self::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// A decoded envelope whose error code is not a success code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("API error {code} ({status}): {message}")]
pub struct ApiError {
    pub code: i32,
    pub status: String,
    pub throttle_seconds: i32,
    pub message: String,
}

/// Everything that can go wrong while executing a generated API call.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("failed to encode request body for {operation}: {source}")]
    Encode {
        operation: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode response for {operation}: {source}")]
    Decode {
        operation: String,
        body: Vec<u8>,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from resolving a hash reference against a definition table.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// The hash is absent from the table, even after refreshing the manifest.
    #[error("no entry {hash} in definition table {table}")]
    NotFound { table: String, hash: u32 },

    /// The manifest does not list the requested table.
    #[error("unknown definition table {0:?}")]
    UnknownTable(String),

    /// The manifest came back without a version token.
    #[error("missing manifest")]
    MissingManifest,

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("failed to decode definition record: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<TransportError> for DefinitionError {
    fn from(err: TransportError) -> Self {
        Self::Client(ClientError::Transport(err))
    }
}

/// Errors loading runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("no API key configured (set APIBIND_API_KEY or api_key in the config file)")]
    MissingApiKey,
}
