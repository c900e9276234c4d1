use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Error code left unset by endpoints that never fill it.
pub const ERROR_CODE_NONE: i32 = 0;
/// `PlatformErrorCodes.Success`.
pub const ERROR_CODE_SUCCESS: i32 = 1;

/// Wire wrapper around every API response.
///
/// `response` is only meaningful when [`Envelope::is_success`] holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Envelope<T> {
    #[serde(default = "Option::default")]
    pub response: Option<T>,
    #[serde(default)]
    pub error_code: i32,
    #[serde(default)]
    pub throttle_seconds: i32,
    #[serde(default)]
    pub error_status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub message_data: HashMap<String, String>,
    #[serde(default)]
    pub detailed_error_trace: String,

    #[serde(skip)]
    raw: Vec<u8>,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        matches!(self.error_code, ERROR_CODE_NONE | ERROR_CODE_SUCCESS)
    }

    /// The error described by a non-success envelope.
    pub fn api_error(&self) -> Option<ApiError> {
        if self.is_success() {
            return None;
        }
        Some(ApiError {
            code: self.error_code,
            status: self.error_status.clone(),
            throttle_seconds: self.throttle_seconds,
            message: self.message.clone(),
        })
    }

    /// Undecoded response body as received.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub(crate) fn set_raw(&mut self, raw: Vec<u8>) {
        self.raw = raw;
    }

    pub fn into_response(self) -> Option<T> {
        self.response
    }
}
