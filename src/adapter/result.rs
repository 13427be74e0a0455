//! Uniform result envelope and connection status

use crate::error::Error;
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Message used when a failure is built without one
const DEFAULT_FAILURE_MESSAGE: &str = "Operation failed";

// ============================================================================
// Operation Result
// ============================================================================

/// Envelope returned by every adapter operation.
///
/// Serializes to `{"success", "data", "message", "metadata"}`. A failed
/// result always has `data: null` and a non-empty message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    success: bool,
    #[serde(default)]
    data: JsonValue,
    #[serde(default)]
    message: String,
    #[serde(default)]
    metadata: JsonObject,
}

impl OperationResult {
    /// Successful result carrying `data`
    pub fn success(data: impl Into<JsonValue>) -> Self {
        Self {
            success: true,
            data: data.into(),
            message: String::new(),
            metadata: JsonObject::new(),
        }
    }

    /// Successful result with no payload
    pub fn ok() -> Self {
        Self::success(JsonValue::Null)
    }

    /// Failed result
    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            data: JsonValue::Null,
            message: if message.is_empty() {
                DEFAULT_FAILURE_MESSAGE.to_string()
            } else {
                message
            },
            metadata: JsonObject::new(),
        }
    }

    /// Failed result from an error, tagged with whether a retry could help
    pub fn from_error(err: &Error) -> Self {
        Self::failure(err.to_string()).with_metadata("retryable", err.is_retryable())
    }

    /// Collapse a fallible operation into an envelope
    pub fn from_outcome(outcome: crate::error::Result<Self>) -> Self {
        outcome.unwrap_or_else(|e| Self::from_error(&e))
    }

    /// Replace the message. Failures keep their message when `message` is empty.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        if self.success || !message.is_empty() {
            self.message = message;
        }
        self
    }

    /// Add one metadata entry
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> &JsonValue {
        &self.data
    }

    pub fn into_data(self) -> JsonValue {
        self.data
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn metadata(&self) -> &JsonObject {
        &self.metadata
    }

    /// One metadata entry
    pub fn meta(&self, key: &str) -> Option<&JsonValue> {
        self.metadata.get(key)
    }

    /// Wire form
    pub fn to_value(&self) -> JsonValue {
        let mut map = JsonObject::new();
        map.insert("success".into(), self.success.into());
        map.insert("data".into(), self.data.clone());
        map.insert("message".into(), self.message.clone().into());
        map.insert("metadata".into(), JsonValue::Object(self.metadata.clone()));
        JsonValue::Object(map)
    }
}

// ============================================================================
// Connection Status
// ============================================================================

/// Lifecycle state of one adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connected,
    Error,
}

impl ConnectionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Error => "error",
        }
    }

    pub(crate) fn as_u8(self) -> u8 {
        self as u8
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => ConnectionStatus::Connected,
            2 => ConnectionStatus::Error,
            _ => ConnectionStatus::Disconnected,
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
