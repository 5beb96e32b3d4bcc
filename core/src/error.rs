//! Error types for the GitHub search client.
//!
//! # Design
//! Payload-shape problems (`DecodeError`) are kept apart from delivery
//! problems (`TransportError`) so callers can tell "the server answered with
//! something we cannot read" from "we never got a usable answer." `ApiError`
//! is the single type returned by the client and the search coordinator.

use std::fmt;

use thiserror::Error;

/// Shape of a JSON value, as reported by `DecodeError::UnexpectedType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Null,
    Bool,
    /// A signed integer that does not fit `u64` (i.e. negative).
    Integer,
    /// A non-negative integer.
    UnsignedInteger,
    Float,
    String,
    Array,
    Object,
}

impl JsonKind {
    pub fn of(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => JsonKind::Null,
            Value::Bool(_) => JsonKind::Bool,
            Value::Number(n) if n.is_u64() => JsonKind::UnsignedInteger,
            Value::Number(n) if n.is_i64() => JsonKind::Integer,
            Value::Number(_) => JsonKind::Float,
            Value::String(_) => JsonKind::String,
            Value::Array(_) => JsonKind::Array,
            Value::Object(_) => JsonKind::Object,
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JsonKind::Null => "null",
            JsonKind::Bool => "bool",
            JsonKind::Integer => "integer",
            JsonKind::UnsignedInteger => "unsigned integer",
            JsonKind::Float => "float",
            JsonKind::String => "string",
            JsonKind::Array => "array",
            JsonKind::Object => "object",
        };
        f.write_str(name)
    }
}

/// A JSON object did not have the shape a model expects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("missing required key `{0}`")]
    MissingRequiredKey(String),

    #[error("unexpected type for `{key}`: expected {expected}, found {actual}")]
    UnexpectedType {
        key: String,
        expected: JsonKind,
        actual: JsonKind,
    },

    #[error("cannot parse URL for `{key}`: {value:?}")]
    CannotParseUrl { key: String, value: String },

    #[error("cannot parse date for `{key}`: {value:?}")]
    CannotParseDate { key: String, value: String },
}

impl DecodeError {
    /// The JSON key this error is about.
    pub fn key(&self) -> &str {
        match self {
            DecodeError::MissingRequiredKey(key)
            | DecodeError::UnexpectedType { key, .. }
            | DecodeError::CannotParseUrl { key, .. }
            | DecodeError::CannotParseDate { key, .. } => key,
        }
    }
}

/// What went wrong while delivering a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The server answered with a non-2xx status.
    Status(u16),
    /// DNS, connect, TLS, timeout or I/O failure; no status was received.
    Network(String),
}

/// The request did not produce a successful HTTP response.
///
/// `reason` carries server-supplied diagnostic text when there was any. It is
/// informational only: the classification lives in `kind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub reason: Option<String>,
}

impl TransportError {
    pub fn status(status: u16, reason: Option<String>) -> Self {
        Self {
            kind: TransportErrorKind::Status(status),
            reason,
        }
    }

    pub fn network(cause: impl fmt::Display) -> Self {
        Self {
            kind: TransportErrorKind::Network(cause.to_string()),
            reason: None,
        }
    }

    /// HTTP status code, if the server answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self.kind {
            TransportErrorKind::Status(status) => Some(status),
            TransportErrorKind::Network(_) => None,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TransportErrorKind::Status(status) => write!(f, "HTTP {status}")?,
            TransportErrorKind::Network(cause) => write!(f, "network error: {cause}")?,
        }
        if let Some(reason) = &self.reason {
            write!(f, " ({reason})")?;
        }
        Ok(())
    }
}

impl std::error::Error for TransportError {}

/// Errors returned by `ApiClient::request` and by search futures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The body was a JSON object but did not match the response model.
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// The body was not a JSON object.
    #[error("unexpected response: body is not a JSON object")]
    UnexpectedResponse,

    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),

    /// The endpoint path could not be resolved against the base URL.
    #[error("invalid endpoint path {0:?}")]
    InvalidEndpoint(String),
}

impl ApiError {
    pub fn is_decode(&self) -> bool {
        matches!(self, ApiError::Decode(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

/// Invalid client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}
