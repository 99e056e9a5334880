//! CloudEvents decode error kinds and types.
//!
//! - [`ErrorKind`]: Stable, wire-visible classification of a failure
//! - [`DecodeError`]: The error returned by every decode entry point

use std::str::FromStr;

use serde::Serialize;

/// Classification of a decode failure.
///
/// The snake_case names are what the HTTP layer puts in error bodies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingRequiredField,
    MismatchedContentType,
    InvalidTimestamp,
    InvalidJson,
    MalformedEvent,
    MalformedBatch,
    UnsupportedFormat,
}

impl ErrorKind {
    /// Get the string representation of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingRequiredField => "missing_required_field",
            ErrorKind::MismatchedContentType => "mismatched_content_type",
            ErrorKind::InvalidTimestamp => "invalid_timestamp",
            ErrorKind::InvalidJson => "invalid_json",
            ErrorKind::MalformedEvent => "malformed_event",
            ErrorKind::MalformedBatch => "malformed_batch",
            ErrorKind::UnsupportedFormat => "unsupported_format",
        }
    }
}

/// Error returned when parsing an [`ErrorKind`] from a string fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseErrorKindError(());

impl std::fmt::Display for ParseErrorKindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown decode error kind")
    }
}

impl std::error::Error for ParseErrorKindError {}

impl FromStr for ErrorKind {
    type Err = ParseErrorKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "missing_required_field" => Ok(ErrorKind::MissingRequiredField),
            "mismatched_content_type" => Ok(ErrorKind::MismatchedContentType),
            "invalid_timestamp" => Ok(ErrorKind::InvalidTimestamp),
            "invalid_json" => Ok(ErrorKind::InvalidJson),
            "malformed_event" => Ok(ErrorKind::MalformedEvent),
            "malformed_batch" => Ok(ErrorKind::MalformedBatch),
            "unsupported_format" => Ok(ErrorKind::UnsupportedFormat),
            _ => Err(ParseErrorKindError(())),
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request could not be decoded into CloudEvents.
///
/// Every variant aborts the whole decode call: no partial event and no
/// partial batch is ever returned alongside it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// One of `id`, `source` or `type` is absent (or not a string).
    #[error("missing required attribute `{0}`")]
    MissingRequiredField(&'static str),

    /// `ce-datacontenttype` and `content-type` are both set and differ.
    #[error(
        "ce-datacontenttype `{ce_datacontenttype}` does not match content-type `{content_type}`"
    )]
    MismatchedContentType {
        ce_datacontenttype: String,
        content_type: String,
    },

    /// A `time` attribute is not a valid RFC 3339 timestamp.
    #[error("invalid RFC 3339 timestamp `{value}`: {reason}")]
    InvalidTimestamp { value: String, reason: String },

    /// The structured-mode body is not valid JSON.
    #[error("invalid JSON body: {0}")]
    InvalidJson(String),

    /// A structured-mode event has the wrong shape.
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    /// A structured-mode batch has the wrong shape.
    #[error("malformed batch: {0}")]
    MalformedBatch(String),

    /// The structured content-type declares an event format other than JSON.
    #[error("unsupported event format `{0}`")]
    UnsupportedFormat(String),
}

impl DecodeError {
    /// Get the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::MissingRequiredField(_) => ErrorKind::MissingRequiredField,
            DecodeError::MismatchedContentType { .. } => ErrorKind::MismatchedContentType,
            DecodeError::InvalidTimestamp { .. } => ErrorKind::InvalidTimestamp,
            DecodeError::InvalidJson(_) => ErrorKind::InvalidJson,
            DecodeError::MalformedEvent(_) => ErrorKind::MalformedEvent,
            DecodeError::MalformedBatch(_) => ErrorKind::MalformedBatch,
            DecodeError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
        }
    }

    /// Prefix a batch element error with its index.
    ///
    /// `MissingRequiredField` and `InvalidTimestamp` keep their variant so
    /// callers can still match on them.
    pub(crate) fn in_batch(self, index: usize) -> Self {
        match self {
            DecodeError::MalformedEvent(reason) => {
                DecodeError::MalformedBatch(format!("element {index}: {reason}"))
            }
            other => other,
        }
    }
}
