//! Content mode detection for the CloudEvents HTTP binding.
//!
//! The `Content-Type` header alone decides how a request is read:
//!
//! | Media type                              | Mode                |
//! |-----------------------------------------|---------------------|
//! | `application/cloudevents-batch+<fmt>`   | [`EventMode::Batch`] |
//! | `application/cloudevents+<fmt>`         | [`EventMode::Structured`] |
//! | anything else, or no header             | [`EventMode::Binary`] |
//!
//! Parameters such as `; charset=utf-8` are ignored.

/// Prefix of the structured single-event media type.
pub const STRUCTURED_PREFIX: &str = "application/cloudevents+";

/// Prefix of the structured batch media type.
pub const BATCH_PREFIX: &str = "application/cloudevents-batch+";

/// `application/cloudevents+json`
pub const STRUCTURED_JSON_CONTENT_TYPE: &str = "application/cloudevents+json";

/// `application/cloudevents-batch+json`
pub const BATCH_JSON_CONTENT_TYPE: &str = "application/cloudevents-batch+json";

/// Event format named by the `+<format>` suffix of a structured media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventFormat {
    /// `+json`, the only format that can be decoded.
    Json,
    /// Any other suffix, lower-cased (e.g. `avro`, `protobuf`).
    Other(String),
}

impl EventFormat {
    fn from_suffix(suffix: &str) -> Self {
        if suffix == "json" {
            Self::Json
        } else {
            Self::Other(suffix.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Json => "json",
            Self::Other(format) => format,
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }
}

/// How the event(s) in a request are encoded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EventMode {
    /// Attributes in `ce-*` headers, payload in the body.
    #[default]
    Binary,
    /// One event encoded in the body.
    Structured(EventFormat),
    /// An array of events encoded in the body.
    Batch(EventFormat),
}

impl EventMode {
    /// Classify a request by its `Content-Type` header value.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(content_type) = content_type else {
            return Self::Binary;
        };

        let media_type = media_type(content_type);
        if let Some(suffix) = media_type.strip_prefix(BATCH_PREFIX) {
            Self::Batch(EventFormat::from_suffix(suffix))
        } else if let Some(suffix) = media_type.strip_prefix(STRUCTURED_PREFIX) {
            Self::Structured(EventFormat::from_suffix(suffix))
        } else {
            Self::Binary
        }
    }

    /// Event format of a structured or batch request, `None` for binary.
    pub fn format(&self) -> Option<&EventFormat> {
        match self {
            Self::Binary => None,
            Self::Structured(format) | Self::Batch(format) => Some(format),
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary)
    }

    /// Whether the body carries the event attributes (single or batch).
    pub fn is_structured(&self) -> bool {
        !self.is_binary()
    }

    pub fn is_batch(&self) -> bool {
        matches!(self, Self::Batch(_))
    }
}

/// Base media type of a `Content-Type` value: parameters stripped,
/// whitespace trimmed, ASCII lower-cased.
fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}
