//! Rejection returned by the CloudEvents extractors.
//!
//! Every rejection becomes a 4xx response with a JSON body:
//!
//! ```json
//! {"code": "missing_required_field", "message": "missing required attribute `id`"}
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cloudevents_axum_core::{DecodeError, ErrorKind};
use serde::Serialize;

/// Why a request could not be turned into CloudEvents.
#[derive(Debug, thiserror::Error)]
pub enum EventRejection {
    /// The request was read but is not a valid CloudEvents request.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The request body exceeds the configured receive limit.
    ///
    /// `size` is the declared `Content-Length` when the request was rejected
    /// before reading, and `None` when the limit was hit while streaming.
    #[error("request body exceeds maximum allowed size of {limit} bytes")]
    PayloadTooLarge { size: Option<usize>, limit: usize },

    /// A batch carries more events than the configured batch limit.
    #[error("batch of {count} events exceeds maximum allowed size of {limit} events")]
    BatchTooLarge { count: usize, limit: usize },

    /// The request body could not be read.
    #[error("failed to read request body: {0}")]
    BodyRead(String),
}

/// JSON body structure for rejection responses.
#[derive(Serialize)]
pub struct RejectionBody {
    pub code: &'static str,
    pub message: String,
}

impl EventRejection {
    /// The decode error kind, if this rejection came from decoding.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Decode(err) => Some(err.kind()),
            _ => None,
        }
    }

    /// Stable machine-readable code used in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Decode(err) => err.kind().as_str(),
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::BatchTooLarge { .. } => "batch_too_large",
            Self::BodyRead(_) => "body_read_failed",
        }
    }

    /// HTTP status code for this rejection.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Decode(err) if err.kind() == ErrorKind::UnsupportedFormat => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            Self::Decode(_) | Self::BodyRead(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } | Self::BatchTooLarge { .. } => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
        }
    }
}

impl IntoResponse for EventRejection {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = RejectionBody {
            code: self.code(),
            message: self.to_string(),
        };

        tracing::debug!(
            status = status.as_u16(),
            code = body.code,
            message = %body.message,
            "rejected CloudEvents request"
        );

        (status, Json(body)).into_response()
    }
}
