//! Entry points: route a request to the decoder for its content mode.

use crate::binary::decode_binary;
use crate::error::DecodeError;
use crate::event::CloudEvent;
use crate::headers::EventRequest;
use crate::mode::{EventFormat, EventMode};
use crate::structured::{decode_batch_with, decode_structured};

/// Decode every event carried by a request.
///
/// The `Content-Type` header selects the mode: binary and structured
/// requests yield one event, batch requests yield one event per array
/// element in order. The result is never empty.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use cloudevents_axum_core::{EventRequest, RequestHeaders, decode_many};
///
/// let headers: RequestHeaders = [("content-type", "application/cloudevents+json")]
///     .into_iter()
///     .collect();
/// let body = Bytes::from_static(br#"{"id":"1","source":"/s","type":"t"}"#);
///
/// let events = decode_many(&EventRequest::new(headers, body)).unwrap();
/// assert_eq!(events.len(), 1);
/// assert_eq!(events[0].id(), "1");
/// ```
pub fn decode_many(req: &EventRequest) -> Result<Vec<CloudEvent>, DecodeError> {
    decode_many_with(req, |_| Ok(()))
}

/// Like [`decode_many`], but hands the number of events the request carries
/// to `check_count` before decoding them. Binary and structured requests
/// always report one; batch requests report the array length.
pub fn decode_many_with<E, F>(req: &EventRequest, check_count: F) -> Result<Vec<CloudEvent>, E>
where
    E: From<DecodeError>,
    F: FnOnce(usize) -> Result<(), E>,
{
    match EventMode::from_content_type(req.content_type()) {
        EventMode::Binary => {
            check_count(1)?;
            Ok(vec![decode_binary(req)?])
        }
        EventMode::Structured(format) => {
            require_json(&format)?;
            check_count(1)?;
            Ok(vec![decode_structured(req.body())?])
        }
        EventMode::Batch(format) => {
            require_json(&format)?;
            decode_batch_with(req.body(), check_count)
        }
    }
}

/// Decode a request known to be in binary mode.
///
/// The `Content-Type` header is not used for classification; it only takes
/// part in `datacontenttype` reconciliation.
pub fn decode_one(req: &EventRequest) -> Result<CloudEvent, DecodeError> {
    decode_binary(req)
}

fn require_json(format: &EventFormat) -> Result<(), DecodeError> {
    if format.is_json() {
        Ok(())
    } else {
        Err(DecodeError::UnsupportedFormat(format.as_str().to_string()))
    }
}
