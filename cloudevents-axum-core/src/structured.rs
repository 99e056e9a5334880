//! Structured content mode: the whole event encoded as JSON in the body.
//!
//! A single event is one JSON object; a batch is a JSON array of objects.
//! Attribute names follow the CloudEvents JSON event format. Members that are
//! not core attributes are kept as extensions.

use base64::Engine;
use bytes::Bytes;
use serde_json::{Map, Value};

use crate::error::DecodeError;
use crate::event::CloudEvent;
use crate::timestamp::parse_time;

const ID: &str = "id";
const SOURCE: &str = "source";
const TYPE: &str = "type";
const SPECVERSION: &str = "specversion";
const DATACONTENTTYPE: &str = "datacontenttype";
const DATASCHEMA: &str = "dataschema";
const SUBJECT: &str = "subject";
const TIME: &str = "time";
const DATA: &str = "data";
const DATA_BASE64: &str = "data_base64";

/// Member names reserved by the JSON event format. Never valid as extension
/// names.
pub(crate) const CORE_MEMBERS: [&str; 10] = [
    ID,
    SOURCE,
    TYPE,
    SPECVERSION,
    DATACONTENTTYPE,
    DATASCHEMA,
    SUBJECT,
    TIME,
    DATA,
    DATA_BASE64,
];

/// Decode a structured-mode body holding a single JSON event object.
pub fn decode_structured(body: &[u8]) -> Result<CloudEvent, DecodeError> {
    match parse_json(body)? {
        Value::Object(object) => event_from_object(&object),
        other => Err(DecodeError::MalformedEvent(format!(
            "expected a JSON object, got {}",
            json_type(&other)
        ))),
    }
}

/// Decode a structured-mode batch body: a non-empty JSON array of event
/// objects. Events are returned in array order.
pub fn decode_batch(body: &[u8]) -> Result<Vec<CloudEvent>, DecodeError> {
    decode_batch_with(body, |_| Ok(()))
}

/// Like [`decode_batch`], but hands the array length to `check_len` before
/// any element is decoded. An error from `check_len` aborts decoding.
///
/// ```
/// use cloudevents_axum_core::{DecodeError, decode_batch_with};
///
/// let body = br#"[{"id":"1","source":"/s","type":"t"},{"id":"2","source":"/s","type":"t"}]"#;
/// let result = decode_batch_with(body, |len| {
///     if len > 1 {
///         Err(DecodeError::MalformedBatch(format!("{len} events")))
///     } else {
///         Ok(())
///     }
/// });
/// assert!(result.is_err());
/// ```
pub fn decode_batch_with<E, F>(body: &[u8], check_len: F) -> Result<Vec<CloudEvent>, E>
where
    E: From<DecodeError>,
    F: FnOnce(usize) -> Result<(), E>,
{
    let elements = match parse_json(body)? {
        Value::Array(elements) => elements,
        other => {
            return Err(DecodeError::MalformedBatch(format!(
                "expected a JSON array, got {}",
                json_type(&other)
            ))
            .into());
        }
    };

    if elements.is_empty() {
        return Err(DecodeError::MalformedBatch("batch contains no events".into()).into());
    }
    check_len(elements.len())?;

    elements
        .iter()
        .enumerate()
        .map(|(index, element)| batch_element(index, element).map_err(E::from))
        .collect()
}

fn batch_element(index: usize, element: &Value) -> Result<CloudEvent, DecodeError> {
    match element {
        Value::Object(object) => event_from_object(object).map_err(|err| err.in_batch(index)),
        other => Err(DecodeError::MalformedBatch(format!(
            "element {index}: expected a JSON object, got {}",
            json_type(other)
        ))),
    }
}

fn parse_json(body: &[u8]) -> Result<Value, DecodeError> {
    serde_json::from_slice(body).map_err(|e| DecodeError::InvalidJson(e.to_string()))
}

/// Map one JSON event object onto a [`CloudEvent`].
fn event_from_object(object: &Map<String, Value>) -> Result<CloudEvent, DecodeError> {
    let id = required_str(object, ID)?;
    let source = required_str(object, SOURCE)?;
    let ty = required_str(object, TYPE)?;

    let mut event = CloudEvent::new(id, source, ty);

    if let Some(spec_version) = optional_str(object, SPECVERSION)? {
        event = event.with_spec_version(spec_version);
    }
    if let Some(data_content_type) = optional_str(object, DATACONTENTTYPE)? {
        event = event.with_data_content_type(data_content_type);
    }
    if let Some(data_schema) = optional_str(object, DATASCHEMA)? {
        event = event.with_data_schema(data_schema);
    }
    if let Some(subject) = optional_str(object, SUBJECT)? {
        event = event.with_subject(subject);
    }
    if let Some(time) = optional_str(object, TIME)? {
        event = event.with_time(parse_time(time)?);
    }
    if let Some(data) = data(object)? {
        event = event.with_data(data);
    }

    for (name, value) in object {
        if CORE_MEMBERS.contains(&name.as_str()) {
            continue;
        }
        let value = match value {
            Value::Null => continue,
            Value::String(s) => s.clone(),
            Value::Bool(_) | Value::Number(_) => value.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(DecodeError::MalformedEvent(format!(
                    "extension `{name}` must be a scalar, got {}",
                    json_type(value)
                )));
            }
        };
        event = event.with_extension(name.as_str(), value);
    }

    Ok(event)
}

fn required_str<'a>(
    object: &'a Map<String, Value>,
    name: &'static str,
) -> Result<&'a str, DecodeError> {
    object
        .get(name)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .ok_or(DecodeError::MissingRequiredField(name))
}

/// An optional string attribute; `null` counts as absent.
fn optional_str<'a>(
    object: &'a Map<String, Value>,
    name: &str,
) -> Result<Option<&'a str>, DecodeError> {
    match object.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(DecodeError::MalformedEvent(format!(
            "`{name}` must be a string, got {}",
            json_type(other)
        ))),
    }
}

/// Resolve the payload from `data` or `data_base64` (never both).
///
/// A string `data` member is taken as text; any other JSON value is kept as
/// its compact JSON encoding.
fn data(object: &Map<String, Value>) -> Result<Option<Bytes>, DecodeError> {
    let data = object.get(DATA).filter(|v| !v.is_null());
    let data_base64 = optional_str(object, DATA_BASE64)?;

    match (data, data_base64) {
        (Some(_), Some(_)) => Err(DecodeError::MalformedEvent(
            "`data` and `data_base64` are mutually exclusive".into(),
        )),
        (Some(Value::String(text)), None) => Ok(Some(Bytes::from(text.clone()))),
        (Some(value), None) => Ok(Some(Bytes::from(value.to_string()))),
        (None, Some(encoded)) => base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map(|decoded| Some(Bytes::from(decoded)))
            .map_err(|e| DecodeError::MalformedEvent(format!("invalid `data_base64`: {e}"))),
        (None, None) => Ok(None),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
