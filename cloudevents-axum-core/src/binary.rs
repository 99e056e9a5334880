//! Binary content mode: attributes in `ce-*` headers, payload in the body.

use crate::error::DecodeError;
use crate::event::CloudEvent;
use crate::headers::EventRequest;
use crate::structured::CORE_MEMBERS;
use crate::timestamp::parse_time;

/// Prefix shared by all binary-mode attribute headers.
pub const CE_HEADER_PREFIX: &str = "ce-";

pub const CE_ID: &str = "ce-id";
pub const CE_SOURCE: &str = "ce-source";
pub const CE_TYPE: &str = "ce-type";
pub const CE_SPECVERSION: &str = "ce-specversion";
pub const CE_DATACONTENTTYPE: &str = "ce-datacontenttype";
pub const CE_DATASCHEMA: &str = "ce-dataschema";
pub const CE_SUBJECT: &str = "ce-subject";
pub const CE_TIME: &str = "ce-time";

/// Headers mapped onto core attributes. Every other `ce-*` header is an
/// extension, except `ce-data` and `ce-data_base64` which are ignored.
const CORE_HEADERS: [&str; 8] = [
    CE_ID,
    CE_SOURCE,
    CE_TYPE,
    CE_SPECVERSION,
    CE_DATACONTENTTYPE,
    CE_DATASCHEMA,
    CE_SUBJECT,
    CE_TIME,
];

/// Decode a binary-mode request into exactly one event.
///
/// `ce-id`, `ce-source` and `ce-type` must be present and non-empty.
/// The event's `datacontenttype` comes from `ce-datacontenttype` or, failing
/// that, from `content-type`. When both are present they must be identical.
/// The body becomes the payload only when it is non-empty.
pub fn decode_binary(req: &EventRequest) -> Result<CloudEvent, DecodeError> {
    let headers = req.headers();
    let required = move |name: &'static str, attribute: &'static str| {
        headers
            .get(name)
            .filter(|value| !value.is_empty())
            .ok_or(DecodeError::MissingRequiredField(attribute))
    };

    let id = required(CE_ID, "id")?;
    let source = required(CE_SOURCE, "source")?;
    let ty = required(CE_TYPE, "type")?;

    let mut event = CloudEvent::new(id, source, ty);

    if let Some(spec_version) = headers.get(CE_SPECVERSION) {
        event = event.with_spec_version(spec_version);
    }
    if let Some(data_schema) = headers.get(CE_DATASCHEMA) {
        event = event.with_data_schema(data_schema);
    }
    if let Some(subject) = headers.get(CE_SUBJECT) {
        event = event.with_subject(subject);
    }
    if let Some(time) = headers.get(CE_TIME) {
        event = event.with_time(parse_time(time)?);
    }
    if let Some(data_content_type) = data_content_type(req)? {
        event = event.with_data_content_type(data_content_type);
    }

    for (name, value) in headers.iter() {
        if CORE_HEADERS.contains(&name) {
            continue;
        }
        if let Some(extension) = name.strip_prefix(CE_HEADER_PREFIX)
            && !extension.is_empty()
            && !CORE_MEMBERS.contains(&extension)
        {
            event = event.with_extension(extension, value);
        }
    }

    if req.has_body() {
        event = event.with_data(req.body().clone());
    }

    Ok(event)
}

/// Reconcile `ce-datacontenttype` with the transport `content-type`.
fn data_content_type(req: &EventRequest) -> Result<Option<&str>, DecodeError> {
    match (req.header(CE_DATACONTENTTYPE), req.content_type()) {
        (Some(attribute), Some(transport)) if attribute != transport => {
            Err(DecodeError::MismatchedContentType {
                ce_datacontenttype: attribute.to_string(),
                content_type: transport.to_string(),
            })
        }
        (Some(attribute), _) => Ok(Some(attribute)),
        (None, transport) => Ok(transport),
    }
}
