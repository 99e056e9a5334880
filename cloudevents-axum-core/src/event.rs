//! The decoded CloudEvent value.

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::structured::CORE_MEMBERS;

/// Spec version used when a request does not carry one.
pub const DEFAULT_SPEC_VERSION: &str = "1.0";

/// A CloudEvent decoded from an HTTP request.
///
/// `id`, `source` and `type` are always present. The value is built once by
/// a decoder and only exposes read accessors afterwards; the `with_*`
/// methods consume `self` so a partially built event is never observable.
///
/// # Example
///
/// ```
/// use cloudevents_axum_core::{CloudEvent, DEFAULT_SPEC_VERSION};
///
/// let event = CloudEvent::new("A234-1234-1234", "/mycontext", "com.example.someevent")
///     .with_subject("test-subject");
/// assert_eq!(event.spec_version(), DEFAULT_SPEC_VERSION);
/// assert_eq!(event.subject(), Some("test-subject"));
/// assert!(event.data().is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloudEvent {
    id: String,
    source: String,
    ty: String,
    spec_version: String,
    data_content_type: Option<String>,
    data_schema: Option<String>,
    subject: Option<String>,
    time: Option<DateTime<Utc>>,
    data: Option<Bytes>,
    extensions: BTreeMap<String, String>,
}

impl CloudEvent {
    /// Create an event with the required attributes and the default spec version.
    pub fn new<I, S, T>(id: I, source: S, ty: T) -> Self
    where
        I: Into<String>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            id: id.into(),
            source: source.into(),
            ty: ty.into(),
            spec_version: DEFAULT_SPEC_VERSION.to_string(),
            data_content_type: None,
            data_schema: None,
            subject: None,
            time: None,
            data: None,
            extensions: BTreeMap::new(),
        }
    }

    pub fn with_spec_version<S: Into<String>>(mut self, spec_version: S) -> Self {
        self.spec_version = spec_version.into();
        self
    }

    pub fn with_data_content_type<S: Into<String>>(mut self, data_content_type: S) -> Self {
        self.data_content_type = Some(data_content_type.into());
        self
    }

    pub fn with_data_schema<S: Into<String>>(mut self, data_schema: S) -> Self {
        self.data_schema = Some(data_schema.into());
        self
    }

    pub fn with_subject<S: Into<String>>(mut self, subject: S) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_data<B: Into<Bytes>>(mut self, data: B) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Add an extension attribute. A later value for the same name replaces
    /// the earlier one.
    pub fn with_extension<K, V>(mut self, name: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.extensions.insert(name.into(), value.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// The `type` attribute.
    pub fn ty(&self) -> &str {
        &self.ty
    }

    pub fn spec_version(&self) -> &str {
        &self.spec_version
    }

    pub fn data_content_type(&self) -> Option<&str> {
        self.data_content_type.as_deref()
    }

    pub fn data_schema(&self) -> Option<&str> {
        self.data_schema.as_deref()
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        self.time
    }

    /// Payload bytes. `None` means no payload, which is distinct from an
    /// empty one.
    pub fn data(&self) -> Option<&Bytes> {
        self.data.as_ref()
    }

    /// Payload as text, if present and valid UTF-8.
    pub fn data_as_str(&self) -> Option<&str> {
        self.data
            .as_deref()
            .and_then(|data| std::str::from_utf8(data).ok())
    }

    /// Extension attributes, keyed by attribute name.
    pub fn extensions(&self) -> &BTreeMap<String, String> {
        &self.extensions
    }

    pub fn extension(&self, name: &str) -> Option<&str> {
        self.extensions.get(name).map(String::as_str)
    }
}

/// Serializes into the CloudEvents JSON event format.
///
/// UTF-8 payloads are written as a `data` string, anything else as
/// `data_base64`. The output decodes back to an equal event through
/// [`decode_structured`](crate::decode_structured).
impl Serialize for CloudEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use base64::Engine;

        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("specversion", &self.spec_version)?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("source", &self.source)?;
        map.serialize_entry("type", &self.ty)?;
        if let Some(data_content_type) = &self.data_content_type {
            map.serialize_entry("datacontenttype", data_content_type)?;
        }
        if let Some(data_schema) = &self.data_schema {
            map.serialize_entry("dataschema", data_schema)?;
        }
        if let Some(subject) = &self.subject {
            map.serialize_entry("subject", subject)?;
        }
        if let Some(time) = &self.time {
            map.serialize_entry("time", &time.to_rfc3339_opts(SecondsFormat::AutoSi, true))?;
        }
        for (name, value) in &self.extensions {
            if CORE_MEMBERS.contains(&name.as_str()) {
                continue;
            }
            map.serialize_entry(name, value)?;
        }
        if let Some(data) = &self.data {
            match std::str::from_utf8(data) {
                Ok(text) => map.serialize_entry("data", text)?,
                Err(_) => {
                    let encoded = base64::engine::general_purpose::STANDARD.encode(data);
                    map.serialize_entry("data_base64", &encoded)?
                }
            }
        }
        map.end()
    }
}
