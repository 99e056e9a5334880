//! Request input for the decoders: normalized headers plus a buffered body.

use std::collections::BTreeMap;

use bytes::Bytes;
use http::HeaderMap;

/// Header names and values with names lower-cased.
///
/// Lookup is case-insensitive regardless of how the map was built. When a
/// name repeats, the first value is kept. Values that are not valid UTF-8
/// are skipped, since no CloudEvents attribute can carry them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestHeaders {
    entries: BTreeMap<String, String>,
}

impl RequestHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header unless one with the same (case-folded) name exists.
    pub fn insert<K, V>(&mut self, name: K, value: V)
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        self.entries
            .entry(name.as_ref().to_ascii_lowercase())
            .or_insert_with(|| value.into());
    }

    /// Remove a header by name, case-insensitively.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.remove(&name.to_ascii_lowercase())
    }

    /// Look up a header by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        match self.entries.get(name) {
            Some(value) => Some(value.as_str()),
            None if name.bytes().any(|b| b.is_ascii_uppercase()) => self
                .entries
                .get(&name.to_ascii_lowercase())
                .map(String::as_str),
            None => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over `(lower-cased name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RequestHeaders
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

impl From<&HeaderMap> for RequestHeaders {
    fn from(map: &HeaderMap) -> Self {
        map.iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str(), value.to_string()))
            })
            .collect()
    }
}

/// An inbound HTTP request as seen by the decoders.
///
/// The hosting layer is responsible for buffering the body; an empty
/// [`Bytes`] stands for both "no body" and "empty body".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventRequest {
    headers: RequestHeaders,
    body: Bytes,
}

impl EventRequest {
    pub fn new(headers: RequestHeaders, body: Bytes) -> Self {
        Self { headers, body }
    }

    /// Build from an `http` header map and an already-buffered body.
    pub fn from_parts(headers: &HeaderMap, body: Bytes) -> Self {
        Self::new(RequestHeaders::from(headers), body)
    }

    pub fn headers(&self) -> &RequestHeaders {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut RequestHeaders {
        &mut self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// The transport `content-type` header.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type")
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Whether a non-empty body is present.
    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }
}

impl From<http::Request<Bytes>> for EventRequest {
    fn from(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        Self::from_parts(&parts.headers, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let headers: RequestHeaders = [("CE-Id", "A234"), ("Content-Type", "text/plain")]
            .into_iter()
            .collect();
        assert_eq!(headers.get("ce-id"), Some("A234"));
        assert_eq!(headers.get("CE-ID"), Some("A234"));
        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert!(headers.get("ce-source").is_none());
    }

    #[test]
    fn test_first_value_wins() {
        let mut headers = RequestHeaders::new();
        headers.insert("ce-id", "first");
        headers.insert("CE-ID", "second");
        assert_eq!(headers.get("ce-id"), Some("first"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut headers: RequestHeaders = [("ce-type", "t")].into_iter().collect();
        assert_eq!(headers.remove("CE-Type"), Some("t".to_string()));
        assert!(headers.is_empty());
    }

    #[test]
    fn test_from_header_map_skips_opaque_values() {
        let mut map = HeaderMap::new();
        map.insert("ce-id", HeaderValue::from_static("A234"));
        map.insert("ce-subject", HeaderValue::from_bytes(&[0xfa, 0xfb]).unwrap());
        map.append("ce-source", HeaderValue::from_static("/first"));
        map.append("ce-source", HeaderValue::from_static("/second"));

        let headers = RequestHeaders::from(&map);
        assert_eq!(headers.get("ce-id"), Some("A234"));
        assert_eq!(headers.get("ce-source"), Some("/first"));
        assert!(!headers.contains("ce-subject"));
    }

    #[test]
    fn test_event_request_from_http() {
        let req = http::Request::builder()
            .header("Content-Type", "application/json")
            .body(Bytes::from_static(b"{}"))
            .unwrap();
        let req = EventRequest::from(req);
        assert_eq!(req.content_type(), Some("application/json"));
        assert!(req.has_body());

        let req = EventRequest::default();
        assert!(!req.has_body());
        assert!(req.content_type().is_none());
    }
}
