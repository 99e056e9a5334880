//! Extractors for CloudEvents requests.
use crate::config::EventConfig;
use crate::limit::DecodeLimits;
use crate::rejection::EventRejection;
use axum::extract::{FromRequest, Request};
use cloudevents_axum_core::{CloudEvent, EventRequest, decode_many_with, decode_one};
use http_body_util::LengthLimitError;
use std::sync::atomic::{AtomicBool, Ordering};

// Flag to ensure we only log the missing layer warning once per process
static WARNED_MISSING_LAYER: AtomicBool = AtomicBool::new(false);

/// Get the config from request extensions, or a default one if missing.
///
/// Without [`CloudEventLayer`](crate::layer::CloudEventLayer) there are no
/// limits; a warning is logged once per process.
fn get_config_or_default<B>(req: &axum::http::Request<B>) -> EventConfig {
    if let Some(config) = req.extensions().get::<EventConfig>() {
        return *config;
    }

    if !WARNED_MISSING_LAYER.swap(true, Ordering::Relaxed) {
        tracing::warn!(
            target: "cloudevents_axum",
            "CloudEventLayer not found. \
             Using default configuration without body or batch limits."
        );
    }

    EventConfig::default()
}

/// All CloudEvents carried by a request, in any content mode.
///
/// Binary and structured requests produce one event; batch requests produce
/// one event per array element, in order. The vector is never empty.
///
/// ```rust,ignore
/// async fn receive(CloudEvents(events): CloudEvents) -> StatusCode {
///     for event in events {
///         println!("{} from {}", event.id(), event.source());
///     }
///     StatusCode::NO_CONTENT
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CloudEvents(pub Vec<CloudEvent>);

impl CloudEvents {
    pub fn into_inner(self) -> Vec<CloudEvent> {
        self.0
    }
}

/// A single binary-mode CloudEvent.
///
/// For endpoints that only ever receive binary-mode requests. The
/// `Content-Type` header is never used to pick a mode; it is only
/// reconciled with `ce-datacontenttype`.
#[derive(Debug, Clone)]
pub struct BinaryCloudEvent(pub CloudEvent);

impl BinaryCloudEvent {
    pub fn into_inner(self) -> CloudEvent {
        self.0
    }
}

impl<S> FromRequest<S> for CloudEvents
where
    S: Send + Sync,
{
    type Rejection = EventRejection;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let (request, config) = read_request(req).await?;
        let events = decode_many_with(&request, |count| config.limits.check_batch(count))?;

        tracing::trace!(count = events.len(), "decoded CloudEvents");
        Ok(CloudEvents(events))
    }
}

impl<S> FromRequest<S> for BinaryCloudEvent
where
    S: Send + Sync,
{
    type Rejection = EventRejection;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let (request, _) = read_request(req).await?;
        let event = decode_one(&request)?;

        tracing::trace!(id = event.id(), "decoded binary CloudEvent");
        Ok(BinaryCloudEvent(event))
    }
}

/// Buffer the body under the configured limit.
async fn read_request(req: Request) -> Result<(EventRequest, EventConfig), EventRejection> {
    let config = get_config_or_default(&req);
    let (parts, body) = req.into_parts();

    let bytes = axum::body::to_bytes(body, config.limits.receive_max_bytes_or_max())
        .await
        .map_err(|e| body_error(e, &config.limits))?;

    Ok((EventRequest::from_parts(&parts.headers, bytes), config))
}

fn body_error(err: axum::Error, limits: &DecodeLimits) -> EventRejection {
    let inner = err.into_inner();
    match limits.get_receive_max_bytes() {
        Some(limit) if inner.is::<LengthLimitError>() => {
            EventRejection::PayloadTooLarge { size: None, limit }
        }
        _ => EventRejection::BodyRead(inner.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::CloudEventLayer;
    use axum::body::{Body, to_bytes};
    use axum::http::StatusCode;
    use axum::response::Response;
    use axum::routing::post;
    use axum::{Json, Router};
    use tower::ServiceExt;

    async fn ids(CloudEvents(events): CloudEvents) -> Json<Vec<String>> {
        Json(events.iter().map(|e| e.id().to_string()).collect())
    }

    async fn binary(BinaryCloudEvent(event): BinaryCloudEvent) -> Json<serde_json::Value> {
        Json(serde_json::to_value(&event).unwrap())
    }

    fn app(layer: CloudEventLayer) -> Router {
        Router::new()
            .route("/events", post(ids))
            .route("/binary", post(binary))
            .layer(layer)
    }

    fn binary_request(uri: &str) -> axum::http::request::Builder {
        axum::http::Request::builder()
            .method("POST")
            .uri(uri)
            .header("ce-type", "com.example.someevent")
            .header("ce-source", "/mycontext")
            .header("ce-id", "A234-1234-1234")
    }

    async fn json_body(resp: Response) -> serde_json::Value {
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_binary_mode() {
        let req = binary_request("/events").body(Body::empty()).unwrap();
        let resp = app(CloudEventLayer::new()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await, serde_json::json!(["A234-1234-1234"]));
    }

    #[tokio::test]
    async fn test_structured_mode() {
        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/events")
            .header("content-type", "application/cloudevents+json; charset=utf-8")
            .body(Body::from(
                r#"{"type":"com.example.someevent","source":"/mycontext","id":"A234-1234-1234"}"#,
            ))
            .unwrap();
        let resp = app(CloudEventLayer::new()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await, serde_json::json!(["A234-1234-1234"]));
    }

    #[tokio::test]
    async fn test_batch_mode() {
        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/events")
            .header("content-type", "application/cloudevents-batch+json")
            .body(Body::from(
                r#"[
                  {"type":"t","source":"/s","id":"A234-1234-1234-0"},
                  {"type":"t","source":"/s","id":"A234-1234-1234-1"},
                  {"type":"t","source":"/s","id":"A234-1234-1234-2"}
                ]"#,
            ))
            .unwrap();
        let resp = app(CloudEventLayer::new()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            json_body(resp).await,
            serde_json::json!(["A234-1234-1234-0", "A234-1234-1234-1", "A234-1234-1234-2"])
        );
    }

    #[tokio::test]
    async fn test_batch_limit() {
        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/events")
            .header("content-type", "application/cloudevents-batch+json")
            .body(Body::from(
                r#"[{"type":"t","source":"/s","id":"0"},{"type":"t","source":"/s","id":"1"}]"#,
            ))
            .unwrap();
        let resp = app(CloudEventLayer::new().max_batch_size(1))
            .oneshot(req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json_body(resp).await["code"], "batch_too_large");
    }

    #[tokio::test]
    async fn test_batch_limit_checked_before_decoding() {
        // Every element is invalid; the batch limit still wins.
        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/events")
            .header("content-type", "application/cloudevents-batch+json")
            .body(Body::from("[{}, {}, {}]"))
            .unwrap();
        let resp = app(CloudEventLayer::new().max_batch_size(2))
            .oneshot(req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = json_body(resp).await;
        assert_eq!(body["code"], "batch_too_large");
        assert_eq!(
            body["message"],
            "batch of 3 events exceeds maximum allowed size of 2 events"
        );
    }

    #[tokio::test]
    async fn test_missing_required_field() {
        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/events")
            .header("ce-type", "t")
            .header("ce-source", "/s")
            .body(Body::empty())
            .unwrap();
        let resp = app(CloudEventLayer::new()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = json_body(resp).await;
        assert_eq!(body["code"], "missing_required_field");
        assert_eq!(body["message"], "missing required attribute `id`");
    }

    #[tokio::test]
    async fn test_mismatched_content_type() {
        let req = binary_request("/binary")
            .header("ce-datacontenttype", "text/plain")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let resp = app(CloudEventLayer::new()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(resp).await["code"], "mismatched_content_type");
    }

    #[tokio::test]
    async fn test_unsupported_format() {
        let req = binary_request("/events")
            .header("content-type", "application/cloudevents+avro")
            .body(Body::empty())
            .unwrap();
        let resp = app(CloudEventLayer::new()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(json_body(resp).await["code"], "unsupported_format");
    }

    #[tokio::test]
    async fn test_binary_extractor_with_data() {
        let req = binary_request("/binary")
            .header("ce-time", "2018-04-05T17:31:05Z")
            .header("content-type", "text/plain")
            .body(Body::from("Hello World\n"))
            .unwrap();
        let resp = app(CloudEventLayer::new()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["id"], "A234-1234-1234");
        assert_eq!(body["datacontenttype"], "text/plain");
        assert_eq!(body["time"], "2018-04-05T17:31:05Z");
        assert_eq!(body["data"], "Hello World\n");
    }

    #[tokio::test]
    async fn test_binary_extractor_ignores_structured_content_type() {
        let req = binary_request("/binary")
            .header("content-type", "application/cloudevents+json")
            .body(Body::empty())
            .unwrap();
        let resp = app(CloudEventLayer::new()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["id"], "A234-1234-1234");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_body_limit_without_content_length() {
        // A streamed body has no Content-Length, so the layer cannot reject it
        // up front; the extractor enforces the limit while reading.
        let chunks: Vec<Result<&'static str, std::io::Error>> =
            vec![Ok("Hello "), Ok("World, this body is too long\n")];
        let req = binary_request("/binary")
            .body(Body::from_stream(futures::stream::iter(chunks)))
            .unwrap();
        let resp = app(CloudEventLayer::new().receive_max_bytes(8))
            .oneshot(req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json_body(resp).await["code"], "payload_too_large");
    }

    #[tokio::test]
    async fn test_without_layer_uses_defaults() {
        let router = Router::new().route("/events", post(ids));
        let req = binary_request("/events").body(Body::empty()).unwrap();
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
