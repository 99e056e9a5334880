//! Middleware layer that configures CloudEvents extraction.
//!
//! [`CloudEventLayer`] stores an [`EventConfig`] in the request extensions,
//! where [`CloudEvents`] and [`BinaryCloudEvent`] pick it up. When a receive
//! limit is set, requests whose `Content-Length` already exceeds it are
//! rejected here, before any handler runs.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/events", post(handler))
//!     .layer(CloudEventLayer::new().receive_max_bytes(1024 * 1024));
//! ```
//!
//! [`CloudEvents`]: crate::extract::CloudEvents
//! [`BinaryCloudEvent`]: crate::extract::BinaryCloudEvent

use axum::body::Body;
use axum::http::Request;
use axum::http::header::CONTENT_LENGTH;
use axum::response::{IntoResponse, Response};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use tower::{Layer, Service, ServiceExt};

use crate::config::EventConfig;
use crate::limit::DecodeLimits;

/// Layer that attaches [`EventConfig`] to every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct CloudEventLayer {
    config: EventConfig,
}

impl CloudEventLayer {
    /// Create a layer with no limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a layer from a prepared configuration.
    pub fn with_config(config: EventConfig) -> Self {
        Self { config }
    }

    /// Replace all limits.
    pub fn limits(mut self, limits: DecodeLimits) -> Self {
        self.config.limits = limits;
        self
    }

    /// Set the maximum request body size in bytes.
    pub fn receive_max_bytes(mut self, max: usize) -> Self {
        self.config.limits = self.config.limits.receive_max_bytes(max);
        self
    }

    /// Set the maximum number of events accepted from one batch.
    pub fn max_batch_size(mut self, max: usize) -> Self {
        self.config.limits = self.config.limits.max_batch_size(max);
        self
    }

    pub fn config(&self) -> &EventConfig {
        &self.config
    }
}

impl<S> Layer<S> for CloudEventLayer {
    type Service = CloudEventService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CloudEventService {
            inner,
            config: self.config,
        }
    }
}

/// Service produced by [`CloudEventLayer`].
#[derive(Debug, Clone)]
pub struct CloudEventService<S> {
    inner: S,
    config: EventConfig,
}

impl<S> Service<Request<Body>> for CloudEventService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Error: Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        if let Some(content_length) = get_content_length(&req)
            && let Err(rejection) = self.config.limits.check_size(content_length)
        {
            return Box::pin(async move { Ok(rejection.into_response()) });
        }

        req.extensions_mut().insert(self.config);

        // Clone inner service for the async block
        let inner = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, inner);

        Box::pin(async move { inner.oneshot(req).await })
    }
}

/// Get Content-Length header value as usize.
fn get_content_length<B>(req: &Request<B>) -> Option<usize> {
    req.headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
}
