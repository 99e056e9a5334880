//! # CloudEvents for Axum
//!
//! Receive [CloudEvents](https://cloudevents.io/) over HTTP in
//! [Axum](https://github.com/tokio-rs/axum) handlers.
//!
//! The decoding itself lives in `cloudevents-axum-core`; this crate adds the
//! pieces an axum application needs around it:
//!
//! - **Extractors:** [`CloudEvents`] accepts binary, structured and batch
//!   requests; [`BinaryCloudEvent`] accepts binary mode only.
//! - **Configuration:** [`CloudEventLayer`] carries [`EventConfig`] (body and
//!   batch limits) to the extractors through request extensions.
//! - **Error handling:** [`EventRejection`] maps every decode failure to a
//!   4xx response with a JSON error body.
//!
//! ## Example
//!
//! ```rust,no_run
//! use axum::{Router, routing::post};
//! use cloudevents_axum::prelude::*;
//!
//! async fn receive(CloudEvents(events): CloudEvents) -> String {
//!     format!("received {} event(s)", events.len())
//! }
//!
//! let app: Router = Router::new()
//!     .route("/events", post(receive))
//!     .layer(CloudEventLayer::new().receive_max_bytes(1024 * 1024));
//! ```

pub mod config;
pub mod extract;
pub mod layer;
pub mod limit;
pub mod rejection;

pub use config::EventConfig;
pub use extract::{BinaryCloudEvent, CloudEvents};
pub use layer::{CloudEventLayer, CloudEventService};
pub use limit::DecodeLimits;
pub use rejection::EventRejection;

// Re-export the decoding core
pub use cloudevents_axum_core::{
    CloudEvent, DEFAULT_SPEC_VERSION, DecodeError, ErrorKind, EventMode, EventRequest,
    decode_many, decode_one,
};

pub mod prelude {
    //! A prelude providing the most common types.
    pub use crate::config::EventConfig;
    pub use crate::extract::{BinaryCloudEvent, CloudEvents};
    pub use crate::layer::CloudEventLayer;
    pub use crate::limit::DecodeLimits;
    pub use crate::rejection::EventRejection;
    pub use cloudevents_axum_core::{CloudEvent, DecodeError, ErrorKind};
}
