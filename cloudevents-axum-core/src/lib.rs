//! Core CloudEvents HTTP protocol binding types.
//!
//! This crate turns an HTTP request (headers plus a buffered body) into one or
//! more [`CloudEvent`] values. It is framework-agnostic and shared by the
//! axum integration in `cloudevents-axum`.
//!
//! ## Modules
//!
//! - [`mode`]: Content-Type classification (binary, structured, batch)
//! - [`binary`]: Binary-mode decoding from `ce-*` headers
//! - [`structured`]: Structured-mode decoding from a JSON body
//! - [`dispatch`]: Entry points routing a request to the right decoder
//! - [`event`]: The decoded [`CloudEvent`] value
//! - [`error`]: Decode error kinds

pub mod binary;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod headers;
pub mod mode;
pub mod structured;
mod timestamp;

pub use binary::decode_binary;
pub use dispatch::{decode_many, decode_many_with, decode_one};
pub use error::{DecodeError, ErrorKind, ParseErrorKindError};
pub use event::{CloudEvent, DEFAULT_SPEC_VERSION};
pub use headers::{EventRequest, RequestHeaders};
pub use mode::{EventFormat, EventMode};
pub use structured::{decode_batch, decode_batch_with, decode_structured};
