//! Server-wide configuration for CloudEvents extraction.
//!
//! Set once at startup and attached to each request by
//! [`CloudEventLayer`](crate::layer::CloudEventLayer).

use crate::limit::DecodeLimits;

/// Configuration read by the extractors from request extensions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EventConfig {
    /// Body and batch limits.
    pub limits: DecodeLimits,
}

impl EventConfig {
    pub fn new(limits: DecodeLimits) -> Self {
        Self { limits }
    }
}
