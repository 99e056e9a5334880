//! Resource limits applied while receiving CloudEvents.
//!
//! - **Receive limit** (`receive_max_bytes`): caps the buffered request body.
//!   Checked against `Content-Length` by [`CloudEventLayer`] and enforced
//!   again while the extractor reads the body.
//! - **Batch limit** (`max_batch_size`): caps the number of events accepted
//!   from one structured batch. The array length is checked before any
//!   element is decoded.
//!
//! [`CloudEventLayer`]: crate::layer::CloudEventLayer

use crate::rejection::EventRejection;

/// Configuration for request size limits.
///
/// By default, no limits are applied. Use the builder methods to set limits.
///
/// # Example
///
/// ```rust
/// use cloudevents_axum::DecodeLimits;
///
/// let limits = DecodeLimits::new()
///     .receive_max_bytes(4 * 1024 * 1024)
///     .max_batch_size(100);
/// assert_eq!(limits.get_max_batch_size(), Some(100));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum size of a request body in bytes.
    receive_max_bytes: Option<usize>,
    /// Maximum number of events in one batch.
    max_batch_size: Option<usize>,
}

impl DecodeLimits {
    /// Create new limits with no restrictions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum request body size in bytes.
    pub fn receive_max_bytes(mut self, max: usize) -> Self {
        self.receive_max_bytes = Some(max);
        self
    }

    /// Set the maximum number of events accepted from one batch request.
    pub fn max_batch_size(mut self, max: usize) -> Self {
        self.max_batch_size = Some(max);
        self
    }

    /// Returns the maximum body size, or `None` if unlimited.
    pub fn get_receive_max_bytes(&self) -> Option<usize> {
        self.receive_max_bytes
    }

    /// Returns the maximum batch size, or `None` if unlimited.
    pub fn get_max_batch_size(&self) -> Option<usize> {
        self.max_batch_size
    }

    /// Returns the maximum body size for use with `axum::body::to_bytes`.
    ///
    /// Returns `usize::MAX` if unlimited.
    pub fn receive_max_bytes_or_max(&self) -> usize {
        self.receive_max_bytes.unwrap_or(usize::MAX)
    }

    /// Check a body size against the receive limit.
    pub fn check_size(&self, size: usize) -> Result<(), EventRejection> {
        if let Some(limit) = self.receive_max_bytes
            && size > limit
        {
            return Err(EventRejection::PayloadTooLarge {
                size: Some(size),
                limit,
            });
        }
        Ok(())
    }

    /// Check a decoded batch length against the batch limit.
    pub fn check_batch(&self, count: usize) -> Result<(), EventRejection> {
        if let Some(limit) = self.max_batch_size
            && count > limit
        {
            return Err(EventRejection::BatchTooLarge { count, limit });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unlimited() {
        let limits = DecodeLimits::default();
        assert_eq!(limits.get_receive_max_bytes(), None);
        assert_eq!(limits.get_max_batch_size(), None);
        assert_eq!(limits.receive_max_bytes_or_max(), usize::MAX);
        assert!(limits.check_size(usize::MAX).is_ok());
        assert!(limits.check_batch(usize::MAX).is_ok());
    }

    #[test]
    fn test_check_size() {
        let limits = DecodeLimits::new().receive_max_bytes(1024);
        assert_eq!(limits.receive_max_bytes_or_max(), 1024);
        assert!(limits.check_size(1024).is_ok());

        assert!(matches!(
            limits.check_size(1025),
            Err(EventRejection::PayloadTooLarge {
                size: Some(1025),
                limit: 1024
            })
        ));
    }

    #[test]
    fn test_check_batch() {
        let limits = DecodeLimits::new().max_batch_size(2);
        assert!(limits.check_batch(2).is_ok());
        assert!(matches!(
            limits.check_batch(3),
            Err(EventRejection::BatchTooLarge { count: 3, limit: 2 })
        ));
    }
}
