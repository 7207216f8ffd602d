//! Per-request context threaded through every service call.

use std::time::{Duration, Instant};

use crate::id::RequestId;

/// Request identity plus the deadline all I/O on its behalf must respect.
///
/// Immutable once built; cloned freely into spans and background logging.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RequestContext {
    request_id: RequestId,
    deadline: Instant,
}

impl RequestContext {
    pub fn new(timeout: Duration) -> Self {
        Self::with_id(RequestId::new(), timeout)
    }

    pub fn with_id(request_id: RequestId, timeout: Duration) -> Self {
        Self {
            request_id,
            deadline: Instant::now() + timeout,
        }
    }

    /// Context with a deadline far enough away to never fire in practice (tests, startup).
    pub fn background() -> Self {
        Self::new(Duration::from_secs(60 * 60))
    }

    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Time left before the deadline (zero once expired).
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_is_already_expired() {
        let ctx = RequestContext::new(Duration::ZERO);
        assert!(ctx.is_expired());
        assert_eq!(ctx.remaining(), Duration::ZERO);
    }

    #[test]
    fn background_context_has_time_left() {
        let ctx = RequestContext::background();
        assert!(!ctx.is_expired());
        assert!(ctx.remaining() > Duration::from_secs(60));
    }
}
