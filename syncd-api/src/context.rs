//! # Request Context
//!
//! Carries the per-request identity and logger through every handler and
//! collaborator call. Deliberately a plain value threaded explicitly
//! (stored in `axum`'s request extensions by the request-id middleware,
//! then extracted by handlers) rather than a thread-local or module-level
//! global — every function that needs it takes it as a parameter.

use syncd_shared::RequestId;
use tracing::Span;

/// Request-scoped identity and logger.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub span: Span,
}

impl RequestContext {
    #[must_use]
    pub fn new(request_id: RequestId, span: Span) -> Self {
        Self { request_id, span }
    }
}
