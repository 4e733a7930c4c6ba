//! Pure types for request-scoped context.

use polly_core::poll::UserId;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a request, used for tracing and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The request carried no caller identity.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Missing caller identity")]
pub struct MissingIdentity;

/// Request-scoped context available to all handlers.
///
/// Complements `AppState` (application-scoped) with request-specific data.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Caller identity from the proxy header (None if anonymous).
    pub voter: Option<UserId>,
    /// Unique request identifier for tracing.
    pub request_id: RequestId,
}

impl RequestContext {
    /// The caller's identity, for routes that need one.
    pub fn require_voter(&self) -> Result<&UserId, MissingIdentity> {
        self.voter.as_ref().ok_or(MissingIdentity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_voter_present() {
        let ctx = RequestContext {
            voter: Some(UserId::new("alice")),
            request_id: RequestId::new(),
        };
        assert_eq!(ctx.require_voter().unwrap(), &UserId::new("alice"));
    }

    #[test]
    fn test_require_voter_missing() {
        let ctx = RequestContext {
            voter: None,
            request_id: RequestId::new(),
        };
        assert_eq!(ctx.require_voter(), Err(MissingIdentity));
    }
}
