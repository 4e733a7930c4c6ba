//! Axum extractor for RequestContext.

use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use uuid::Uuid;

use polly_core::poll::UserId;

use super::types::{RequestContext, RequestId};
use crate::state::AppState;

fn extract_request_id(headers: &HeaderMap) -> RequestId {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .map(RequestId::from_uuid)
        .unwrap_or_else(RequestId::new)
}

/// Reads the caller identity set by the front proxy. Blank values count as absent.
fn extract_voter(headers: &HeaderMap, header_name: &str) -> Option<UserId> {
    headers
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(UserId::new)
}

impl<S> FromRequestParts<S> for RequestContext
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let request_id = extract_request_id(&parts.headers);
        let voter = extract_voter(&parts.headers, &app_state.identity_header);

        Ok(RequestContext { voter, request_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_request_id_from_header() {
        let mut headers = HeaderMap::new();
        let id = "550e8400-e29b-41d4-a716-446655440000";
        headers.insert("x-request-id", id.parse().unwrap());

        let request_id = extract_request_id(&headers);
        assert_eq!(request_id.to_string(), id);
    }

    #[test]
    fn test_extract_request_id_generates_when_missing() {
        let headers = HeaderMap::new();
        let request_id = extract_request_id(&headers);

        Uuid::parse_str(&request_id.to_string()).expect("Should be valid UUID");
    }

    #[test]
    fn test_extract_request_id_generates_when_invalid() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", "not-a-uuid".parse().unwrap());

        let request_id = extract_request_id(&headers);

        Uuid::parse_str(&request_id.to_string()).expect("Should be valid UUID");
    }

    #[test]
    fn test_extract_voter_from_configured_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-user", " alice ".parse().unwrap());

        assert_eq!(
            extract_voter(&headers, "x-forwarded-user"),
            Some(UserId::new("alice"))
        );
        assert_eq!(extract_voter(&headers, "x-user-id"), None);
    }

    #[test]
    fn test_extract_voter_blank_is_anonymous() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", "   ".parse().unwrap());

        assert_eq!(extract_voter(&headers, "x-user-id"), None);
    }
}
