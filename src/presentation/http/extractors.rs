//! Custom Extractors
//!
//! Axum extractors for caller identity and request parsing.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use crate::shared::error::AppError;

/// Header carrying the caller's username
pub const USERNAME_HEADER: &str = "x-username";
/// Header carrying the caller's display name
pub const NICKNAME_HEADER: &str = "x-nickname";

/// Caller identity supplied by the fronting identity provider.
///
/// The username is trusted verbatim; the nickname falls back to the
/// username when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub nickname: String,
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let username = header_text(&parts.headers, USERNAME_HEADER)
            .ok_or_else(|| AppError::Unauthorized("Missing X-Username header".into()))?;
        let nickname =
            header_text(&parts.headers, NICKNAME_HEADER).unwrap_or_else(|| username.clone());

        Ok(Identity { username, nickname })
    }
}

/// Trimmed UTF-8 header value, `None` when missing or blank.
fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Parse a numeric path segment.
pub fn parse_room_id(raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid room ID".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request};

    async fn extract(request: Request<()>) -> Result<Identity, AppError> {
        let (mut parts, _) = request.into_parts();
        Identity::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_nickname_defaults_to_username() {
        let request = Request::builder()
            .header(USERNAME_HEADER, "alice")
            .body(())
            .unwrap();

        let identity = extract(request).await.unwrap();

        assert_eq!(identity.nickname, "alice");
    }

    #[tokio::test]
    async fn test_utf8_nickname() {
        let mut request = Request::builder()
            .header(USERNAME_HEADER, "kim")
            .body(())
            .unwrap();
        request.headers_mut().insert(
            NICKNAME_HEADER,
            HeaderValue::from_bytes("민수".as_bytes()).unwrap(),
        );

        let identity = extract(request).await.unwrap();

        assert_eq!(identity.nickname, "민수");
    }

    #[tokio::test]
    async fn test_missing_username_is_unauthorized() {
        let request = Request::builder()
            .header(USERNAME_HEADER, "  ")
            .body(())
            .unwrap();

        assert!(matches!(extract(request).await, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_parse_room_id() {
        assert_eq!(parse_room_id("42").unwrap(), 42);
        assert!(matches!(parse_room_id("abc"), Err(AppError::BadRequest(_))));
    }
}
