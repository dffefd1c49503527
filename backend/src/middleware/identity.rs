//! Caller identity
//!
//! Authentication happens upstream; this service only reads the opaque user
//! id the authenticating proxy forwards.

use std::convert::Infallible;

use axum::http::{request::Parts, HeaderMap};

use crate::AppState;

/// Header carrying the authenticated user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Id of the user making the request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentUser(pub String);

impl CurrentUser {
    /// Header value when present and non-blank, otherwise the configured default
    pub fn from_headers(headers: &HeaderMap, default_user_id: &str) -> Self {
        let user_id = headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(default_user_id);

        CurrentUser(user_id.to_string())
    }
}

#[axum::async_trait]
impl axum::extract::FromRequestParts<AppState> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser::from_headers(
            &parts.headers,
            &state.config.auth.default_user_id,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_header_wins_over_default() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("farmer-42"));
        assert_eq!(
            CurrentUser::from_headers(&headers, "user-id-placeholder"),
            CurrentUser("farmer-42".to_string())
        );
    }

    #[test]
    fn test_missing_or_blank_header_uses_default() {
        let mut headers = HeaderMap::new();
        assert_eq!(
            CurrentUser::from_headers(&headers, "user-id-placeholder").0,
            "user-id-placeholder"
        );

        headers.insert(USER_ID_HEADER, HeaderValue::from_static("   "));
        assert_eq!(
            CurrentUser::from_headers(&headers, "user-id-placeholder").0,
            "user-id-placeholder"
        );
    }
}
