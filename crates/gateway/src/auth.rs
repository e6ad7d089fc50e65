use crate::{error::ApiError, state::AppState};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::fmt;

/// Shared bearer secret. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Middleware: require `Authorization: Bearer <key>` when a key is configured.
pub async fn require_api_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(expected) = state.api_key.as_deref() {
        let authorized = extract_bearer_token(&req).is_some_and(|token| expected.matches(token));
        if !authorized {
            tracing::warn!(path = %req.uri().path(), "Rejected request with missing or invalid API key");
            return Err(ApiError::Unauthorized);
        }
    }

    Ok(next.run(req).await)
}

/// Token of a `Bearer` credential. The scheme is case-insensitive, the token
/// is taken verbatim.
fn extract_bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(auth: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/predict");
        if let Some(value) = auth {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_bearer_token(&request(Some("Bearer abc123"))), Some("abc123"));
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(extract_bearer_token(&request(Some("bearer abc123"))), Some("abc123"));
        assert_eq!(extract_bearer_token(&request(Some("BEARER abc123"))), Some("abc123"));
    }

    #[test]
    fn rejects_other_schemes() {
        assert_eq!(extract_bearer_token(&request(Some("Basic abc123"))), None);
        assert_eq!(extract_bearer_token(&request(Some("abc123"))), None);
        assert_eq!(extract_bearer_token(&request(None)), None);
    }

    #[test]
    fn key_comparison_is_exact() {
        let key = ApiKey::new("abc123");
        assert!(key.matches("abc123"));
        assert!(!key.matches("abc1234"));
        assert!(!key.matches("ABC123"));
        assert!(!key.matches(""));
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let rendered = format!("{:?}", ApiKey::new("abc123"));
        assert!(!rendered.contains("abc123"));
    }
}
