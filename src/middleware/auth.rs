use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::Serialize;

use crate::auth::{self, TokenError};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user context resolved by the `protect` middleware.
/// Request-scoped; downstream handlers read it from request extensions.
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct CurrentUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Bearer-token gate for protected routes.
///
/// Extracts the token from the Authorization header, verifies it, then
/// re-resolves the subject against the users table - a token for a since
/// deleted account is rejected. Persistence failures during the lookup are
/// 500s, not 401s.
pub async fn protect(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&headers).map_err(ApiError::unauthorized)?;

    let claims = auth::verify_token(&token).map_err(|e| match e {
        TokenError::MissingSecret => ApiError::from(e),
        _ => ApiError::unauthorized("invalid or expired token"),
    })?;

    let user = sqlx::query_as::<_, CurrentUser>("SELECT id, name, email FROM users WHERE id = $1")
        .bind(claims.sub)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| {
            tracing::warn!("token subject {} no longer exists", claims.sub);
            ApiError::unauthorized("unknown user")
        })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn bearer_token(headers: &HeaderMap) -> Result<String, &'static str> {
    let auth_header = headers
        .get("authorization")
        .ok_or("missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "invalid Authorization header")?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or("Authorization header must use the Bearer scheme")?;

    if token.trim().is_empty() {
        return Err("empty bearer token");
    }
    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn rejects_missing_header() {
        assert!(bearer_token(&HeaderMap::new()).is_err());
    }

    #[test]
    fn rejects_non_bearer_scheme() {
        let headers = headers_with("Basic dXNlcjpwYXNz");
        assert!(bearer_token(&headers).is_err());
    }

    #[test]
    fn rejects_empty_token() {
        let headers = headers_with("Bearer   ");
        assert!(bearer_token(&headers).is_err());
    }
}
