//! Session middleware
//!
//! Resolves the bearer token once per request into a [`CurrentUser`] that
//! handlers receive explicitly. The token itself is kept so it can be
//! forwarded to the ERP backend.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::Value;
use shared::{EntityId, Language, SessionUser};

use crate::error::AppError;
use crate::AppState;

/// The signed-in user plus the raw token used for upstream calls
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub user: SessionUser,
    pub token: String,
}

impl CurrentUser {
    pub fn id(&self) -> EntityId {
        self.user.id
    }

    pub fn display_name(&self) -> &str {
        &self.user.display_name
    }
}

/// Claims issued by the ERP backend
#[derive(Debug, Deserialize)]
struct Claims {
    /// Numeric or string user id
    sub: Value,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    lang: Option<String>,
}

fn user_id(sub: &Value) -> Option<EntityId> {
    match sub {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Decode and validate a session token
pub fn decode_session(token: &str, secret: &str) -> Result<SessionUser, AppError> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::InvalidToken,
    })?;

    let id = user_id(&claims.sub).ok_or(AppError::InvalidToken)?;
    let display_name = claims
        .name
        .or(claims.username)
        .unwrap_or_else(|| format!("user-{}", id));
    let language = match claims.lang.as_deref() {
        Some("en") => Language::English,
        _ => Language::Arabic,
    };

    Ok(SessionUser {
        id,
        display_name,
        language,
    })
}

/// Reject requests without a valid session and attach the user to the request
pub async fn session_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or_else(|| {
        AppError::Unauthorized("Missing or invalid Authorization header".to_string())
    })?;

    let token = bearer.token().to_string();
    let user = decode_session(&token, &state.config.session.jwt_secret)?;
    tracing::debug!(user_id = user.id, "Session resolved");

    request
        .extensions_mut()
        .insert(CurrentUser { user, token });
    Ok(next.run(request).await)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn token(claims: Value, secret: &str) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn future_exp() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[test]
    fn test_decode_numeric_subject() {
        let t = token(
            json!({"sub": 7, "name": "Huda", "lang": "en", "exp": future_exp()}),
            "s",
        );
        let user = decode_session(&t, "s").unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.display_name, "Huda");
        assert_eq!(user.language, Language::English);
    }

    #[test]
    fn test_decode_string_subject_defaults() {
        let t = token(json!({"sub": "12", "exp": future_exp()}), "s");
        let user = decode_session(&t, "s").unwrap();
        assert_eq!(user.id, 12);
        assert_eq!(user.display_name, "user-12");
        assert_eq!(user.language, Language::Arabic);
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let t = token(json!({"sub": 1, "exp": future_exp()}), "a");
        assert!(matches!(decode_session(&t, "b"), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_expired_token() {
        let t = token(json!({"sub": 1, "exp": 1_000_000}), "s");
        assert!(matches!(decode_session(&t, "s"), Err(AppError::TokenExpired)));
    }

    #[test]
    fn test_non_numeric_subject_is_invalid() {
        let t = token(json!({"sub": "abc", "exp": future_exp()}), "s");
        assert!(matches!(decode_session(&t, "s"), Err(AppError::InvalidToken)));
    }
}
