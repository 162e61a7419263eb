use std::str::FromStr;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::context::{Role, SessionContext};
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

fn reject(status: StatusCode, code: &str) -> Response {
    (status, Json(json!({ "error": code }))).into_response()
}

fn bearer_token(req: &Request) -> Result<&str, Response> {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return Err(reject(StatusCode::UNAUTHORIZED, "missing_authorization"));
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(reject(StatusCode::UNAUTHORIZED, "bad_authorization"));
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(reject(StatusCode::UNAUTHORIZED, "unsupported_scheme"));
    };
    Ok(token)
}

/// Verifies the bearer token and builds the caller's context. The raw token
/// is kept so the grading call can run as the applicant.
pub fn session_from_token(token: &str, secret: &str) -> Result<SessionContext, Response> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|_| reject(StatusCode::UNAUTHORIZED, "invalid_token"))?;

    let user_id = Uuid::parse_str(&data.claims.sub)
        .map_err(|_| reject(StatusCode::UNAUTHORIZED, "invalid_subject"))?;
    let role = data
        .claims
        .role
        .as_deref()
        .and_then(|r| Role::from_str(r).ok())
        .ok_or_else(|| reject(StatusCode::FORBIDDEN, "forbidden"))?;

    Ok(SessionContext::new(user_id, role, token))
}

async fn authorize(state: AppState, mut req: Request, next: Next, allowed: &[Role]) -> Response {
    let ctx = match bearer_token(&req).and_then(|token| session_from_token(token, &state.jwt_secret)) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if !allowed.is_empty() && !allowed.contains(&ctx.role) {
        tracing::warn!(user_id = %ctx.user_id, role = ctx.role.as_str(), "role not allowed");
        return reject(StatusCode::FORBIDDEN, "forbidden");
    }
    req.extensions_mut().insert(ctx);
    next.run(req).await
}

pub async fn require_authenticated(State(state): State<AppState>, req: Request, next: Next) -> Response {
    authorize(state, req, next, &[]).await
}

pub async fn require_applicant(State(state): State<AppState>, req: Request, next: Next) -> Response {
    authorize(state, req, next, &[Role::Applicant]).await
}

pub async fn require_recruiter(State(state): State<AppState>, req: Request, next: Next) -> Response {
    authorize(state, req, next, &[Role::Recruiter]).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn token(sub: &str, role: Option<&str>, exp_offset: i64) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            exp: (chrono::Utc::now().timestamp() + exp_offset) as usize,
            role: role.map(str::to_string),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
    }

    #[test]
    fn valid_token_becomes_session_context() {
        let user_id = Uuid::new_v4();
        let raw = token(&user_id.to_string(), Some("applicant"), 3600);
        let ctx = session_from_token(&raw, SECRET).unwrap();
        assert_eq!(ctx.user_id, user_id);
        assert_eq!(ctx.role, Role::Applicant);
        assert_eq!(ctx.access_token, raw);
    }

    #[test]
    fn expired_or_foreign_tokens_are_unauthorized() {
        let user_id = Uuid::new_v4().to_string();
        let expired = token(&user_id, Some("applicant"), -3600);
        assert_eq!(
            session_from_token(&expired, SECRET).unwrap_err().status(),
            StatusCode::UNAUTHORIZED
        );

        let raw = token(&user_id, Some("applicant"), 3600);
        assert_eq!(
            session_from_token(&raw, "other-secret").unwrap_err().status(),
            StatusCode::UNAUTHORIZED
        );

        let bad_sub = token("not-a-uuid", Some("applicant"), 3600);
        assert_eq!(
            session_from_token(&bad_sub, SECRET).unwrap_err().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn missing_or_unknown_role_is_forbidden() {
        let user_id = Uuid::new_v4().to_string();
        for role in [None, Some("admin")] {
            let raw = token(&user_id, role, 3600);
            assert_eq!(
                session_from_token(&raw, SECRET).unwrap_err().status(),
                StatusCode::FORBIDDEN
            );
        }
    }
}
