use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use shared_models::error::AppError;
use shared_models::session::SessionContext;

use crate::session::SessionStore;

/// Session attached to requests on routes that work with or without a login.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<SessionContext>);

pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_value = headers.get("Authorization")?.to_str().ok()?;
    auth_value
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

// Rejects the request unless it carries a live session id.
pub async fn session_middleware(
    State(sessions): State<SessionStore>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let session_id = bearer_token(request.headers()).ok_or(AppError::Unauthenticated)?;

    let session = sessions
        .load(&session_id)
        .await
        .ok_or(AppError::Unauthenticated)?;

    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

// Never rejects; handlers decide what an anonymous caller may do.
pub async fn optional_session_middleware(
    State(sessions): State<SessionStore>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let session = match bearer_token(request.headers()) {
        Some(session_id) => sessions.load(&session_id).await,
        None => None,
    };

    request.extensions_mut().insert(MaybeSession(session));

    next.run(request).await
}

pub fn require_doctor(session: &SessionContext) -> Result<(), AppError> {
    if session.is_doctor() {
        Ok(())
    } else {
        Err(AppError::Forbidden("This page is only available to doctors".to_string()))
    }
}
