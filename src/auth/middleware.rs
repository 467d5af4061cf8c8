//! Authentication middleware stages.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::error::GatewayError;
use crate::http::server::AppState;

/// Pull the raw token out of `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}

/// Terminate the pipeline unless a valid token is presented.
///
/// Missing token → 401. Invalid or expired token → 403. Valid token →
/// AuthContext attached and the pipeline continues.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        tracing::warn!(path = %request.uri().path(), "Access attempt without token");
        return GatewayError::MissingToken.into_response();
    };

    match state.validator.verify(token) {
        Ok(ctx) => {
            tracing::debug!(
                subject = ctx.subject.as_deref().unwrap_or("-"),
                path = %request.uri().path(),
                "Token validated"
            );
            request.extensions_mut().insert(ctx);
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!(path = %request.uri().path(), error = %e, "Invalid token attempt");
            GatewayError::InvalidToken.into_response()
        }
    }
}

/// Attach an AuthContext when a valid token is presented, but never
/// terminate: absent or invalid tokens continue unauthenticated. Supports
/// routes that personalize for logged-in users while staying public.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(request.headers()) {
        match state.validator.verify(token) {
            Ok(ctx) => {
                request.extensions_mut().insert(ctx);
            }
            Err(_) => {
                tracing::debug!(path = %request.uri().path(), "Invalid token in optional auth");
            }
        }
    }

    next.run(request).await
}
