use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use super::is_public_path;
use crate::auth::Principal;
use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Authentication stage.
///
/// Extracts and verifies the bearer token, resolves the principal, and
/// publishes it into request extensions. Never rejects: every failure mode
/// is logged and the request continues unauthenticated, to be turned away
/// by the authorization layer if it reaches a protected handler.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if is_public_path(request.uri().path()) {
        return next.run(request).await;
    }

    let Some(token) = bearer_token(request.headers(), &state.config.security) else {
        return next.run(request).await;
    };

    match resolve_principal(&state, &token).await {
        Ok(principal) => {
            tracing::debug!(user = principal.id, "request authenticated");
            request.extensions_mut().insert(principal);
        }
        Err(reason) => {
            tracing::debug!(%reason, "request continues unauthenticated");
        }
    }

    next.run(request).await
}

/// Extract the raw token from the configured header: `"<scheme> <token>"`.
fn bearer_token(headers: &HeaderMap, security: &SecurityConfig) -> Option<String> {
    let value = headers.get(security.auth_header.as_str())?.to_str().ok()?;
    let prefix = format!("{} ", security.auth_scheme);
    let token = value.strip_prefix(&prefix)?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

async fn resolve_principal(state: &AppState, token: &str) -> Result<Principal, String> {
    let claims = state.codec.verify(token).map_err(|e| e.to_string())?;
    if claims.is_refresh() {
        return Err("refresh token presented where an access token is expected".to_string());
    }
    let user_id = claims.subject().map_err(|e| e.to_string())?;
    state
        .resolver
        .load_by_id(user_id)
        .await
        .map_err(|e| e.to_string())
}

/// Authorization-layer extractor: the uniform rejection point for requests
/// that arrived at a protected handler without a usable principal.
pub struct AuthPrincipal(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for AuthPrincipal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let path = parts.uri.path().to_string();

        let principal = parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("authentication required").with_path(path.clone()))?;

        if !principal.is_active() {
            tracing::warn!(user = principal.id, status = principal.status.as_str(), "inactive account rejected");
            return Err(ApiError::forbidden("account is not active").with_path(path));
        }

        Ok(AuthPrincipal(principal))
    }
}
