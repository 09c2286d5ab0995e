use axum::{
    extract::{OriginalUri, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::{Principal, ResolveError, Role};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::tenant::TenantId;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub tenant_id: Option<TenantId>,
    pub tenant_code: Option<String>,
    pub role: Role,
}

impl From<&Principal> for UserInfo {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id,
            username: principal.username.clone(),
            email: principal.email.clone(),
            first_name: principal.first_name.clone(),
            last_name: principal.last_name.clone(),
            tenant_id: principal.tenant_id,
            tenant_code: principal.tenant_code.clone(),
            role: principal.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: UserInfo,
}

/// POST /api/v1/auth/login - authenticate credentials and mint both tokens.
///
/// Lookup is username-first with email fallback. Credential failures are a
/// uniform 401 that does not reveal whether the account exists.
pub async fn login(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Json(body): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let path = uri.path();

    let principal = match state
        .resolver
        .load_by_username_or_email(&body.username_or_email)
        .await
    {
        Ok(principal) => principal,
        Err(ResolveError::NotFound(_)) => {
            tracing::warn!(login = %body.username_or_email, "login failed: unknown account");
            return Err(ApiError::unauthorized("invalid credentials").with_path(path));
        }
        Err(ResolveError::Store(e)) => return Err(ApiError::from(e).with_path(path)),
    };

    if !principal.verify_password(&body.password) {
        tracing::warn!(user = principal.id, "login failed: bad password");
        return Err(ApiError::unauthorized("invalid credentials").with_path(path));
    }

    if !principal.is_active() {
        tracing::warn!(user = principal.id, status = principal.status.as_str(), "login rejected: inactive account");
        return Err(ApiError::forbidden("account is not active").with_path(path));
    }

    let access_token = mint(path, || state.codec.issue_access_token(&principal))?;
    let refresh_token = mint(path, || state.codec.issue_refresh_token(&principal))?;

    tracing::info!(user = principal.id, tenant = ?principal.tenant_id, "login succeeded");

    Ok(ApiResponse::success(LoginResponse {
        access_token,
        refresh_token,
        token_type: "Bearer",
        expires_in: state.codec.expires_in_secs(),
        user: UserInfo::from(&principal),
    }))
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// POST /api/v1/auth/refresh - trade a refresh token for a new access token.
///
/// Only tokens carrying the `type = "refresh"` discriminator are accepted
/// here; refresh tokens themselves are minted at login only.
pub async fn refresh(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Json(body): Json<RefreshRequest>,
) -> ApiResult<RefreshResponse> {
    let path = uri.path();

    let claims = state.codec.verify(&body.refresh_token).map_err(|e| {
        tracing::debug!(reason = %e, "refresh rejected");
        ApiError::unauthorized("invalid refresh token").with_path(path)
    })?;

    if !claims.is_refresh() {
        tracing::warn!("access token presented at the refresh endpoint");
        return Err(ApiError::unauthorized("invalid refresh token").with_path(path));
    }

    let user_id = claims
        .subject()
        .map_err(|_| ApiError::unauthorized("invalid refresh token").with_path(path))?;

    let principal = match state.resolver.load_by_id(user_id).await {
        Ok(principal) => principal,
        Err(ResolveError::NotFound(_)) => {
            return Err(ApiError::unauthorized("invalid refresh token").with_path(path))
        }
        Err(ResolveError::Store(e)) => return Err(ApiError::from(e).with_path(path)),
    };

    if !principal.is_active() {
        return Err(ApiError::forbidden("account is not active").with_path(path));
    }

    let access_token = mint(path, || state.codec.issue_access_token(&principal))?;

    Ok(ApiResponse::success(RefreshResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.codec.expires_in_secs(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// POST /api/v1/auth/forgot-password - acknowledge a reset request.
///
/// The response is identical whether or not the account exists. Mail
/// delivery is handled outside this service.
pub async fn forgot_password(
    Json(body): Json<ForgotPasswordRequest>,
) -> ApiResponse<Value> {
    tracing::info!(email = %body.email, "password reset requested");

    ApiResponse::success(json!({
        "message": "If the account exists, reset instructions have been sent."
    }))
}

fn mint(
    path: &str,
    issue: impl FnOnce() -> Result<String, crate::auth::TokenError>,
) -> Result<String, ApiError> {
    issue().map_err(|e| {
        tracing::error!("token mint failed: {e}");
        ApiError::internal_server_error("could not issue token").with_path(path)
    })
}
