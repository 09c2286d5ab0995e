use serde::Serialize;

use crate::auth::Role;
use crate::middleware::{ApiResponse, AuthPrincipal};
use crate::tenant::{TenantContext, TenantId};

#[derive(Debug, Serialize)]
pub struct WhoamiResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// The tenant bound by the propagation stage for this request;
    /// null for super-administrators.
    pub tenant_id: Option<TenantId>,
    pub tenant_code: Option<String>,
    pub role: Role,
    pub authorities: Vec<String>,
}

/// GET /api/v1/auth/whoami - the resolved principal and its bound tenant.
pub async fn whoami(AuthPrincipal(principal): AuthPrincipal) -> ApiResponse<WhoamiResponse> {
    ApiResponse::success(WhoamiResponse {
        id: principal.id,
        username: principal.username.clone(),
        email: principal.email.clone(),
        first_name: principal.first_name.clone(),
        last_name: principal.last_name.clone(),
        tenant_id: TenantContext::current(),
        tenant_code: principal.tenant_code.clone(),
        role: principal.role,
        authorities: principal.authorities(),
    })
}
