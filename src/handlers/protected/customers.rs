use axum::extract::{OriginalUri, State};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthPrincipal};
use crate::state::AppState;
use crate::store::Customer;

/// GET /api/v1/customers - tenant-scoped customer listing.
///
/// The store consults the tenant context itself; an unbound tenant at this
/// point surfaces as a tenant-isolation rejection, never as unscoped rows.
pub async fn list(
    AuthPrincipal(_principal): AuthPrincipal,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Vec<Customer>> {
    let customers = state
        .customers
        .list()
        .await
        .map_err(|e| ApiError::from(e).with_path(uri.path()))?;

    Ok(ApiResponse::success(customers))
}
