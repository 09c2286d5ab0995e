use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::is_tenant_exempt;
use crate::auth::Principal;
use crate::error::ApiError;
use crate::state::AppState;
use crate::tenant::TenantContext;

/// Tenant propagation stage.
///
/// Runs strictly after authentication (the pipeline declares the order).
/// Binds the principal's tenant for the span of the downstream chain and
/// activates the data layer's row filter. The binding is scope-based, so
/// teardown happens on every exit path.
pub async fn bind_tenant(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if is_tenant_exempt(request.uri().path()) {
        return next.run(request).await;
    }

    // Get the principal the authentication stage may have published
    let principal = request.extensions().get::<Principal>().cloned();

    let tenant_id = match principal {
        Some(principal) => match principal.tenant_id {
            Some(id) => {
                if let Err(e) = state.tenant_filter.activate(id).await {
                    if state.config.security.strict_tenant_filter {
                        tracing::error!(tenant = id, error = %e, "row-filter activation failed, rejecting request");
                        return ApiError::service_unavailable("tenant filter could not be activated")
                            .with_path(request.uri().path().to_string())
                            .into_response();
                    }
                    tracing::warn!(tenant = id, error = %e, "row-filter activation failed, continuing without it");
                }
                Some(id)
            }
            None if principal.is_super_admin() => None,
            None => {
                // A real user with no assigned tenant is a configuration
                // anomaly; any tenant-scoped access they attempt fails at
                // the get-or-fail accessor.
                tracing::warn!(user = principal.id, "authenticated user has no tenant assignment");
                None
            }
        },
        None => None,
    };

    TenantContext::scope(tenant_id, next.run(request)).await
}
