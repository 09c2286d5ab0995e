//! Request-scoped current-tenant register.
//!
//! The tenant binding lives in a tokio task-local, set by the propagation
//! stage for exactly the span of the downstream chain. Two concurrent
//! requests never observe each other's tenant, and teardown is structural:
//! leaving the scope clears the binding on success, error, and panic paths
//! alike.

use thiserror::Error;

pub type TenantId = i64;

tokio::task_local! {
    static CURRENT_TENANT: Option<TenantId>;
}

#[derive(Debug, Error, PartialEq)]
pub enum TenantError {
    #[error("no tenant is bound to the current request")]
    Unbound,
}

pub struct TenantContext;

impl TenantContext {
    /// Run `fut` with the given tenant bound for its entire duration.
    ///
    /// The binding is dropped when the future completes, however it
    /// completes.
    pub async fn scope<F>(tenant: Option<TenantId>, fut: F) -> F::Output
    where
        F: std::future::Future,
    {
        CURRENT_TENANT.scope(tenant, fut).await
    }

    /// The tenant bound to the current request, if any.
    pub fn current() -> Option<TenantId> {
        CURRENT_TENANT.try_with(|t| *t).ok().flatten()
    }

    /// Get-or-fail accessor for tenant-scoped data access.
    ///
    /// Reaching this without a bound tenant means a tenant-scoped query was
    /// about to run unscoped, so the failure is logged as an isolation
    /// violation rather than a routine validation error.
    pub fn require() -> Result<TenantId, TenantError> {
        Self::current().ok_or_else(|| {
            tracing::error!(
                target: "caterly_api::tenant_isolation",
                "tenant-scoped access attempted without a bound tenant"
            );
            TenantError::Unbound
        })
    }
}
