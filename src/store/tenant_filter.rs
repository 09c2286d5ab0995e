use async_trait::async_trait;
use sqlx::PgPool;

use super::StoreError;
use crate::tenant::TenantId;

/// Row-level tenant filter activation hook on the data-access layer.
///
/// Activation is scoped to the current request; the propagation stage
/// decides whether a failure here is fatal (strict mode) or degraded-mode.
#[async_trait]
pub trait TenantFilter: Send + Sync {
    async fn activate(&self, tenant_id: TenantId) -> Result<(), StoreError>;
}

/// Postgres implementation backed by `set_config`, which row-level security
/// policies read via `current_setting('app.current_tenant')`.
pub struct PgTenantFilter {
    pool: PgPool,
}

impl PgTenantFilter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantFilter for PgTenantFilter {
    async fn activate(&self, tenant_id: TenantId) -> Result<(), StoreError> {
        sqlx::query("SELECT set_config('app.current_tenant', $1, false)")
            .bind(tenant_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
