use async_trait::async_trait;
use serde::Serialize;
use sqlx::{PgPool, Row};

use super::StoreError;
use crate::tenant::TenantContext;

#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Tenant-scoped customer reads. Implementations consult the tenant
/// context themselves, so a caller that reaches the store without a bound
/// tenant gets the isolation error instead of unscoped rows.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Customer>, StoreError>;
}

pub struct PgCustomerStore {
    pool: PgPool,
}

impl PgCustomerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerStore for PgCustomerStore {
    async fn list(&self) -> Result<Vec<Customer>, StoreError> {
        let tenant_id = TenantContext::require()?;

        let rows = sqlx::query(
            r#"
            SELECT id, name, email, phone
            FROM customers
            WHERE tenant_id = $1
            AND deleted_at IS NULL
            ORDER BY name
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Customer {
                id: row.get("id"),
                name: row.get("name"),
                email: row.get("email"),
                phone: row.get("phone"),
            })
            .collect())
    }
}
