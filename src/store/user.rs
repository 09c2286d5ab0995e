use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::StoreError;
use crate::auth::principal::{AccountStatus, Principal, Role};
use crate::tenant::TenantId;

/// Durable user record as read from storage. The pipeline never writes it.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub tenant_id: Option<TenantId>,
    pub tenant_code: Option<String>,
    pub role: Role,
    pub status: AccountStatus,
}

impl From<UserRecord> for Principal {
    fn from(record: UserRecord) -> Self {
        Principal::new(
            record.id,
            record.username,
            record.email,
            record.password_hash,
            record.first_name,
            record.last_name,
            record.tenant_id,
            record.tenant_code,
            record.role,
            record.status,
        )
    }
}

/// User-lookup collaborator consumed by the principal resolver and the
/// login surface.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, StoreError>;
    /// Liveness probe used by the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_where(&self, column: &str, value: &str) -> Result<Option<UserRecord>, StoreError> {
        let query = format!(
            r#"
            SELECT
                u.id, u.username, u.email, u.password_hash,
                u.first_name, u.last_name, u.tenant_id,
                t.code AS tenant_code, u.role, u.status
            FROM users u
            LEFT JOIN tenants t ON t.id = u.tenant_id
            WHERE u.{column} = $1
            AND u.deleted_at IS NULL
            "#
        );

        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(user_from_row).transpose()
    }
}

fn user_from_row(row: PgRow) -> Result<UserRecord, StoreError> {
    let role: String = row.get("role");
    let status: String = row.get("status");

    Ok(UserRecord {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        tenant_id: row.get("tenant_id"),
        tenant_code: row.get("tenant_code"),
        role: role.parse().map_err(StoreError::Corrupt)?,
        status: status.parse().map_err(StoreError::Corrupt)?,
    })
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        self.find_where("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        self.find_where("email", email).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT
                u.id, u.username, u.email, u.password_hash,
                u.first_name, u.last_name, u.tenant_id,
                t.code AS tenant_code, u.role, u.status
            FROM users u
            LEFT JOIN tenants t ON t.id = u.tenant_id
            WHERE u.id = $1
            AND u.deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(user_from_row).transpose()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
