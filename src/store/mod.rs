pub mod customer;
pub mod tenant_filter;
pub mod user;

pub use customer::{Customer, CustomerStore, PgCustomerStore};
pub use tenant_filter::{PgTenantFilter, TenantFilter};
pub use user::{PgUserStore, UserRecord, UserStore};

use thiserror::Error;

use crate::tenant::TenantError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("corrupt record: {0}")]
    Corrupt(String),
    #[error(transparent)]
    TenantUnbound(#[from] TenantError),
}
