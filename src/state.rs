use std::sync::Arc;

use chrono::Duration;
use sqlx::PgPool;

use crate::auth::{PrincipalResolver, TokenCodec};
use crate::config::AppConfig;
use crate::middleware::RateLimiter;
use crate::store::{
    CustomerStore, PgCustomerStore, PgTenantFilter, PgUserStore, TenantFilter, UserStore,
};

/// Shared application state handed to the pipeline stages and handlers.
/// Store collaborators sit behind traits so tests can substitute in-memory
/// implementations.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub customers: Arc<dyn CustomerStore>,
    pub tenant_filter: Arc<dyn TenantFilter>,
    pub resolver: PrincipalResolver,
    pub codec: Arc<TokenCodec>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        customers: Arc<dyn CustomerStore>,
        tenant_filter: Arc<dyn TenantFilter>,
    ) -> Self {
        let codec = TokenCodec::new(
            &config.security.jwt_secret,
            Duration::minutes(config.security.access_token_minutes),
            Duration::days(config.security.refresh_token_days),
        );
        let limiter = RateLimiter::new(config.rate_limit.clone());
        let resolver = PrincipalResolver::new(users.clone());

        Self {
            config: Arc::new(config),
            users,
            customers,
            tenant_filter,
            resolver,
            codec: Arc::new(codec),
            limiter: Arc::new(limiter),
        }
    }

    /// Production wiring: every collaborator backed by the same Postgres pool.
    pub fn postgres(config: AppConfig, pool: PgPool) -> Self {
        Self::new(
            config,
            Arc::new(PgUserStore::new(pool.clone())),
            Arc::new(PgCustomerStore::new(pool.clone())),
            Arc::new(PgTenantFilter::new(pool)),
        )
    }
}
