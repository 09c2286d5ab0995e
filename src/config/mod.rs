use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub security: SecurityConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
    /// Request header carrying the bearer credential.
    pub auth_header: String,
    /// Scheme prefix expected before the token, e.g. "Bearer".
    pub auth_scheme: String,
    /// When true, a failed row-filter activation rejects the request
    /// instead of letting it proceed unfiltered.
    pub strict_tenant_filter: bool,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub authenticated_per_minute: u32,
    pub unauthenticated_per_minute: u32,
    /// Reserved tier; bucket selection currently branches only on
    /// authenticated vs unauthenticated keys.
    pub admin_per_minute: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_ACCESS_TOKEN_MINUTES") {
            self.security.access_token_minutes = v.parse().unwrap_or(self.security.access_token_minutes);
        }
        if let Ok(v) = env::var("SECURITY_REFRESH_TOKEN_DAYS") {
            self.security.refresh_token_days = v.parse().unwrap_or(self.security.refresh_token_days);
        }
        if let Ok(v) = env::var("SECURITY_AUTH_HEADER") {
            self.security.auth_header = v.to_lowercase();
        }
        if let Ok(v) = env::var("SECURITY_AUTH_SCHEME") {
            self.security.auth_scheme = v;
        }
        if let Ok(v) = env::var("SECURITY_STRICT_TENANT_FILTER") {
            self.security.strict_tenant_filter = v.parse().unwrap_or(self.security.strict_tenant_filter);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Rate limit overrides
        if let Ok(v) = env::var("RATE_LIMIT_ENABLED") {
            self.rate_limit.enabled = v.parse().unwrap_or(self.rate_limit.enabled);
        }
        if let Ok(v) = env::var("RATE_LIMIT_AUTHENTICATED_PER_MINUTE") {
            self.rate_limit.authenticated_per_minute =
                v.parse().unwrap_or(self.rate_limit.authenticated_per_minute);
        }
        if let Ok(v) = env::var("RATE_LIMIT_UNAUTHENTICATED_PER_MINUTE") {
            self.rate_limit.unauthenticated_per_minute =
                v.parse().unwrap_or(self.rate_limit.unauthenticated_per_minute);
        }
        if let Ok(v) = env::var("RATE_LIMIT_ADMIN_PER_MINUTE") {
            self.rate_limit.admin_per_minute = v.parse().unwrap_or(self.rate_limit.admin_per_minute);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            security: SecurityConfig {
                jwt_secret: "dev-secret-change-me".to_string(),
                access_token_minutes: 60,
                refresh_token_days: 7,
                auth_header: "authorization".to_string(),
                auth_scheme: "Bearer".to_string(),
                strict_tenant_filter: false,
                enable_cors: true,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
            rate_limit: RateLimitConfig {
                enabled: false,
                authenticated_per_minute: 1000,
                unauthenticated_per_minute: 300,
                admin_per_minute: 2000,
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            security: SecurityConfig {
                jwt_secret: String::new(),
                access_token_minutes: 30,
                refresh_token_days: 7,
                auth_header: "authorization".to_string(),
                auth_scheme: "Bearer".to_string(),
                strict_tenant_filter: true,
                enable_cors: true,
                cors_origins: vec!["https://staging.caterly.app".to_string()],
            },
            rate_limit: RateLimitConfig {
                enabled: true,
                authenticated_per_minute: 300,
                unauthenticated_per_minute: 100,
                admin_per_minute: 1000,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            security: SecurityConfig {
                jwt_secret: String::new(),
                access_token_minutes: 30,
                refresh_token_days: 14,
                auth_header: "authorization".to_string(),
                auth_scheme: "Bearer".to_string(),
                strict_tenant_filter: true,
                enable_cors: true,
                cors_origins: vec!["https://app.caterly.app".to_string()],
            },
            rate_limit: RateLimitConfig {
                enabled: true,
                authenticated_per_minute: 300,
                unauthenticated_per_minute: 100,
                admin_per_minute: 1000,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
