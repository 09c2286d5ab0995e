// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::store::StoreError;
use crate::tenant::TenantError;

/// HTTP API error rendered with the shared rejection envelope:
/// `{success, status, error, message, path, timestamp}`.
///
/// Every rejection the pipeline produces goes through this type so clients
/// have a single parsing path regardless of which stage rejected.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    path: Option<String>,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            path: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// Tenant-isolation violations are a security incident class, not an
    /// ordinary 4xx: they carry a 403 on the wire but log at error severity
    /// so they can be monitored separately.
    pub fn tenant_isolation(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::error!(target: "caterly_api::tenant_isolation", "{message}");
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Convert to the shared JSON envelope
    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "status": self.status.as_u16(),
            "error": self.status.canonical_reason().unwrap_or("Error"),
            "message": self.message,
            "path": self.path,
            "timestamp": Utc::now().to_rfc3339(),
        })
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::TenantUnbound(e) => {
                ApiError::tenant_isolation(format!("tenant-scoped access rejected: {e}"))
            }
            StoreError::Database(e) => {
                // Don't expose internal SQL errors to clients
                tracing::error!("database error: {e}");
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            StoreError::Unavailable(msg) => {
                tracing::warn!("store unavailable: {msg}");
                ApiError::service_unavailable("Storage temporarily unavailable")
            }
            StoreError::Corrupt(msg) => {
                tracing::error!("corrupt record: {msg}");
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<TenantError> for ApiError {
    fn from(err: TenantError) -> Self {
        ApiError::tenant_isolation(err.to_string())
    }
}

/// Top-level handler for panics that escape a handler: log the detail,
/// return a generic 500 in the shared envelope without leaking internals.
pub fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> axum::response::Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!("handler panicked: {detail}");
    ApiError::internal_server_error("An unexpected error occurred").into_response()
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.to_json())).into_response()
    }
}
