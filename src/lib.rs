pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod store;
pub mod tenant;

pub use state::AppState;

use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Build the router with the full request pipeline applied.
///
/// Stage order is declared here, not inferred from priorities:
/// authenticate publishes the principal that bind_tenant reads, and
/// throttle keys off that principal. Tenant teardown is the one
/// unconditional terminal action of the chain.
pub fn app(state: AppState) -> Router {
    let pipeline = ServiceBuilder::new()
        .layer(from_fn_with_state(state.clone(), middleware::authenticate))
        .layer(from_fn_with_state(state.clone(), middleware::bind_tenant))
        .layer(from_fn_with_state(state.clone(), middleware::throttle));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/v1/auth/login", post(handlers::public::auth::login))
        .route("/api/v1/auth/refresh", post(handlers::public::auth::refresh))
        .route(
            "/api/v1/auth/forgot-password",
            post(handlers::public::auth::forgot_password),
        )
        .route("/api/v1/auth/whoami", get(handlers::protected::auth::whoami))
        .route("/api/v1/customers", get(handlers::protected::customers::list))
        .layer(pipeline)
        .layer(cors_layer(&state))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(error::handle_panic))
        .with_state(state)
}

fn cors_layer(state: &AppState) -> CorsLayer {
    if !state.config.security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = state
        .config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
