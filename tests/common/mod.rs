#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHasher};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use caterly_api::auth::{AccountStatus, Role};
use caterly_api::config::AppConfig;
use caterly_api::store::{
    Customer, CustomerStore, StoreError, TenantFilter, UserRecord, UserStore,
};
use caterly_api::tenant::{TenantContext, TenantId};
use caterly_api::AppState;

// Seeded accounts. Tenant 7 is "Bistro Sept", tenant 8 is "Pâtisserie Huit".
pub const MANAGER: (&str, &str) = ("margaux", "appetite");
pub const MANAGER_EMAIL: &str = "margaux@bistro7.example";
pub const TENANT_ADMIN: (&str, &str) = ("hugo", "brioche");
pub const SUPER_ADMIN: (&str, &str) = ("root", "skeleton-key");
pub const ORPHAN: (&str, &str) = ("ghost", "ectoplasm");
pub const LOCKED: (&str, &str) = ("frozen", "icicle");

pub fn hash(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .unwrap()
        .to_string()
}

fn user(
    id: i64,
    login: (&str, &str),
    email: &str,
    tenant: Option<(TenantId, &str)>,
    role: Role,
    status: AccountStatus,
) -> UserRecord {
    UserRecord {
        id,
        username: login.0.to_string(),
        email: email.to_string(),
        password_hash: hash(login.1),
        first_name: login.0.to_string(),
        last_name: "Test".to_string(),
        tenant_id: tenant.map(|(id, _)| id),
        tenant_code: tenant.map(|(_, code)| code.to_string()),
        role,
        status,
    }
}

pub fn seed_users() -> Vec<UserRecord> {
    vec![
        user(1, MANAGER, MANAGER_EMAIL, Some((7, "BISTRO7")), Role::Manager, AccountStatus::Active),
        user(2, TENANT_ADMIN, "hugo@patisserie8.example", Some((8, "PATIS8")), Role::TenantAdmin, AccountStatus::Active),
        user(3, SUPER_ADMIN, "root@caterly.example", None, Role::SuperAdmin, AccountStatus::Active),
        // Non-super-admin with no tenant assignment: a configuration anomaly
        user(4, ORPHAN, "ghost@caterly.example", None, Role::Staff, AccountStatus::Active),
        user(5, LOCKED, "frozen@bistro7.example", Some((7, "BISTRO7")), Role::Staff, AccountStatus::Locked),
    ]
}

pub struct InMemoryUserStore {
    users: Vec<UserRecord>,
}

impl InMemoryUserStore {
    pub fn seeded() -> Self {
        Self { users: seed_users() }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.iter().find(|u| u.id == id).cloned())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

pub struct InMemoryCustomerStore {
    by_tenant: HashMap<TenantId, Vec<Customer>>,
}

impl InMemoryCustomerStore {
    pub fn seeded() -> Self {
        let mut by_tenant = HashMap::new();
        by_tenant.insert(
            7,
            vec![
                Customer { id: 100, name: "Auberge du Lac".into(), email: Some("events@auberge.example".into()), phone: None },
                Customer { id: 101, name: "Les Trois Fours".into(), email: None, phone: Some("+33 1 99 00 11 22".into()) },
            ],
        );
        by_tenant.insert(
            8,
            vec![Customer { id: 200, name: "Canal Offices".into(), email: None, phone: None }],
        );
        Self { by_tenant }
    }
}

#[async_trait]
impl CustomerStore for InMemoryCustomerStore {
    async fn list(&self) -> Result<Vec<Customer>, StoreError> {
        let tenant_id = TenantContext::require()?;
        Ok(self.by_tenant.get(&tenant_id).cloned().unwrap_or_default())
    }
}

/// Records every activation; optionally simulates a data-layer outage.
pub struct RecordingTenantFilter {
    pub activations: Mutex<Vec<TenantId>>,
    pub fail: bool,
}

impl RecordingTenantFilter {
    pub fn new() -> Self {
        Self { activations: Mutex::new(Vec::new()), fail: false }
    }

    pub fn failing() -> Self {
        Self { activations: Mutex::new(Vec::new()), fail: true }
    }

    pub fn seen(&self) -> Vec<TenantId> {
        self.activations.lock().unwrap().clone()
    }
}

#[async_trait]
impl TenantFilter for RecordingTenantFilter {
    async fn activate(&self, tenant_id: TenantId) -> Result<(), StoreError> {
        if self.fail {
            return Err(StoreError::Unavailable("simulated outage".into()));
        }
        self.activations.lock().unwrap().push(tenant_id);
        Ok(())
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = "integration-test-secret".to_string();
    config
}

pub fn build_state(config: AppConfig, filter: Arc<RecordingTenantFilter>) -> AppState {
    AppState::new(
        config,
        Arc::new(InMemoryUserStore::seeded()),
        Arc::new(InMemoryCustomerStore::seeded()),
        filter,
    )
}

pub fn build_app(config: AppConfig) -> Router {
    caterly_api::app(build_state(config, Arc::new(RecordingTenantFilter::new())))
}

pub fn get_request(path: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(path: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn call(app: &Router, request: Request<Body>) -> (u16, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status().as_u16();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Log in through the real endpoint and return the `data` object.
pub async fn login(app: &Router, login: (&str, &str)) -> Value {
    let (status, body) = call(
        app,
        post_json(
            "/api/v1/auth/login",
            json!({"username_or_email": login.0, "password": login.1}),
        ),
    )
    .await;
    assert_eq!(status, 200, "login failed: {body}");
    body["data"].clone()
}

pub async fn access_token(app: &Router, credentials: (&str, &str)) -> String {
    login(app, credentials).await["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}
