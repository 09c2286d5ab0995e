use argon2::{password_hash::PasswordHash, Argon2, PasswordVerifier};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::tenant::TenantId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    TenantAdmin,
    Manager,
    Staff,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::TenantAdmin => "TENANT_ADMIN",
            Role::Manager => "MANAGER",
            Role::Staff => "STAFF",
            Role::Viewer => "VIEWER",
        }
    }

    /// Authority string published to the authorization layer, e.g. `ROLE_MANAGER`.
    pub fn authority(&self) -> String {
        format!("ROLE_{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUPER_ADMIN" => Ok(Role::SuperAdmin),
            "TENANT_ADMIN" => Ok(Role::TenantAdmin),
            "MANAGER" => Ok(Role::Manager),
            "STAFF" => Ok(Role::Staff),
            "VIEWER" => Ok(Role::Viewer),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
    Locked,
    Disabled,
    Pending,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "ACTIVE",
            AccountStatus::Locked => "LOCKED",
            AccountStatus::Disabled => "DISABLED",
            AccountStatus::Pending => "PENDING",
        }
    }
}

impl FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(AccountStatus::Active),
            "LOCKED" => Ok(AccountStatus::Locked),
            "DISABLED" => Ok(AccountStatus::Disabled),
            "PENDING" => Ok(AccountStatus::Pending),
            other => Err(format!("unknown account status: {other}")),
        }
    }
}

/// Authenticated identity for one request.
///
/// Built from a durable user record right after token verification and
/// dropped with the request; never persisted. A `tenant_id` of `None` is
/// only a valid state for super-administrators - everyone else hits the
/// tenant-isolation error path on their first tenant-scoped access.
#[derive(Clone)]
pub struct Principal {
    pub id: i64,
    pub username: String,
    pub email: String,
    password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub tenant_id: Option<TenantId>,
    pub tenant_code: Option<String>,
    pub role: Role,
    pub status: AccountStatus,
}

impl Principal {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i64,
        username: String,
        email: String,
        password_hash: String,
        first_name: String,
        last_name: String,
        tenant_id: Option<TenantId>,
        tenant_code: Option<String>,
        role: Role,
        status: AccountStatus,
    ) -> Self {
        Self {
            id,
            username,
            email,
            password_hash,
            first_name,
            last_name,
            tenant_id,
            tenant_code,
            role,
            status,
        }
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    pub fn authorities(&self) -> Vec<String> {
        vec![self.role.authority()]
    }

    /// Constant-shape Argon2 verification; any malformed stored hash counts
    /// as a mismatch.
    pub fn verify_password(&self, candidate: &str) -> bool {
        match PasswordHash::new(&self.password_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

// The password hash stays out of logs
impl std::fmt::Debug for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Principal")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("tenant_id", &self.tenant_id)
            .field("tenant_code", &self.tenant_code)
            .field("role", &self.role)
            .field("status", &self.status)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::{rand_core::OsRng, SaltString};
    use argon2::PasswordHasher;

    fn principal_with_password(password: &str) -> Principal {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string();
        Principal::new(
            1,
            "margaux".into(),
            "margaux@bistro.example".into(),
            hash,
            "Margaux".into(),
            "Deschamps".into(),
            Some(7),
            Some("BISTRO7".into()),
            Role::Manager,
            AccountStatus::Active,
        )
    }

    #[test]
    fn password_verification() {
        let p = principal_with_password("appetite");
        assert!(p.verify_password("appetite"));
        assert!(!p.verify_password("satiety"));
    }

    #[test]
    fn malformed_stored_hash_is_a_mismatch() {
        let mut p = principal_with_password("appetite");
        p.password_hash = "not-a-phc-string".into();
        assert!(!p.verify_password("appetite"));
    }

    #[test]
    fn debug_redacts_password_hash() {
        let p = principal_with_password("appetite");
        let rendered = format!("{p:?}");
        assert!(!rendered.contains("argon2"));
        assert!(rendered.contains("margaux"));
    }

    #[test]
    fn role_round_trip_and_authority() {
        assert_eq!("TENANT_ADMIN".parse::<Role>().unwrap(), Role::TenantAdmin);
        assert_eq!(Role::Manager.authority(), "ROLE_MANAGER");
        assert!("COOK".parse::<Role>().is_err());
    }
}
