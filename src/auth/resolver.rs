use std::sync::Arc;
use thiserror::Error;

use super::principal::Principal;
use crate::store::{StoreError, UserStore};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no user record matches '{0}'")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Materializes a [`Principal`] from the durable user store.
#[derive(Clone)]
pub struct PrincipalResolver {
    store: Arc<dyn UserStore>,
}

impl PrincipalResolver {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Look up by username first, falling back to email.
    ///
    /// The ordering is observable when a username collides with someone
    /// else's email address - the username match wins - so keep it.
    pub async fn load_by_username_or_email(&self, value: &str) -> Result<Principal, ResolveError> {
        if let Some(record) = self.store.find_by_username(value).await? {
            return Ok(record.into());
        }
        if let Some(record) = self.store.find_by_email(value).await? {
            return Ok(record.into());
        }
        Err(ResolveError::NotFound(value.to_string()))
    }

    pub async fn load_by_id(&self, id: i64) -> Result<Principal, ResolveError> {
        self.store
            .find_by_id(id)
            .await?
            .map(Into::into)
            .ok_or_else(|| ResolveError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::principal::{AccountStatus, Role};
    use crate::store::UserRecord;
    use async_trait::async_trait;

    struct StubStore {
        users: Vec<UserRecord>,
    }

    #[async_trait]
    impl UserStore for StubStore {
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

    fn record(id: i64, username: &str, email: &str) -> UserRecord {
        UserRecord {
            id,
            username: username.into(),
            email: email.into(),
            password_hash: "x".into(),
            first_name: "Test".into(),
            last_name: "User".into(),
            tenant_id: Some(7),
            tenant_code: Some("BISTRO7".into()),
            role: Role::Staff,
            status: AccountStatus::Active,
        }
    }

    fn resolver(users: Vec<UserRecord>) -> PrincipalResolver {
        PrincipalResolver::new(Arc::new(StubStore { users }))
    }

    #[tokio::test]
    async fn username_match_wins_over_someone_elses_email() {
        // "basil@herb.example" is user 1's username and user 2's email
        let resolver = resolver(vec![
            record(1, "basil@herb.example", "owner@herb.example"),
            record(2, "romarin", "basil@herb.example"),
        ]);

        let principal = resolver
            .load_by_username_or_email("basil@herb.example")
            .await
            .unwrap();
        assert_eq!(principal.id, 1);
    }

    #[tokio::test]
    async fn falls_back_to_email() {
        let resolver = resolver(vec![record(3, "margaux", "margaux@bistro.example")]);

        let principal = resolver
            .load_by_username_or_email("margaux@bistro.example")
            .await
            .unwrap();
        assert_eq!(principal.id, 3);
    }

    #[tokio::test]
    async fn unknown_value_is_not_found() {
        let resolver = resolver(vec![]);
        assert!(matches!(
            resolver.load_by_username_or_email("ghost").await,
            Err(ResolveError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn load_by_id() {
        let resolver = resolver(vec![record(9, "margaux", "margaux@bistro.example")]);
        assert_eq!(resolver.load_by_id(9).await.unwrap().id, 9);
        assert!(matches!(
            resolver.load_by_id(10).await,
            Err(ResolveError::NotFound(_))
        ));
    }
}
