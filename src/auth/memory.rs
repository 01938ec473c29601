use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::repo::UserStore;
use crate::auth::repo_types::{User, UserLookup, UserUpdate};
use crate::error::StoreError;

/// Process-local user store, used when no database is configured.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_user_by(&self, lookup: UserLookup<'_>) -> Result<User, StoreError> {
        let users = self.users.read().await;
        users
            .values()
            .find(|u| lookup.matches(u))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn add_user(&self, email: &str, hashed_password: &str) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == email) {
            return Err(StoreError::Conflict);
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            session_id: None,
            reset_token: None,
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: Uuid, update: UserUpdate) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        update.apply(user);
        Ok(())
    }
}

/// Store whose backend is always unreachable.
#[cfg(test)]
pub(crate) struct UnavailableStore;

#[cfg(test)]
#[async_trait]
impl UserStore for UnavailableStore {
    async fn find_user_by(&self, _lookup: UserLookup<'_>) -> Result<User, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn add_user(&self, _email: &str, _hashed_password: &str) -> Result<User, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn update_user(&self, _id: Uuid, _update: UserUpdate) -> Result<(), StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_then_find_by_each_field() {
        let store = MemoryUserStore::new();
        let user = store.add_user("a@b.io", "$argon2id$x").await.unwrap();

        let found = store.find_user_by(UserLookup::Email("a@b.io")).await.unwrap();
        assert_eq!(found.id, user.id);

        store
            .update_user(
                user.id,
                UserUpdate {
                    session_id: Some(Some("sid".into())),
                    reset_token: Some(Some("tok".into())),
                    ..UserUpdate::default()
                },
            )
            .await
            .unwrap();

        let by_session = store.find_user_by(UserLookup::SessionId("sid")).await.unwrap();
        let by_token = store.find_user_by(UserLookup::ResetToken("tok")).await.unwrap();
        assert_eq!(by_session.id, user.id);
        assert_eq!(by_token.id, user.id);
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let store = MemoryUserStore::new();
        assert!(matches!(
            store.find_user_by(UserLookup::Email("nobody@b.io")).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.update_user(Uuid::new_v4(), UserUpdate::session(None)).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn partial_update_leaves_other_fields() {
        let store = MemoryUserStore::new();
        let user = store.add_user("a@b.io", "$argon2id$x").await.unwrap();
        store
            .update_user(user.id, UserUpdate::session(Some("sid".into())))
            .await
            .unwrap();
        store
            .update_user(user.id, UserUpdate::reset_token(Some("tok".into())))
            .await
            .unwrap();

        let u = store.find_user_by(UserLookup::Email("a@b.io")).await.unwrap();
        assert_eq!(u.hashed_password, "$argon2id$x");
        assert_eq!(u.session_id.as_deref(), Some("sid"));
        assert_eq!(u.reset_token.as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = MemoryUserStore::new();
        let first = store.add_user("a@b.io", "$argon2id$x").await.unwrap();
        assert!(matches!(
            store.add_user("a@b.io", "$argon2id$y").await,
            Err(StoreError::Conflict)
        ));
        let found = store.find_user_by(UserLookup::Email("a@b.io")).await.unwrap();
        assert_eq!(found.id, first.id);
        assert_eq!(found.hashed_password, "$argon2id$x");
    }
}
