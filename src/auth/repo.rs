use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::auth::repo_types::{User, UserLookup, UserUpdate};
use crate::error::StoreError;

/// Storage contract consumed by `AuthService`.
///
/// Each call is atomic on a single record. `add_user` enforces email
/// uniqueness as part of the insert.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find the user matching `lookup`, or `StoreError::NotFound`.
    async fn find_user_by(&self, lookup: UserLookup<'_>) -> Result<User, StoreError>;

    /// Insert a new user with no session and no reset token.
    /// `StoreError::Conflict` if the email is already taken.
    async fn add_user(&self, email: &str, hashed_password: &str) -> Result<User, StoreError>;

    /// Apply a partial update; `StoreError::NotFound` if `id` is unknown.
    async fn update_user(&self, id: Uuid, update: UserUpdate) -> Result<(), StoreError>;
}

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_user_by(&self, lookup: UserLookup<'_>) -> Result<User, StoreError> {
        // column comes from a closed enum, never from input
        let sql = format!(
            r#"
            SELECT id, email, hashed_password, session_id, reset_token, created_at
            FROM users
            WHERE {} = $1
            LIMIT 1
            "#,
            lookup.column()
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(lookup.value())
            .fetch_optional(&self.db)
            .await?;
        user.ok_or(StoreError::NotFound)
    }

    async fn add_user(&self, email: &str, hashed_password: &str) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, hashed_password)
            VALUES ($1, $2)
            RETURNING id, email, hashed_password, session_id, reset_token, created_at
            "#,
        )
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            let duplicate = matches!(
                &e,
                sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION)
            );
            if duplicate {
                StoreError::Conflict
            } else {
                StoreError::Database(e)
            }
        })?;
        debug!(user_id = %user.id, "user row inserted");
        Ok(user)
    }

    async fn update_user(&self, id: Uuid, update: UserUpdate) -> Result<(), StoreError> {
        let UserUpdate {
            hashed_password,
            session_id,
            reset_token,
        } = update;
        let result = sqlx::query(
            r#"
            UPDATE users
               SET hashed_password = COALESCE($2, hashed_password),
                   session_id = CASE WHEN $3 THEN $4 ELSE session_id END,
                   reset_token = CASE WHEN $5 THEN $6 ELSE reset_token END
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(hashed_password)
        .bind(session_id.is_some())
        .bind(session_id.flatten())
        .bind(reset_token.is_some())
        .bind(reset_token.flatten())
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
