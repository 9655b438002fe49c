use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{Entity, Operation, StoreError};
use crate::features::auth::gate::RoleStore;
use crate::features::auth::model::VerifiedUser;
use crate::features::users::models::{User, UserRole};

/// Data access for users. One parameterized statement per operation;
/// every failure surfaces as a tagged [`StoreError`].
pub struct UserService {
    pool: PgPool,
}

/// Partial update. `None` leaves a field untouched; for `icon` the
/// outer `Option` is presence and the inner one the new value, so
/// `Some(None)` clears the stored avatar.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub icon: Option<Option<String>>,
    pub role: Option<UserRole>,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<User>, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, first_name, last_name, icon, role, created_at, updated_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list users: {:?}", e);
            StoreError::from_sqlx(Entity::User, Operation::List, &e)
        })
    }

    pub async fn get_by_id(&self, user_id: i64) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, first_name, last_name, icon, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get user by id: {:?}", e);
            StoreError::from_sqlx(Entity::User, Operation::Get, &e)
        })?;

        user.ok_or_else(|| StoreError::not_found(Entity::User, Operation::Get))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, first_name, last_name, icon, role, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get user by email: {:?}", e);
            StoreError::from_sqlx(Entity::User, Operation::Get, &e)
        })
    }

    pub async fn create(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
        icon: Option<&str>,
        role: UserRole,
    ) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, first_name, last_name, icon, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, first_name, last_name, icon, role, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .bind(icon)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create user: {:?}", e);
            StoreError::from_sqlx(Entity::User, Operation::Create, &e)
        })
    }

    /// Update a user and return the post-update projection.
    pub async fn update(&self, user_id: i64, changes: UserChanges) -> Result<User, StoreError> {
        let (icon_given, icon) = match changes.icon {
            Some(value) => (true, value),
            None => (false, None),
        };

        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = COALESCE($2, email),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                icon = CASE WHEN $5 THEN $6 ELSE icon END,
                role = COALESCE($7, role),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(changes.email)
        .bind(changes.first_name)
        .bind(changes.last_name)
        .bind(icon_given)
        .bind(icon)
        .bind(changes.role)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update user: {:?}", e);
            StoreError::from_sqlx(Entity::User, Operation::Update, &e)
        })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(Entity::User, Operation::Update));
        }

        // Reread so the caller gets the stored projection, not our inputs.
        self.get_by_id(user_id).await.map_err(|e| {
            StoreError::new(
                Entity::User,
                Operation::Update,
                crate::core::error::StoreErrorKind::Unexpected,
                format!("failed to reread updated user: {}", e),
            )
        })
    }

    pub async fn delete(&self, user_id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete user: {:?}", e);
                StoreError::from_sqlx(Entity::User, Operation::Delete, &e)
            })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(Entity::User, Operation::Delete));
        }

        Ok(())
    }
}

#[async_trait]
impl RoleStore for UserService {
    async fn find_by_email(&self, email: &str) -> Result<Option<VerifiedUser>, StoreError> {
        let user = self.get_by_email(email).await?;
        Ok(user.map(|u| VerifiedUser {
            id: u.id,
            email: u.email,
            role: u.role,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ICON: &str = "https://avatars.example.com/ada.png";

    async fn seed_user(service: &UserService) -> User {
        service
            .create("ada@example.com", "Ada", "Lovelace", Some(ICON), UserRole::User)
            .await
            .unwrap()
    }

    #[sqlx::test]
    async fn update_leaves_an_omitted_icon_untouched(pool: PgPool) {
        let service = UserService::new(pool);
        let user = seed_user(&service).await;

        let updated = service
            .update(
                user.id,
                UserChanges {
                    role: Some(UserRole::Admin),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.role, UserRole::Admin);
        assert_eq!(updated.icon.as_deref(), Some(ICON));
    }

    #[sqlx::test]
    async fn update_with_an_explicit_null_clears_the_icon(pool: PgPool) {
        let service = UserService::new(pool);
        let user = seed_user(&service).await;

        let updated = service
            .update(
                user.id,
                UserChanges {
                    icon: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.icon, None);
        assert_eq!(updated.email, user.email);
        assert_eq!(updated.first_name, user.first_name);
    }
}
