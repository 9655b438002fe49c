use sqlx::PgPool;

use crate::core::error::{Entity, Operation, StoreError, StoreErrorKind};
use crate::features::categories::models::Category;

/// Data access for categories.
pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Category>, StoreError> {
        sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list categories: {:?}", e);
                StoreError::from_sqlx(Entity::Category, Operation::List, &e)
            })
    }

    pub async fn get_by_id(&self, category_id: i64) -> Result<Category, StoreError> {
        let category =
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
                .bind(category_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to get category: {:?}", e);
                    StoreError::from_sqlx(Entity::Category, Operation::Get, &e)
                })?;

        category.ok_or_else(|| StoreError::not_found(Entity::Category, Operation::Get))
    }

    pub async fn create(&self, name: &str) -> Result<Category, StoreError> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create category: {:?}", e);
            StoreError::from_sqlx(Entity::Category, Operation::Create, &e)
        })
    }

    /// Rename a category and return the post-update projection.
    pub async fn update(&self, category_id: i64, name: &str) -> Result<Category, StoreError> {
        let result = sqlx::query("UPDATE categories SET name = $2 WHERE id = $1")
            .bind(category_id)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update category: {:?}", e);
                StoreError::from_sqlx(Entity::Category, Operation::Update, &e)
            })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(Entity::Category, Operation::Update));
        }

        // Reread so the caller gets the stored projection, not our inputs.
        self.get_by_id(category_id).await.map_err(|e| {
            StoreError::new(
                Entity::Category,
                Operation::Update,
                StoreErrorKind::Unexpected,
                format!("failed to reread updated category: {}", e),
            )
        })
    }

    /// Delete a category. Fails with a constraint error while submissions
    /// still reference it.
    pub async fn delete(&self, category_id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(category_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete category: {:?}", e);
                StoreError::from_sqlx(Entity::Category, Operation::Delete, &e)
            })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(Entity::Category, Operation::Delete));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test]
    async fn create_rename_refetch_round_trips(pool: PgPool) {
        let service = CategoryService::new(pool);

        let created = service.create("Wildlife").await.unwrap();
        assert_eq!(service.get_by_id(created.id).await.unwrap().name, "Wildlife");

        let renamed = service.update(created.id, "Nature").await.unwrap();
        assert_eq!(renamed.id, created.id);
        assert_eq!(renamed.name, "Nature");

        let fetched = service.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched.name, "Nature");
        assert_eq!(fetched.id, created.id);
    }

    #[sqlx::test]
    async fn deleting_a_missing_category_is_not_found(pool: PgPool) {
        let service = CategoryService::new(pool);

        let err = service.delete(4242).await.unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::NotFound);
        assert_eq!(err.code(), "category/delete/not_found");
    }
}
